//! Signal derivation from a single turn's input text.
//!
//! Name extraction, sentiment keywords, and issue/topic flags. All scans
//! are case-insensitive substring checks over the raw input; nothing here
//! depends on the normalizer.

use converse_types::context::{Sentiment, Signals};

/// Name-introduction phrases, checked in this order; the first one found
/// in the input wins.
const NAME_PATTERNS: [&str; 5] = [
    "my name is",
    "i'm called",
    "i am",
    "call me",
    "you can call me",
];

const POSITIVE_WORDS: [&str; 6] = ["great", "good", "excellent", "thanks", "thank you", "awesome"];
const NEGATIVE_WORDS: [&str; 5] = ["bad", "terrible", "awful", "horrible", "disappointed"];
const ISSUE_WORDS: [&str; 4] = ["problem", "issue", "error", "not working"];

/// Extract a display name from a name-introduction phrase, if present.
///
/// Takes the next whitespace-delimited token after the matched phrase,
/// strips surrounding punctuation, and accepts it only if longer than one
/// character. Returns `None` when no phrase matches or the candidate is
/// too short.
pub fn extract_name(input: &str) -> Option<String> {
    let lower = input.to_lowercase();

    for pattern in NAME_PATTERNS {
        if let Some(idx) = lower.find(pattern) {
            let tail_start = idx + pattern.len();
            // Lowercasing is byte-length-preserving for ASCII; fall back
            // to the lowercased text when it is not, so slicing stays on
            // a char boundary.
            let tail = if lower.len() == input.len() {
                &input[tail_start..]
            } else {
                &lower[tail_start..]
            };

            let candidate = tail
                .split_whitespace()
                .next()?
                .trim_matches(|c: char| !c.is_alphanumeric());
            if candidate.chars().count() > 1 {
                return Some(candidate.to_string());
            }
            return None;
        }
    }
    None
}

/// Whether the input contains a name-introduction phrase at all.
pub fn has_name_intro(input: &str) -> bool {
    let lower = input.to_lowercase();
    NAME_PATTERNS.iter().any(|p| lower.contains(p))
}

/// Sentiment keyword scan: positive checked before negative, first
/// category with a hit wins for the turn.
pub fn detect_sentiment(input: &str) -> Option<Sentiment> {
    let lower = input.to_lowercase();
    if POSITIVE_WORDS.iter().any(|w| lower.contains(w)) {
        return Some(Sentiment::Positive);
    }
    if NEGATIVE_WORDS.iter().any(|w| lower.contains(w)) {
        return Some(Sentiment::Negative);
    }
    None
}

/// Update derived signals in place from one turn's input text.
///
/// Sentiment overwrites last-seen-wins; issue and topic flags are sticky
/// for the session.
pub fn update_signals(signals: &mut Signals, input: &str) {
    let lower = input.to_lowercase();

    if ISSUE_WORDS.iter().any(|w| lower.contains(w)) {
        signals.has_issues = true;
    }
    if lower.contains("order") {
        signals.topics.insert("orders".to_string());
    }
    if let Some(sentiment) = detect_sentiment(input) {
        signals.last_sentiment = Some(sentiment);
    }
}
