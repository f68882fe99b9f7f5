//! Canned response tables and selection policy.
//!
//! A resolved tag maps to the responses parallel-indexed with its
//! equally-tagged patterns in the owning application. When the tag is
//! unknown or an application authored no response for it, per-application
//! fallback lists (and a generic unknown list) apply instead.
//!
//! Selection rotates by a caller-supplied seed -- the user's message
//! count -- so replies vary across turns while staying deterministic for
//! a given context state.

use converse_types::corpus::TrainingCorpus;

/// Fixed reply for empty or whitespace-only input. Never an error.
pub const EMPTY_INPUT_RESPONSE: &str = "Please type a message so I can help you!";

/// Fixed reply when the engine hits an internal failure.
pub const APOLOGY_RESPONSE: &str =
    "I apologize, but I'm having trouble right now. Please try again.";

/// Generic fallbacks when even the application is unknown.
const UNKNOWN_RESPONSES: [&str; 4] = [
    "I'm not sure I understand. Could you rephrase that?",
    "That's an interesting question. Let me think about how to help you.",
    "I'm still learning. Could you try asking that differently?",
    "I don't have an answer for that right now. Try asking something else!",
];

/// Per-application fallbacks for low-confidence turns.
fn application_fallbacks(application: &str) -> &'static [&'static str] {
    match application {
        "customer_support" => &[
            "I'm here to help with customer support. How can I assist you today?",
            "I can help with orders, returns, and technical issues. What do you need help with?",
            "I specialize in customer service. Tell me about your concern.",
        ],
        "college_helpdesk" => &[
            "I can help with college information, admissions, and campus services. What would you like to know?",
            "I can answer questions about admissions, courses, and campus life.",
            "How can I assist you with college-related matters today?",
        ],
        "hr_recruitment" => &[
            "I can help with job openings, applications, and company information. What would you like to know?",
            "For HR and recruitment questions, I'm here to help. What information are you looking for?",
            "I specialize in career and employment information. How can I assist you?",
        ],
        "personal_assistant" => &[
            "I can help with time, reminders, and general information. What do you need?",
            "As your personal assistant, I can provide information and help with various tasks.",
            "How can I assist you today?",
        ],
        _ => &UNKNOWN_RESPONSES,
    }
}

/// All responses configured for `tag` in `application`.
///
/// Indices beyond the application's responses array are skipped, so
/// applications authored with fewer responses than patterns degrade
/// gracefully.
pub fn candidates_for_tag(corpus: &TrainingCorpus, application: &str, tag: &str) -> Vec<String> {
    let Some(data) = corpus.applications.get(application) else {
        return Vec::new();
    };
    data.tags
        .iter()
        .enumerate()
        .filter(|(_, t)| t.as_str() == tag)
        .filter_map(|(i, _)| data.responses.get(i).cloned())
        .collect()
}

/// Rotate through `candidates` by seed. Empty input yields `None`.
pub fn select(candidates: &[String], seed: u64) -> Option<&str> {
    if candidates.is_empty() {
        return None;
    }
    Some(candidates[(seed % candidates.len() as u64) as usize].as_str())
}

/// Fallback reply for an application, rotated by seed.
pub fn fallback(application: &str, seed: u64) -> String {
    let pool = application_fallbacks(application);
    pool[(seed % pool.len() as u64) as usize].to_string()
}
