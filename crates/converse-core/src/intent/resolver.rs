//! Confidence-gated intent resolution over the vector space index.
//!
//! The resolver fails closed: no index, or input that normalizes to
//! nothing, yields the "unknown" tag with zero confidence. Matches below
//! the minimum-confidence threshold also come back as "unknown", but keep
//! their raw similarity so callers can tier their fallback responses.
//!
//! The two boost multipliers are heuristics ("in-domain and
//! recently-discussed intents deserve extra trust"), not probabilities.
//! Their values live in `EngineConfig` so deployments can recalibrate.

use converse_types::config::EngineConfig;
use converse_types::intent::IntentMatch;

use crate::index::VectorSpaceIndex;
use crate::normalize::normalize;

/// Resolves one utterance to a ranked intent.
pub struct IntentResolver {
    min_confidence: f32,
    in_app_boost: f32,
    recent_intent_boost: f32,
    recent_window: usize,
}

impl IntentResolver {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            min_confidence: config.min_confidence,
            in_app_boost: config.in_app_boost,
            recent_intent_boost: config.recent_intent_boost,
            recent_window: config.recent_window,
        }
    }

    /// Resolve `text` against the index, in the context of `application`
    /// and the user's recent intent tags (oldest-first).
    ///
    /// Never errors: malformed or empty input is a normal "unknown"
    /// result.
    pub fn resolve(
        &self,
        index: Option<&VectorSpaceIndex>,
        text: &str,
        application: &str,
        recent_intents: &[String],
    ) -> IntentMatch {
        let Some(index) = index else {
            tracing::warn!(application, "index not built, returning unknown intent");
            return IntentMatch::unknown(application);
        };

        let normalized = normalize(text);
        if normalized.is_empty() {
            return IntentMatch::unknown(application);
        }

        let Some((row, raw_score)) = index.query(&normalized) else {
            return IntentMatch::unknown(application);
        };

        if raw_score < self.min_confidence {
            // Keep the raw similarity for fallback tiering.
            let mut unknown = IntentMatch::unknown(application);
            unknown.raw_score = raw_score;
            unknown.confidence = raw_score;
            return unknown;
        }

        let meta = index.meta(row);
        // Returned confidence honors the [0,1] invariant even when both
        // boosts stack on a near-perfect raw score.
        let confidence = self
            .adjust(raw_score, &meta.application, &meta.tag, application, recent_intents)
            .min(1.0);

        IntentMatch {
            tag: meta.tag.clone(),
            application: meta.application.clone(),
            raw_score,
            confidence,
        }
    }

    /// Contextual confidence adjustment.
    ///
    /// In-application matches get `in_app_boost` (capped at 1.0); tags
    /// seen among the last `recent_window` turns get a further
    /// `recent_intent_boost` with no additional cap beyond the prior one.
    fn adjust(
        &self,
        raw: f32,
        matched_app: &str,
        matched_tag: &str,
        application: &str,
        recent_intents: &[String],
    ) -> f32 {
        let mut adjusted = raw;

        if matched_app == application {
            adjusted = (adjusted * self.in_app_boost).min(1.0);
        }

        let window_start = recent_intents.len().saturating_sub(self.recent_window);
        if recent_intents[window_start..].iter().any(|t| t == matched_tag) {
            adjusted *= self.recent_intent_boost;
        }

        adjusted
    }
}
