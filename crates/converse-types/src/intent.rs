//! Intent resolution result types.

use serde::{Deserialize, Serialize};

/// Tag returned when no intent clears the confidence threshold, the
/// input carried no signal, or the index was never built.
pub const UNKNOWN_INTENT: &str = "unknown";

/// The outcome of resolving one utterance against the vector space index.
///
/// `raw_score` is the cosine similarity of the best-matching pattern;
/// `confidence` is the same score after contextual boosts. Both in [0,1].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentMatch {
    pub tag: String,
    /// Application that owns the matched pattern (not necessarily the
    /// application the caller asked about).
    pub application: String,
    pub raw_score: f32,
    pub confidence: f32,
}

impl IntentMatch {
    /// The fail-closed result: unknown tag, zero confidence.
    pub fn unknown(application: &str) -> Self {
        Self {
            tag: UNKNOWN_INTENT.to_string(),
            application: application.to_string(),
            raw_score: 0.0,
            confidence: 0.0,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.tag == UNKNOWN_INTENT
    }
}

/// What the orchestrator hands back to the caller for one turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    pub confidence: f32,
    pub application: String,
    /// Whether conversation history existed before this turn.
    pub context_used: bool,
}

/// Index/model diagnostics for operators.
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub trained: bool,
    pub pattern_count: usize,
    pub applications: Vec<String>,
    pub vocabulary_size: usize,
    pub min_confidence: f32,
}

/// Per-application corpus statistics.
#[derive(Debug, Clone, Serialize)]
pub struct CorpusStats {
    pub total_applications: usize,
    pub total_patterns: usize,
    pub total_responses: usize,
    pub applications: Vec<ApplicationStats>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationStats {
    pub application: String,
    pub patterns: usize,
    pub responses: usize,
    pub tags: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_match() {
        let m = IntentMatch::unknown("customer_support");
        assert!(m.is_unknown());
        assert_eq!(m.confidence, 0.0);
        assert_eq!(m.application, "customer_support");
    }
}
