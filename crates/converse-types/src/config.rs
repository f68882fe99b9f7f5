//! Engine configuration.
//!
//! `EngineConfig` represents the optional `config.toml` that tunes the
//! vector space index, the resolver's calibration constants, and the
//! context store. All fields have defaults matching the shipped behavior.
//!
//! The boost multipliers are ad hoc calibration constants, not derived
//! probabilities; they are configuration precisely so a deployment can
//! change them without a code change.

use serde::{Deserialize, Serialize};

/// Tunable knobs for the whole engine. Loaded from `config.toml` by
/// converse-infra; defaults apply when the file is missing or partial.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Vocabulary cap for the TF-IDF index.
    #[serde(default = "default_max_features")]
    pub max_features: usize,

    /// Minimum cosine similarity for a match to be accepted.
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f32,

    /// Multiplier applied when the matched pattern's application equals
    /// the requested application (heuristic, capped at 1.0).
    #[serde(default = "default_in_app_boost")]
    pub in_app_boost: f32,

    /// Multiplier applied when the matched tag appeared among the recent
    /// turns (heuristic).
    #[serde(default = "default_recent_intent_boost")]
    pub recent_intent_boost: f32,

    /// How many recent turns count for the recent-intent boost.
    #[serde(default = "default_recent_window")]
    pub recent_window: usize,

    /// Maximum turns kept per user context (FIFO eviction beyond this).
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Idle seconds after which a context is swept.
    #[serde(default = "default_session_timeout_secs")]
    pub session_timeout_secs: u64,
}

fn default_max_features() -> usize {
    5000
}

fn default_min_confidence() -> f32 {
    0.3
}

fn default_in_app_boost() -> f32 {
    1.10
}

fn default_recent_intent_boost() -> f32 {
    1.05
}

fn default_recent_window() -> usize {
    3
}

fn default_history_capacity() -> usize {
    10
}

fn default_session_timeout_secs() -> u64 {
    3600
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_features: default_max_features(),
            min_confidence: default_min_confidence(),
            in_app_boost: default_in_app_boost(),
            recent_intent_boost: default_recent_intent_boost(),
            recent_window: default_recent_window(),
            history_capacity: default_history_capacity(),
            session_timeout_secs: default_session_timeout_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = EngineConfig::default();
        assert_eq!(config.max_features, 5000);
        assert_eq!(config.min_confidence, 0.3);
        assert_eq!(config.in_app_boost, 1.10);
        assert_eq!(config.recent_intent_boost, 1.05);
        assert_eq!(config.recent_window, 3);
        assert_eq!(config.history_capacity, 10);
        assert_eq!(config.session_timeout_secs, 3600);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: EngineConfig = toml::from_str("min_confidence = 0.5").unwrap();
        assert_eq!(config.min_confidence, 0.5);
        assert_eq!(config.max_features, 5000);
        assert_eq!(config.history_capacity, 10);
    }

    #[test]
    fn test_empty_toml_is_all_defaults() {
        let config: EngineConfig = toml::from_str("").unwrap();
        assert_eq!(config.session_timeout_secs, 3600);
    }
}
