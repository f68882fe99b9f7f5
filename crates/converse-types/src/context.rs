//! Per-user conversation context types for Converse.
//!
//! A `UserContext` carries everything the engine remembers about one user
//! within a session: a bounded turn history, the current application, an
//! extracted display name, preferences, and derived signals. Contexts are
//! owned exclusively by the context store in converse-core; snapshots
//! (`ContextSnapshot`) are the serializable export/import form.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentiment derived from keyword scanning of a single turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sentiment::Positive => write!(f, "positive"),
            Sentiment::Negative => write!(f, "negative"),
        }
    }
}

impl FromStr for Sentiment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "positive" => Ok(Sentiment::Positive),
            "negative" => Ok(Sentiment::Negative),
            other => Err(format!("invalid sentiment: '{other}'")),
        }
    }
}

/// One request/response exchange, recorded immutably into context history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub timestamp: DateTime<Utc>,
    pub user_input: String,
    pub bot_response: String,
    pub intent: String,
    pub application: String,
}

/// Fixed-capacity FIFO turn history.
///
/// The capacity invariant is structurally enforced: `push` evicts the
/// oldest turn once the ring is full, so the history can never exceed
/// its capacity regardless of call count.
#[derive(Debug, Clone)]
pub struct BoundedHistory {
    turns: VecDeque<Turn>,
    capacity: usize,
}

impl BoundedHistory {
    /// Create an empty history. A capacity of zero is clamped to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            turns: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Rebuild a history from a flat turn list, keeping only the most
    /// recent `capacity` turns (import path).
    pub fn from_turns(turns: Vec<Turn>, capacity: usize) -> Self {
        let mut history = Self::new(capacity);
        let skip = turns.len().saturating_sub(history.capacity);
        for turn in turns.into_iter().skip(skip) {
            history.push(turn);
        }
        history
    }

    /// Append a turn, evicting the oldest if the ring is full.
    pub fn push(&mut self, turn: Turn) {
        if self.turns.len() == self.capacity {
            self.turns.pop_front();
        }
        self.turns.push_back(turn);
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate oldest-first.
    pub fn iter(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    /// Intent tags of the most recent `n` turns, oldest-first.
    pub fn recent_intents(&self, n: usize) -> Vec<String> {
        let skip = self.turns.len().saturating_sub(n);
        self.turns.iter().skip(skip).map(|t| t.intent.clone()).collect()
    }

    /// Flatten to a plain vector, oldest-first (export path).
    pub fn to_vec(&self) -> Vec<Turn> {
        self.turns.iter().cloned().collect()
    }
}

/// Signals derived from turn inputs: sentiment, issue flag, topic flags.
///
/// `variables` is an intentionally open string-keyed map for signals that
/// have no dedicated field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Signals {
    pub last_sentiment: Option<Sentiment>,
    pub has_issues: bool,
    #[serde(default)]
    pub topics: BTreeSet<String>,
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
}

/// Everything the engine remembers about one user within a session.
#[derive(Debug, Clone)]
pub struct UserContext {
    pub user_id: String,
    pub history: BoundedHistory,
    pub current_application: String,
    pub user_name: Option<String>,
    pub preferences: BTreeMap<String, String>,
    pub signals: Signals,
    pub session_start: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub message_count: u64,
}

impl UserContext {
    pub fn new(user_id: &str, application: &str, history_capacity: usize) -> Self {
        let now = Utc::now();
        Self {
            user_id: user_id.to_string(),
            history: BoundedHistory::new(history_capacity),
            current_application: application.to_string(),
            user_name: None,
            preferences: BTreeMap::new(),
            signals: Signals::default(),
            session_start: now,
            last_activity: now,
            message_count: 0,
        }
    }

    /// Whether the context has been idle strictly longer than `timeout`.
    pub fn is_expired(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        let idle = now.signed_duration_since(self.last_activity);
        idle.num_seconds() > timeout.as_secs() as i64
    }

    /// Seconds since the session started.
    pub fn session_duration_secs(&self, now: DateTime<Utc>) -> i64 {
        now.signed_duration_since(self.session_start).num_seconds().max(0)
    }
}

/// Serializable snapshot of a user context for export/import.
///
/// `history` is a flat list; the bounded-history invariant is re-applied
/// on import by truncating to the most recent N turns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextSnapshot {
    pub user_id: String,
    pub history: Vec<Turn>,
    pub current_application: String,
    pub user_name: Option<String>,
    #[serde(default)]
    pub preferences: BTreeMap<String, String>,
    #[serde(default)]
    pub signals: Signals,
    pub session_start: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub message_count: u64,
}

impl ContextSnapshot {
    pub fn from_context(ctx: &UserContext) -> Self {
        Self {
            user_id: ctx.user_id.clone(),
            history: ctx.history.to_vec(),
            current_application: ctx.current_application.clone(),
            user_name: ctx.user_name.clone(),
            preferences: ctx.preferences.clone(),
            signals: ctx.signals.clone(),
            session_start: ctx.session_start,
            last_activity: ctx.last_activity,
            message_count: ctx.message_count,
        }
    }

    /// Restore a context, truncating the history to `history_capacity`.
    pub fn into_context(self, history_capacity: usize) -> UserContext {
        UserContext {
            user_id: self.user_id,
            history: BoundedHistory::from_turns(self.history, history_capacity),
            current_application: self.current_application,
            user_name: self.user_name,
            preferences: self.preferences,
            signals: self.signals,
            session_start: self.session_start,
            last_activity: self.last_activity,
            message_count: self.message_count,
        }
    }
}

/// One row of `list_active()` output.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub user_id: String,
    pub user_name: Option<String>,
    pub current_application: String,
    pub message_count: u64,
    pub session_duration_secs: i64,
    pub last_activity: DateTime<Utc>,
}

/// Rich per-user summary: session facts plus derived signals.
#[derive(Debug, Clone, Serialize)]
pub struct ContextSummary {
    pub user_id: String,
    pub user_name: Option<String>,
    pub current_application: String,
    pub message_count: u64,
    pub session_duration_secs: i64,
    pub recent_intents: Vec<String>,
    pub has_issues: bool,
    pub last_sentiment: Option<Sentiment>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(intent: &str) -> Turn {
        Turn {
            timestamp: Utc::now(),
            user_input: format!("input for {intent}"),
            bot_response: "ok".to_string(),
            intent: intent.to_string(),
            application: "customer_support".to_string(),
        }
    }

    #[test]
    fn test_bounded_history_never_exceeds_capacity() {
        let mut history = BoundedHistory::new(3);
        for i in 0..20 {
            history.push(turn(&format!("intent_{i}")));
            assert!(history.len() <= 3);
        }
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn test_bounded_history_fifo_eviction() {
        let mut history = BoundedHistory::new(2);
        history.push(turn("first"));
        history.push(turn("second"));
        history.push(turn("third"));
        let intents: Vec<_> = history.iter().map(|t| t.intent.as_str()).collect();
        assert_eq!(intents, vec!["second", "third"]);
    }

    #[test]
    fn test_bounded_history_zero_capacity_clamped() {
        let mut history = BoundedHistory::new(0);
        history.push(turn("only"));
        assert_eq!(history.len(), 1);
        assert_eq!(history.capacity(), 1);
    }

    #[test]
    fn test_recent_intents_takes_tail() {
        let mut history = BoundedHistory::new(10);
        for name in ["a", "b", "c", "d"] {
            history.push(turn(name));
        }
        assert_eq!(history.recent_intents(3), vec!["b", "c", "d"]);
        assert_eq!(history.recent_intents(10).len(), 4);
    }

    #[test]
    fn test_from_turns_truncates_to_most_recent() {
        let turns: Vec<_> = (0..6).map(|i| turn(&format!("i{i}"))).collect();
        let history = BoundedHistory::from_turns(turns, 4);
        let intents: Vec<_> = history.iter().map(|t| t.intent.as_str()).collect();
        assert_eq!(intents, vec!["i2", "i3", "i4", "i5"]);
    }

    #[test]
    fn test_context_expiry() {
        let mut ctx = UserContext::new("u1", "customer_support", 10);
        let timeout = Duration::from_secs(3600);
        assert!(!ctx.is_expired(Utc::now(), timeout));

        ctx.last_activity = Utc::now() - chrono::Duration::seconds(3601);
        assert!(ctx.is_expired(Utc::now(), timeout));

        // Exactly at the boundary is not expired (strictly longer).
        ctx.last_activity = Utc::now() - chrono::Duration::seconds(3600);
        assert!(!ctx.is_expired(ctx.last_activity + chrono::Duration::seconds(3600), timeout));
    }

    #[test]
    fn test_snapshot_round_trip_reapplies_capacity() {
        let mut ctx = UserContext::new("u1", "customer_support", 10);
        for i in 0..8 {
            ctx.history.push(turn(&format!("i{i}")));
        }
        ctx.user_name = Some("Sam".to_string());

        let snapshot = ContextSnapshot::from_context(&ctx);
        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: ContextSnapshot = serde_json::from_str(&json).unwrap();

        // Import into a smaller capacity truncates to the most recent turns.
        let restored = restored.into_context(3);
        assert_eq!(restored.history.len(), 3);
        assert_eq!(restored.history.recent_intents(1), vec!["i7"]);
        assert_eq!(restored.user_name.as_deref(), Some("Sam"));
    }

    #[test]
    fn test_sentiment_display_from_str() {
        assert_eq!(Sentiment::Positive.to_string(), "positive");
        assert_eq!("negative".parse::<Sentiment>().unwrap(), Sentiment::Negative);
        assert!("meh".parse::<Sentiment>().is_err());
    }
}
