//! Per-user context store: bounded history, derived signals, expiry.
//!
//! Contexts live in a `DashMap` keyed by user id, so mutations to one
//! user's context are mutually exclusive with each other while distinct
//! user ids never block one another. Expired sessions are swept lazily on
//! each access; there is no background reaper task.

pub mod signals;

use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;

use converse_types::config::EngineConfig;
use converse_types::context::{
    ContextSnapshot, ContextSummary, SessionSummary, Turn, UserContext,
};

/// Owns every live `UserContext`. One instance per engine; tests build
/// their own.
pub struct ContextStore {
    contexts: DashMap<String, UserContext>,
    history_capacity: usize,
    session_timeout: Duration,
}

impl ContextStore {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            contexts: DashMap::new(),
            history_capacity: config.history_capacity,
            session_timeout: Duration::from_secs(config.session_timeout_secs),
        }
    }

    /// Fetch a snapshot of the user's context, creating a fresh one if
    /// absent (or if the previous one expired). Touches last-activity.
    ///
    /// `application` seeds `current_application` on creation only.
    pub fn get_or_create(&self, user_id: &str, application: &str) -> UserContext {
        self.sweep();

        let mut entry = self
            .contexts
            .entry(user_id.to_string())
            .or_insert_with(|| UserContext::new(user_id, application, self.history_capacity));
        entry.last_activity = Utc::now();
        entry.clone()
    }

    /// Append a turn to the user's history and re-derive signals from its
    /// input text. Creates the context if absent.
    pub fn record_turn(&self, user_id: &str, turn: Turn) {
        self.sweep();

        let mut entry = self.contexts.entry(user_id.to_string()).or_insert_with(|| {
            UserContext::new(user_id, &turn.application, self.history_capacity)
        });
        let ctx = entry.value_mut();

        if let Some(name) = signals::extract_name(&turn.user_input) {
            tracing::info!(user_id, name = %name, "extracted user name");
            ctx.user_name = Some(name);
        }
        signals::update_signals(&mut ctx.signals, &turn.user_input);

        ctx.current_application = turn.application.clone();
        ctx.message_count += 1;
        ctx.last_activity = Utc::now();
        tracing::debug!(
            user_id,
            intent = %turn.intent,
            application = %turn.application,
            "recorded turn"
        );
        ctx.history.push(turn);
    }

    /// Remove one user's context. Returns whether it existed.
    pub fn clear(&self, user_id: &str) -> bool {
        let removed = self.contexts.remove(user_id).is_some();
        if removed {
            tracing::info!(user_id, "cleared context");
        }
        removed
    }

    /// Serializable snapshot of one user's context, if live.
    pub fn export(&self, user_id: &str) -> Option<ContextSnapshot> {
        self.contexts
            .get(user_id)
            .map(|ctx| ContextSnapshot::from_context(&ctx))
    }

    /// Restore a context from a snapshot, truncating its history to the
    /// configured capacity if the snapshot exceeds it.
    pub fn import(&self, user_id: &str, snapshot: ContextSnapshot) {
        let mut ctx = snapshot.into_context(self.history_capacity);
        ctx.user_id = user_id.to_string();
        self.contexts.insert(user_id.to_string(), ctx);
        tracing::info!(user_id, "imported context");
    }

    /// Summaries of all live contexts, sorted by user id.
    pub fn list_active(&self) -> Vec<SessionSummary> {
        self.sweep();

        let now = Utc::now();
        let mut sessions: Vec<SessionSummary> = self
            .contexts
            .iter()
            .map(|entry| {
                let ctx = entry.value();
                SessionSummary {
                    user_id: ctx.user_id.clone(),
                    user_name: ctx.user_name.clone(),
                    current_application: ctx.current_application.clone(),
                    message_count: ctx.message_count,
                    session_duration_secs: ctx.session_duration_secs(now),
                    last_activity: ctx.last_activity,
                }
            })
            .collect();
        sessions.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        sessions
    }

    /// Rich summary for one user: session facts plus derived signals and
    /// the most recent intents.
    pub fn summary(&self, user_id: &str) -> Option<ContextSummary> {
        let ctx = self.contexts.get(user_id)?;
        Some(ContextSummary {
            user_id: ctx.user_id.clone(),
            user_name: ctx.user_name.clone(),
            current_application: ctx.current_application.clone(),
            message_count: ctx.message_count,
            session_duration_secs: ctx.session_duration_secs(Utc::now()),
            recent_intents: ctx.history.recent_intents(3),
            has_issues: ctx.signals.has_issues,
            last_sentiment: ctx.signals.last_sentiment,
        })
    }

    pub fn get_preference(&self, user_id: &str, key: &str) -> Option<String> {
        self.contexts
            .get(user_id)
            .and_then(|ctx| ctx.preferences.get(key).cloned())
    }

    pub fn set_preference(&self, user_id: &str, key: &str, value: &str) {
        if let Some(mut ctx) = self.contexts.get_mut(user_id) {
            ctx.preferences.insert(key.to_string(), value.to_string());
        }
    }

    /// Point an existing context at a different application.
    pub fn switch_application(&self, user_id: &str, application: &str) {
        if let Some(mut ctx) = self.contexts.get_mut(user_id) {
            tracing::info!(
                user_id,
                from = %ctx.current_application,
                to = application,
                "switched application"
            );
            ctx.current_application = application.to_string();
        }
    }

    /// Drop every context idle strictly longer than the session timeout.
    fn sweep(&self) {
        let now = Utc::now();
        let timeout = self.session_timeout;
        self.contexts.retain(|user_id, ctx| {
            let live = !ctx.is_expired(now, timeout);
            if !live {
                tracing::info!(user_id, "swept expired session");
            }
            live
        });
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.contexts.len()
    }
}
