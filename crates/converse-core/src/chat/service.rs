//! `ChatEngine`: the conversation orchestrator.
//!
//! Owns the corpus, the published vector space index, the resolver, and
//! the context store. One instance per process (or per test); no ambient
//! global state.
//!
//! Index lifecycle: retraining builds a replacement index entirely off to
//! the side and publishes it with one lock write, so in-flight queries
//! observe either the fully-old or fully-new index, never a partial one.
//!
//! Persistence asymmetry, by design: when saving the corpus fails after a
//! `train` call, the in-memory corpus and the rebuilt index keep the new
//! example for the rest of the process lifetime; only the boolean result
//! tells the caller persistence failed.

use std::sync::{Arc, RwLock};

use chrono::Utc;

use converse_types::config::EngineConfig;
use converse_types::corpus::TrainingCorpus;
use converse_types::error::{CorpusError, StorageError};
use converse_types::intent::{ApplicationStats, ChatReply, CorpusStats, ModelInfo};

use crate::context::{signals, ContextStore};
use crate::index::VectorSpaceIndex;
use crate::intent::IntentResolver;
use crate::normalize::normalize;
use crate::storage::CorpusStore;

use super::responses;

/// Question words that trigger name personalization on a turn.
const QUESTION_WORDS: [&str; 4] = ["how", "what", "when", "where"];

/// The engine behind `resolve_and_respond`/`train`/`list_applications`.
pub struct ChatEngine<S> {
    store: S,
    config: EngineConfig,
    resolver: IntentResolver,
    contexts: ContextStore,
    corpus: RwLock<TrainingCorpus>,
    index: RwLock<Option<Arc<VectorSpaceIndex>>>,
}

impl<S: CorpusStore> ChatEngine<S> {
    /// Load the corpus from the store and build the initial index.
    ///
    /// An empty corpus is tolerated: the engine answers "unknown" until
    /// the first `train` call.
    pub async fn new(store: S, config: EngineConfig) -> Result<Self, StorageError> {
        let corpus = store.load().await?;

        let index = match VectorSpaceIndex::build(&corpus, config.max_features) {
            Ok(index) => Some(Arc::new(index)),
            Err(CorpusError::Empty) => {
                tracing::warn!("corpus has no training patterns, starting untrained");
                None
            }
            Err(err) => {
                tracing::warn!(error = %err, "index build failed, starting untrained");
                None
            }
        };

        Ok(Self {
            store,
            resolver: IntentResolver::new(&config),
            contexts: ContextStore::new(&config),
            corpus: RwLock::new(corpus),
            index: RwLock::new(index),
            config,
        })
    }

    /// Handle one turn. Never errors: empty input gets the fixed
    /// "please provide input" reply, internal failures the fixed apology,
    /// both with zero confidence.
    #[tracing::instrument(skip(self, text))]
    pub async fn resolve_and_respond(
        &self,
        text: &str,
        user_id: &str,
        application: &str,
    ) -> ChatReply {
        if text.trim().is_empty() {
            return ChatReply {
                response: responses::EMPTY_INPUT_RESPONSE.to_string(),
                confidence: 0.0,
                application: application.to_string(),
                context_used: false,
            };
        }

        let ctx = self.contexts.get_or_create(user_id, application);
        let context_used = !ctx.history.is_empty();
        let recent_intents = ctx.history.recent_intents(self.config.recent_window);

        let index = match self.index.read() {
            Ok(guard) => guard.clone(),
            Err(_) => {
                tracing::error!(user_id, application, "index lock poisoned");
                return Self::apology(application);
            }
        };

        let matched = self
            .resolver
            .resolve(index.as_deref(), text, application, &recent_intents);

        let seed = ctx.message_count;
        let mut response = if matched.is_unknown() {
            responses::fallback(application, seed)
        } else {
            let candidates = match self.corpus.read() {
                Ok(corpus) => {
                    responses::candidates_for_tag(&corpus, &matched.application, &matched.tag)
                }
                Err(_) => {
                    tracing::error!(user_id, application, "corpus lock poisoned");
                    return Self::apology(application);
                }
            };
            match responses::select(&candidates, seed) {
                Some(candidate) => candidate.to_string(),
                None => responses::fallback(application, seed),
            }
        };

        // Name handling operates on the raw input, not the normalized form.
        let introduced_name = signals::extract_name(text);
        if let Some(name) = &introduced_name {
            response = format!("Nice to meet you, {name}! {response}");
        } else if let Some(name) = &ctx.user_name {
            let normalized = normalize(text);
            let question_like = normalized
                .split_whitespace()
                .any(|token| QUESTION_WORDS.contains(&token));
            if question_like {
                response = format!("{response} By the way, {name}!");
            }
        }

        self.contexts.record_turn(
            user_id,
            converse_types::context::Turn {
                timestamp: Utc::now(),
                user_input: text.to_string(),
                bot_response: response.clone(),
                intent: matched.tag.clone(),
                application: application.to_string(),
            },
        );

        tracing::debug!(
            user_id,
            application,
            intent = %matched.tag,
            confidence = matched.confidence,
            "turn handled"
        );

        ChatReply {
            response,
            confidence: matched.confidence,
            application: matched.application,
            context_used,
        }
    }

    /// Append one labeled example, rebuild the index, and persist the
    /// corpus. Returns false iff persistence fails -- the in-memory
    /// corpus and index keep the example either way.
    #[tracing::instrument(skip(self, pattern, response))]
    pub async fn train(&self, application: &str, pattern: &str, response: &str, tag: &str) -> bool {
        let snapshot = {
            let Ok(mut corpus) = self.corpus.write() else {
                tracing::error!(application, "corpus lock poisoned");
                return false;
            };
            corpus.add_example(
                application,
                pattern.to_string(),
                response.to_string(),
                tag.to_string(),
            );
            corpus.clone()
        };

        if !self.publish_index(&snapshot) {
            return false;
        }
        tracing::info!(application, tag, "training example added");

        match self.store.save(&snapshot).await {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(
                    application,
                    error = %err,
                    "corpus persistence failed; example remains in memory only"
                );
                false
            }
        }
    }

    /// Rebuild and publish the index from the current corpus.
    pub fn retrain(&self) -> bool {
        let snapshot = match self.corpus.read() {
            Ok(corpus) => corpus.clone(),
            Err(_) => return false,
        };
        self.publish_index(&snapshot)
    }

    /// Build a fresh index off to the side, then swap it in atomically.
    fn publish_index(&self, corpus: &TrainingCorpus) -> bool {
        match VectorSpaceIndex::build(corpus, self.config.max_features) {
            Ok(index) => {
                if let Ok(mut slot) = self.index.write() {
                    *slot = Some(Arc::new(index));
                    true
                } else {
                    tracing::error!("index lock poisoned");
                    false
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "index rebuild failed, keeping previous index");
                false
            }
        }
    }

    /// Ordered application ids.
    pub fn list_applications(&self) -> Vec<String> {
        self.corpus
            .read()
            .map(|corpus| corpus.application_ids())
            .unwrap_or_default()
    }

    /// Per-application and total corpus counts.
    pub fn corpus_stats(&self) -> CorpusStats {
        let Ok(corpus) = self.corpus.read() else {
            return CorpusStats {
                total_applications: 0,
                total_patterns: 0,
                total_responses: 0,
                applications: Vec::new(),
            };
        };
        let applications: Vec<ApplicationStats> = corpus
            .applications
            .iter()
            .map(|(app, data)| ApplicationStats {
                application: app.clone(),
                patterns: data.patterns.len(),
                responses: data.responses.len(),
                tags: data.tags.len(),
            })
            .collect();
        CorpusStats {
            total_applications: applications.len(),
            total_patterns: applications.iter().map(|a| a.patterns).sum(),
            total_responses: applications.iter().map(|a| a.responses).sum(),
            applications,
        }
    }

    /// Index/model diagnostics.
    pub fn model_info(&self) -> ModelInfo {
        let index = self.index.read().ok().and_then(|guard| guard.clone());
        ModelInfo {
            trained: index.is_some(),
            pattern_count: index.as_ref().map(|i| i.pattern_count()).unwrap_or(0),
            applications: self.list_applications(),
            vocabulary_size: index.as_ref().map(|i| i.vocabulary_size()).unwrap_or(0),
            min_confidence: self.config.min_confidence,
        }
    }

    /// Access to per-user context operations (clear, export/import,
    /// summaries, preferences).
    pub fn contexts(&self) -> &ContextStore {
        &self.contexts
    }

    fn apology(application: &str) -> ChatReply {
        ChatReply {
            response: responses::APOLOGY_RESPONSE.to_string(),
            confidence: 0.0,
            application: application.to_string(),
            context_used: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    /// In-memory corpus store with a switchable save-failure mode.
    struct MemoryStore {
        corpus: Mutex<TrainingCorpus>,
        fail_saves: AtomicBool,
    }

    impl MemoryStore {
        fn new(corpus: TrainingCorpus) -> Self {
            Self {
                corpus: Mutex::new(corpus),
                fail_saves: AtomicBool::new(false),
            }
        }

        fn saved_pattern_count(&self) -> usize {
            self.corpus.lock().unwrap().pattern_count()
        }
    }

    impl CorpusStore for &MemoryStore {
        async fn load(&self) -> Result<TrainingCorpus, StorageError> {
            Ok(self.corpus.lock().unwrap().clone())
        }

        async fn save(&self, corpus: &TrainingCorpus) -> Result<(), StorageError> {
            if self.fail_saves.load(Ordering::SeqCst) {
                return Err(StorageError::Io(std::io::Error::other("disk full")));
            }
            *self.corpus.lock().unwrap() = corpus.clone();
            Ok(())
        }
    }

    async fn engine(store: &MemoryStore) -> ChatEngine<&MemoryStore> {
        ChatEngine::new(store, EngineConfig::default()).await.unwrap()
    }

    fn support_corpus() -> TrainingCorpus {
        let mut corpus = TrainingCorpus::default();
        corpus.add_example(
            "customer_support",
            "order status".to_string(),
            "I can check your order status.".to_string(),
            "order_status".to_string(),
        );
        corpus.add_example(
            "customer_support",
            "return policy".to_string(),
            "Returns are accepted within 30 days.".to_string(),
            "return_policy".to_string(),
        );
        corpus
    }

    #[tokio::test]
    async fn test_empty_input_neutral_reply() {
        let store = MemoryStore::new(support_corpus());
        let engine = engine(&store).await;
        for text in ["", "   ", "\t\n"] {
            let reply = engine.resolve_and_respond(text, "u1", "customer_support").await;
            assert_eq!(reply.response, responses::EMPTY_INPUT_RESPONSE);
            assert_eq!(reply.confidence, 0.0);
            assert!(!reply.context_used);
        }
    }

    #[tokio::test]
    async fn test_order_status_scenario_with_in_app_boost() {
        let store = MemoryStore::new(support_corpus());
        let engine = engine(&store).await;
        let reply = engine
            .resolve_and_respond("where is my order status please", "u1", "customer_support")
            .await;
        assert_eq!(reply.application, "customer_support");
        assert!(reply.confidence >= 0.3 * 1.10 - 1e-5, "confidence = {}", reply.confidence);
        assert!(reply.confidence <= 1.0);
        assert_eq!(reply.response, "I can check your order status.");
    }

    #[tokio::test]
    async fn test_nonsense_falls_back() {
        let store = MemoryStore::new(support_corpus());
        let engine = engine(&store).await;
        let reply = engine
            .resolve_and_respond("xyzxyz nonsense", "u1", "customer_support")
            .await;
        assert_eq!(reply.confidence, 0.0);
        // One of the customer_support fallback candidates.
        assert!(reply.response.contains("customer"));
    }

    #[tokio::test]
    async fn test_untrained_engine_answers_unknown_until_trained() {
        let store = MemoryStore::new(TrainingCorpus::default());
        let engine = engine(&store).await;
        assert!(!engine.model_info().trained);

        let reply = engine
            .resolve_and_respond("foo bar", "u1", "custom_app")
            .await;
        assert_eq!(reply.confidence, 0.0);

        assert!(engine.train("custom_app", "foo bar", "baz response", "foo_tag").await);
        assert!(engine.model_info().trained);

        let reply = engine
            .resolve_and_respond("foo bar", "u1", "custom_app")
            .await;
        // Exact match against a single-document corpus.
        assert!((reply.confidence - 1.0).abs() < 1e-5, "confidence = {}", reply.confidence);
        assert_eq!(reply.response, "baz response");
        assert_eq!(reply.application, "custom_app");
    }

    #[tokio::test]
    async fn test_train_persists_and_lists_application() {
        let store = MemoryStore::new(support_corpus());
        let engine = engine(&store).await;
        assert!(engine.train("custom_app", "foo bar", "baz", "foo_tag").await);
        assert_eq!(
            engine.list_applications(),
            vec!["custom_app".to_string(), "customer_support".to_string()]
        );
        assert_eq!(store.saved_pattern_count(), 3);

        let stats = engine.corpus_stats();
        assert_eq!(stats.total_applications, 2);
        assert_eq!(stats.total_patterns, 3);
    }

    #[tokio::test]
    async fn test_train_persistence_failure_keeps_example_in_memory() {
        let store = MemoryStore::new(support_corpus());
        let engine = engine(&store).await;
        store.fail_saves.store(true, Ordering::SeqCst);

        assert!(!engine.train("custom_app", "foo bar", "baz response", "foo_tag").await);
        // Not persisted...
        assert_eq!(store.saved_pattern_count(), 2);
        // ...but still queryable for the rest of the process lifetime.
        let reply = engine
            .resolve_and_respond("foo bar", "u1", "custom_app")
            .await;
        assert_eq!(reply.response, "baz response");
        assert!((reply.confidence - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_context_used_flips_after_first_turn() {
        let store = MemoryStore::new(support_corpus());
        let engine = engine(&store).await;
        let first = engine
            .resolve_and_respond("order status", "u1", "customer_support")
            .await;
        assert!(!first.context_used);
        let second = engine
            .resolve_and_respond("return policy", "u1", "customer_support")
            .await;
        assert!(second.context_used);
        // A different user starts fresh.
        let other = engine
            .resolve_and_respond("order status", "u2", "customer_support")
            .await;
        assert!(!other.context_used);
    }

    #[tokio::test]
    async fn test_name_introduction_then_personalized_question() {
        let store = MemoryStore::new(support_corpus());
        let engine = engine(&store).await;

        let intro = engine
            .resolve_and_respond("my name is Sam", "u1", "customer_support")
            .await;
        assert!(intro.response.starts_with("Nice to meet you, Sam!"), "{}", intro.response);

        let question = engine
            .resolve_and_respond("what time is it", "u1", "customer_support")
            .await;
        assert!(question.response.contains("Sam"), "{}", question.response);

        // Non-question turns stay unpersonalized.
        let statement = engine
            .resolve_and_respond("order status", "u1", "customer_support")
            .await;
        assert!(!statement.response.contains("Sam"), "{}", statement.response);
    }

    #[tokio::test]
    async fn test_response_is_one_of_configured_candidates() {
        let mut corpus = TrainingCorpus::default();
        for (pattern, response) in [
            ("hello", "Hi there!"),
            ("hi", "Hello!"),
            ("hey", "Hey, how can I help?"),
        ] {
            corpus.add_example(
                "customer_support",
                pattern.to_string(),
                response.to_string(),
                "greeting".to_string(),
            );
        }
        let store = MemoryStore::new(corpus);
        let engine = engine(&store).await;

        let candidates = ["Hi there!", "Hello!", "Hey, how can I help?"];
        let mut seen = std::collections::HashSet::new();
        for _ in 0..3 {
            let reply = engine
                .resolve_and_respond("hello", "u1", "customer_support")
                .await;
            assert!(candidates.contains(&reply.response.as_str()), "{}", reply.response);
            seen.insert(reply.response);
        }
        // Rotation actually varies the pick across turns.
        assert!(seen.len() > 1);
    }

    #[tokio::test]
    async fn test_retrain_rebuilds_from_current_corpus() {
        let store = MemoryStore::new(support_corpus());
        let engine = engine(&store).await;
        assert!(engine.retrain());
        assert_eq!(engine.model_info().pattern_count, 2);
    }

    #[tokio::test]
    async fn test_model_info_reports_vocabulary() {
        let store = MemoryStore::new(support_corpus());
        let engine = engine(&store).await;
        let info = engine.model_info();
        assert!(info.trained);
        assert_eq!(info.pattern_count, 2);
        assert!(info.vocabulary_size > 0);
        assert_eq!(info.min_confidence, 0.3);
    }
}
