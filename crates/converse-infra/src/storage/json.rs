//! JSON-file corpus store.
//!
//! Persists the training corpus as a single JSON file:
//!
//! ```json
//! {"applications": {"customer_support": {"patterns": [...], "responses": [...], "tags": [...]}}}
//! ```
//!
//! When the file does not exist yet, `load` seeds the starter corpus and
//! writes it out, so a fresh deployment answers sensibly on its first
//! request. Mismatched applications are not rejected here -- the index
//! build in converse-core skips them with a warning, keeping a partially
//! bad file loadable.

use std::path::PathBuf;

use converse_core::storage::CorpusStore;
use converse_types::corpus::TrainingCorpus;
use converse_types::error::StorageError;

/// File-backed corpus store.
pub struct JsonCorpusStore {
    path: PathBuf,
}

impl JsonCorpusStore {
    /// Store backed by the given file path (conventionally
    /// `{data_dir}/corpus.json`). Nothing is touched until `load`/`save`.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    async fn write_corpus(&self, corpus: &TrainingCorpus) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(corpus)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

impl CorpusStore for JsonCorpusStore {
    async fn load(&self) -> Result<TrainingCorpus, StorageError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                let corpus: TrainingCorpus = serde_json::from_slice(&bytes)?;
                tracing::info!(
                    path = %self.path.display(),
                    applications = corpus.applications.len(),
                    patterns = corpus.pattern_count(),
                    "loaded training corpus"
                );
                Ok(corpus)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                let corpus = TrainingCorpus::starter();
                tracing::info!(
                    path = %self.path.display(),
                    "no corpus file found, seeding starter corpus"
                );
                self.write_corpus(&corpus).await?;
                Ok(corpus)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn save(&self, corpus: &TrainingCorpus) -> Result<(), StorageError> {
        self.write_corpus(corpus).await?;
        tracing::debug!(
            path = %self.path.display(),
            patterns = corpus.pattern_count(),
            "saved training corpus"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(tmp: &TempDir) -> JsonCorpusStore {
        JsonCorpusStore::new(tmp.path().join("data").join("corpus.json"))
    }

    #[tokio::test]
    async fn load_missing_file_seeds_and_persists_starter() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);

        let corpus = store.load().await.unwrap();
        assert_eq!(corpus.applications.len(), 4);
        assert!(corpus.applications.contains_key("customer_support"));

        // The seed was written out, so a second load reads the file.
        assert!(store.path().exists());
        let again = store.load().await.unwrap();
        assert_eq!(again.pattern_count(), corpus.pattern_count());
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);

        let mut corpus = TrainingCorpus::default();
        corpus.add_example(
            "custom_app",
            "foo bar".to_string(),
            "baz response".to_string(),
            "foo_tag".to_string(),
        );
        store.save(&corpus).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.applications.len(), 1);
        let data = loaded.applications.get("custom_app").unwrap();
        assert_eq!(data.patterns, vec!["foo bar"]);
        assert_eq!(data.responses, vec!["baz response"]);
        assert_eq!(data.tags, vec!["foo_tag"]);
    }

    #[tokio::test]
    async fn load_corrupt_file_errors() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);
        tokio::fs::create_dir_all(store.path().parent().unwrap())
            .await
            .unwrap();
        tokio::fs::write(store.path(), b"not json at all")
            .await
            .unwrap();

        let err = store.load().await.unwrap_err();
        assert!(matches!(err, StorageError::Serde(_)));
    }

    #[tokio::test]
    async fn engine_over_json_store_end_to_end() {
        use converse_core::chat::ChatEngine;
        use converse_types::config::EngineConfig;

        let tmp = TempDir::new().unwrap();
        let engine = ChatEngine::new(store_in(&tmp), EngineConfig::default())
            .await
            .unwrap();

        // Seeded starter corpus resolves a customer-support query.
        let reply = engine
            .resolve_and_respond("where is my order status please", "u1", "customer_support")
            .await;
        assert_eq!(reply.application, "customer_support");
        assert!(reply.confidence >= 0.3);

        // Training writes through to disk and survives a fresh engine.
        assert!(engine.train("custom_app", "foo bar", "baz response", "foo_tag").await);
        let reborn = ChatEngine::new(store_in(&tmp), EngineConfig::default())
            .await
            .unwrap();
        let reply = reborn.resolve_and_respond("foo bar", "u2", "custom_app").await;
        assert_eq!(reply.response, "baz response");
    }

    #[tokio::test]
    async fn load_mismatched_application_still_loads() {
        // Mismatched arrays are a corpus-integrity concern for the index
        // build, not a load failure.
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);
        tokio::fs::create_dir_all(store.path().parent().unwrap())
            .await
            .unwrap();
        tokio::fs::write(
            store.path(),
            br#"{"applications": {"broken": {"patterns": ["a", "b"], "responses": [], "tags": ["one"]}}}"#,
        )
        .await
        .unwrap();

        let corpus = store.load().await.unwrap();
        assert!(!corpus.applications.get("broken").unwrap().is_consistent());
    }
}
