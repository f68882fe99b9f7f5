//! Corpus persistence trait.
//!
//! Defines the interface for loading and saving the training corpus.
//! Uses RPITIT (native async fn in traits, Rust 2024 edition).
//! Implementations live in converse-infra.

use converse_types::corpus::TrainingCorpus;
use converse_types::error::StorageError;

/// Trait for training-corpus persistence.
///
/// `load` is called once at engine construction; `save` after every
/// accepted training example. A failed `save` is a soft outcome: the
/// engine keeps the in-memory corpus and reports the failure to the
/// caller of `train`.
pub trait CorpusStore: Send + Sync {
    /// Load the corpus, seeding a default if no data exists yet.
    fn load(&self) -> impl std::future::Future<Output = Result<TrainingCorpus, StorageError>> + Send;

    /// Persist the full corpus.
    fn save(
        &self,
        corpus: &TrainingCorpus,
    ) -> impl std::future::Future<Output = Result<(), StorageError>> + Send;
}
