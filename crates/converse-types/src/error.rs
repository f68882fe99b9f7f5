use thiserror::Error;

/// Errors related to the training corpus and index construction.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("no training patterns found")]
    Empty,

    #[error("patterns/tags count mismatch for application '{0}'")]
    Mismatched(String),
}

/// Errors from corpus persistence operations.
///
/// Used by the `CorpusStore` trait in converse-core; implementations
/// live in converse-infra.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
