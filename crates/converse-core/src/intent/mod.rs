//! Intent resolution: normalization, vector lookup, contextual re-scoring.

mod resolver;

pub use resolver::IntentResolver;
