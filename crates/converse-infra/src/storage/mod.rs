//! Corpus persistence implementations.

mod json;

pub use json::JsonCorpusStore;
