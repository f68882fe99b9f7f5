//! Intent resolution engine and conversation orchestration for Converse.
//!
//! This crate owns the full per-turn pipeline: lexical normalization,
//! TF-IDF vector space lookup, contextual confidence adjustment, the
//! per-user context store, and the orchestrator that ties them together.
//! It defines the `CorpusStore` persistence port; implementations live in
//! `converse-infra`. Depends only on `converse-types` -- never on any
//! IO crate.

pub mod chat;
pub mod context;
pub mod index;
pub mod intent;
pub mod normalize;
pub mod storage;
