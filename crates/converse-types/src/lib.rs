//! Shared domain types for Converse.
//!
//! This crate contains the core domain types used across the Converse engine:
//! the training corpus, per-user conversation context, intent match results,
//! and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, serde_json, chrono,
//! thiserror.

pub mod config;
pub mod context;
pub mod corpus;
pub mod error;
pub mod intent;
