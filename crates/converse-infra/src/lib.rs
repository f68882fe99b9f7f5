//! Infrastructure implementations for Converse.
//!
//! Implements the persistence port defined in `converse-core` (JSON
//! corpus file store) and provides the `config.toml` loader. Anything
//! that touches the filesystem lives here, never in core.

pub mod config;
pub mod storage;
