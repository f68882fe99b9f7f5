//! Conversation orchestration: the coupling layer between intent
//! resolution and the context store.

pub mod responses;
mod service;

pub use service::ChatEngine;
