//! Tether - a resumable agent session protocol engine.
//!
//! Sessions are persistent conversations between a client and a
//! language-model backend. The engine records every message, gates
//! side-effecting tool calls behind client permission, streams ordered
//! update events over an injected [`protocol::Channel`], and snapshots
//! each session so it survives a crash or restart.
//!
//! The transport, the model backend, and the tool bodies are supplied
//! by the embedding application through the [`protocol::Channel`],
//! [`llm::ModelBackend`], and [`tools::Tool`] traits.

pub mod config;
pub mod engine;
pub mod error;
pub mod llm;
pub mod permission;
pub mod protocol;
pub mod session;
pub mod store;
pub mod tools;

pub use engine::Engine;
pub use error::{EngineError, EngineResult};
