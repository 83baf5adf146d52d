//! Engine-level error types.
//!
//! These are the errors returned to the caller of an engine operation.
//! Tool execution failures and permission denials are *not* represented
//! here: they terminate a single tool call, never the whole operation.

use thiserror::Error;

use crate::llm::ModelError;
use crate::store::StorageError;

/// Errors returned from engine operations.
///
/// Each variant terminates only the operation that raised it.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The session id is known neither in memory nor in the store.
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// `authenticate` was called with an unadvertised method id.
    #[error("unknown auth method: {0}")]
    UnknownAuthMethod(String),

    /// The request was structurally invalid.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// The model backend failed to produce a turn.
    #[error("model backend error: {0}")]
    Model(#[from] ModelError),

    /// Storage failed while loading a session.
    ///
    /// End-of-turn snapshot writes never surface here; they are logged
    /// as warnings and the turn's result is still returned.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Convenience alias for engine results.
pub type EngineResult<T> = Result<T, EngineError>;
