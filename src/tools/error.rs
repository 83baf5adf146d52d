//! Tool execution error types.

use thiserror::Error;

/// Errors raised by tool lookup or execution.
///
/// Caught at the executor boundary and converted into a `failed`
/// terminal state for that tool call alone; never propagates to fail
/// the whole turn.
#[derive(Debug, Error)]
pub enum ToolError {
    /// No tool with the requested name is registered.
    #[error("tool not found: {0}")]
    NotFound(String),

    /// The invocation arguments did not match the tool's input schema.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// The tool's executor failed.
    #[error("execution failed: {0}")]
    Execution(String),

    /// The tool exceeded the operator-configured execution timeout.
    #[error("tool timed out after {0} seconds")]
    Timeout(u64),
}
