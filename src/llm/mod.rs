//! Language-model backend contract.
//!
//! How the backend produces text or decides which tools to call is out of
//! scope: the engine hands it a bounded window of history plus the tool
//! schemas and gets back content blocks and zero or more requested tool
//! invocations. The surrounding application supplies the implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::protocol::{ContentBlock, Message};

/// Schema describing a tool to the model backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON schema for the tool's input.
    pub input_schema: serde_json::Value,
}

/// A tool invocation requested by the model backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// Name of the tool to invoke.
    pub name: String,
    /// Arguments matching the tool's input schema.
    pub arguments: serde_json::Value,
}

/// The backend's output for one turn.
#[derive(Debug, Clone, Default)]
pub struct ModelOutput {
    /// Content blocks to stream to the client, in order.
    pub content: Vec<ContentBlock>,
    /// Tool invocations to execute, in the order they must run.
    pub tool_invocations: Vec<ToolInvocation>,
}

/// Error from the model backend.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("backend returned an invalid response: {0}")]
    InvalidResponse(String),
}

/// An opaque language-model backend.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Produce one turn of output from a bounded history window and the
    /// available tool schemas.
    async fn complete(
        &self,
        history: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<ModelOutput, ModelError>;
}

/// Select the bounded recent window of history handed to the backend.
///
/// Keeps the most recent `window` messages, preserving order.
pub fn recent_window(history: &[Message], window: usize) -> &[Message] {
    let start = history.len().saturating_sub(window);
    &history[start..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Role;

    #[test]
    fn recent_window_bounds() {
        let history: Vec<Message> = (0..10)
            .map(|i| Message::text(Role::User, format!("m{i}")))
            .collect();

        assert_eq!(recent_window(&history, 4).len(), 4);
        assert_eq!(
            recent_window(&history, 4)[0].content[0].as_text(),
            Some("m6")
        );
        assert_eq!(recent_window(&history, 100).len(), 10);
        assert_eq!(recent_window(&history, 0).len(), 0);
    }
}
