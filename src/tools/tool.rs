//! Tool trait for pluggable, permission-aware tool execution.
//!
//! Tools are self-contained structs holding their own dependencies; the
//! executor dispatches through the trait rather than matching on names.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use crate::llm::ToolDefinition;
use crate::protocol::SessionId;

use super::error::ToolError;

/// Context handed to a tool executor for one invocation.
#[derive(Debug, Clone)]
pub struct ToolContext {
    /// The session the invocation belongs to.
    pub session_id: SessionId,
    /// The session's working context.
    pub working_dir: PathBuf,
}

/// Successful output of a tool execution.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Result content attached to the tool call record.
    pub content: String,
}

impl ToolOutput {
    /// Build an output from any stringifiable content.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// A named, potentially side-effecting tool.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool.
    fn name(&self) -> &str;

    /// Schema handed to the model backend.
    fn definition(&self) -> ToolDefinition;

    /// Whether invocations must be authorized through the permission gate.
    fn requires_permission(&self) -> bool {
        false
    }

    /// Human-readable title for a specific invocation.
    fn title(&self, _arguments: &serde_json::Value) -> String {
        self.name().to_string()
    }

    /// Execute the tool with validated input.
    ///
    /// Never called for invocations whose permission request was
    /// rejected or cancelled.
    async fn execute(
        &self,
        arguments: serde_json::Value,
        ctx: &ToolContext,
    ) -> Result<ToolOutput, ToolError>;
}

/// Type alias for a shared tool reference.
pub type SharedTool = Arc<dyn Tool>;
