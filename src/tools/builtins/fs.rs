//! Filesystem tools: permission-gated file read and write.
//!
//! Paths are resolved against the session's working context. Both tools
//! require authorization through the permission gate before execution.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tokio::fs;
use tracing::debug;

use crate::llm::ToolDefinition;

use super::super::error::ToolError;
use super::super::tool::{Tool, ToolContext, ToolOutput};

#[derive(Debug, Deserialize)]
struct ReadFileParams {
    path: String,
}

#[derive(Debug, Deserialize)]
struct WriteFileParams {
    path: String,
    content: String,
}

fn parse_params<T: serde::de::DeserializeOwned>(
    arguments: serde_json::Value,
) -> Result<T, ToolError> {
    serde_json::from_value(arguments).map_err(|e| ToolError::InvalidArguments(e.to_string()))
}

fn resolve(working_dir: &Path, path: &str) -> PathBuf {
    let candidate = PathBuf::from(path);
    if candidate.is_absolute() {
        candidate
    } else {
        working_dir.join(candidate)
    }
}

/// Read a file from the session's working context.
pub struct ReadFileTool;

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: "Read the contents of a file".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "Path to read, relative to the working directory"
                    }
                },
                "required": ["path"]
            }),
        }
    }

    fn requires_permission(&self) -> bool {
        true
    }

    fn title(&self, arguments: &serde_json::Value) -> String {
        match arguments.get("path").and_then(|v| v.as_str()) {
            Some(path) => format!("Read {path}"),
            None => self.name().to_string(),
        }
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        ctx: &ToolContext,
    ) -> Result<ToolOutput, ToolError> {
        let params: ReadFileParams = parse_params(arguments)?;
        let path = resolve(&ctx.working_dir, &params.path);

        debug!(session_id = %ctx.session_id, path = %path.display(), "Reading file");
        let content = fs::read_to_string(&path)
            .await
            .map_err(|e| ToolError::Execution(format!("read {}: {e}", path.display())))?;
        Ok(ToolOutput::new(content))
    }
}

/// Write a file under the session's working context.
pub struct WriteFileTool;

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &str {
        "write_file"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: "Write content to a file, replacing it if it exists".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "Path to write, relative to the working directory"
                    },
                    "content": {
                        "type": "string",
                        "description": "Full content for the file"
                    }
                },
                "required": ["path", "content"]
            }),
        }
    }

    fn requires_permission(&self) -> bool {
        true
    }

    fn title(&self, arguments: &serde_json::Value) -> String {
        match arguments.get("path").and_then(|v| v.as_str()) {
            Some(path) => format!("Write {path}"),
            None => self.name().to_string(),
        }
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        ctx: &ToolContext,
    ) -> Result<ToolOutput, ToolError> {
        let params: WriteFileParams = parse_params(arguments)?;
        let path = resolve(&ctx.working_dir, &params.path);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ToolError::Execution(format!("mkdir {}: {e}", parent.display())))?;
        }

        debug!(session_id = %ctx.session_id, path = %path.display(), "Writing file");
        fs::write(&path, params.content.as_bytes())
            .await
            .map_err(|e| ToolError::Execution(format!("write {}: {e}", path.display())))?;
        Ok(ToolOutput::new(format!(
            "Wrote {} bytes to {}",
            params.content.len(),
            params.path
        )))
    }
}
