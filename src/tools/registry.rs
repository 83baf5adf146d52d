//! Registry of available tools.

use std::collections::HashMap;

use crate::llm::ToolDefinition;

use super::tool::SharedTool;

/// Fixed or pluggable set of named tools.
///
/// Built once at engine construction; lookups are by name through an
/// explicit map, not ad hoc string matching in the executor.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, SharedTool>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a single tool, replacing any previous tool of that name.
    pub fn register(mut self, tool: SharedTool) -> Self {
        self.tools.insert(tool.name().to_string(), tool);
        self
    }

    /// Register multiple tools.
    pub fn register_all(mut self, tools: Vec<SharedTool>) -> Self {
        for tool in tools {
            self.tools.insert(tool.name().to_string(), tool);
        }
        self
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<&SharedTool> {
        self.tools.get(name)
    }

    /// Schemas for every registered tool, for the model backend.
    ///
    /// Sorted by name so the backend sees a stable ordering.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut definitions: Vec<_> = self.tools.values().map(|t| t.definition()).collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry has no tools.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
