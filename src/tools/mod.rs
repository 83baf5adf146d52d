//! Tool registry and permission-gated tool execution.

pub mod builtins;
mod error;
mod executor;
mod registry;
mod tool;

pub use error::ToolError;
pub use executor::ToolCallExecutor;
pub use registry::ToolRegistry;
pub use tool::{SharedTool, Tool, ToolContext, ToolOutput};
