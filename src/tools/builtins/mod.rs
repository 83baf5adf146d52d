//! Built-in tools shipped with the engine.

mod fs;

pub use fs::{ReadFileTool, WriteFileTool};

use std::sync::Arc;

use super::tool::SharedTool;

/// The default tool set.
pub fn defaults() -> Vec<SharedTool> {
    vec![Arc::new(ReadFileTool), Arc::new(WriteFileTool)]
}
