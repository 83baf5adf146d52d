//! Error types for snapshot storage.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by a snapshot store backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing medium failed.
    #[error("storage I/O at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A stored snapshot could not be decoded.
    #[error("corrupt snapshot at {path}: {message}")]
    Corrupt { path: PathBuf, message: String },

    /// A stored snapshot was written by an unknown schema version.
    #[error("snapshot at {path} has schema version {found}, expected {expected}")]
    IncompatibleSchema {
        path: PathBuf,
        expected: String,
        found: String,
    },

    /// A snapshot could not be encoded for writing.
    #[error("failed to encode snapshot: {0}")]
    Encode(String),
}

impl StorageError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn corrupt(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Corrupt {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn incompatible_schema(
        path: impl Into<PathBuf>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::IncompatibleSchema {
            path: path.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
