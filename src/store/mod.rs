//! Durable session snapshot storage.
//!
//! The engine persists one snapshot per session through the generic
//! [`SessionStore`] trait; file and in-memory backends ship here.

mod error;
mod file;
mod memory;
mod session;

pub use error::{StorageError, StorageResult};
pub use file::FileSessionStore;
pub use memory::MemorySessionStore;
pub use session::SessionStore;
