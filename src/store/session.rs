//! Session snapshot storage trait.

use async_trait::async_trait;

use crate::session::SessionSnapshot;

use super::error::StorageResult;

/// Durable key-value persistence of session snapshots, keyed by session id.
///
/// The backing medium (filesystem, embedded DB, remote store) is swappable
/// without touching engine logic.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Write the snapshot for a session, replacing any previous one.
    ///
    /// Must be atomic: either fully succeeds or has no effect.
    async fn put(&self, session_id: &str, snapshot: &SessionSnapshot) -> StorageResult<()>;

    /// Load the snapshot for a session.
    ///
    /// Returns `Ok(None)` if no snapshot exists for the id.
    async fn get(&self, session_id: &str) -> StorageResult<Option<SessionSnapshot>>;

    /// Check whether a snapshot exists for the id.
    async fn exists(&self, session_id: &str) -> StorageResult<bool>;
}
