//! In-memory snapshot storage.
//!
//! Useful for tests and for embedding the engine without any durable
//! medium. Same contract as the file store, minus durability.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::session::SessionSnapshot;

use super::error::StorageResult;
use super::session::SessionStore;

/// In-memory implementation of [`SessionStore`].
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    snapshots: DashMap<String, SessionSnapshot>,
}

impl MemorySessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn put(&self, session_id: &str, snapshot: &SessionSnapshot) -> StorageResult<()> {
        self.snapshots
            .insert(session_id.to_string(), snapshot.clone());
        Ok(())
    }

    async fn get(&self, session_id: &str) -> StorageResult<Option<SessionSnapshot>> {
        Ok(self.snapshots.get(session_id).map(|s| s.clone()))
    }

    async fn exists(&self, session_id: &str) -> StorageResult<bool> {
        Ok(self.snapshots.contains_key(session_id))
    }
}
