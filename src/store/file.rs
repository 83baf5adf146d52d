//! File-based snapshot storage.
//!
//! One YAML file per session:
//! ```text
//! {sessions_dir}/
//!   {session_id}.yaml
//! ```
//! Writes go to a temp file first and are renamed into place so a crash
//! never leaves a half-written snapshot.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use crate::session::SessionSnapshot;

use super::error::{StorageError, StorageResult};
use super::session::SessionStore;

/// File-based implementation of [`SessionStore`].
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    sessions_dir: PathBuf,
}

impl FileSessionStore {
    /// Create a new file session store.
    ///
    /// The directory is created when the first snapshot is written.
    pub fn new(sessions_dir: impl Into<PathBuf>) -> Self {
        Self {
            sessions_dir: sessions_dir.into(),
        }
    }

    fn snapshot_path(&self, session_id: &str) -> PathBuf {
        self.sessions_dir.join(format!("{session_id}.yaml"))
    }

    async fn ensure_dir(&self) -> StorageResult<()> {
        fs::create_dir_all(&self.sessions_dir)
            .await
            .map_err(|e| StorageError::io(&self.sessions_dir, e))
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn put(&self, session_id: &str, snapshot: &SessionSnapshot) -> StorageResult<()> {
        self.ensure_dir().await?;

        let final_path = self.snapshot_path(session_id);
        let temp_path = self.sessions_dir.join(format!("{session_id}.yaml.tmp"));

        let yaml = serde_yaml::to_string(snapshot)
            .map_err(|e| StorageError::Encode(e.to_string()))?;

        fs::write(&temp_path, yaml.as_bytes())
            .await
            .map_err(|e| StorageError::io(&temp_path, e))?;

        fs::rename(&temp_path, &final_path)
            .await
            .map_err(|e| StorageError::io(&final_path, e))?;

        Ok(())
    }

    async fn get(&self, session_id: &str) -> StorageResult<Option<SessionSnapshot>> {
        let path = self.snapshot_path(session_id);

        let contents = match fs::read_to_string(&path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::io(&path, e)),
        };

        let snapshot: SessionSnapshot = serde_yaml::from_str(&contents)
            .map_err(|e| StorageError::corrupt(&path, e.to_string()))?;

        if !snapshot.is_compatible() {
            return Err(StorageError::incompatible_schema(
                &path,
                SessionSnapshot::SCHEMA_VERSION,
                &snapshot.schema_version,
            ));
        }

        Ok(Some(snapshot))
    }

    async fn exists(&self, session_id: &str) -> StorageResult<bool> {
        let path = self.snapshot_path(session_id);
        match fs::metadata(&path).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::io(&path, e)),
        }
    }
}
