//! In-memory registry of live sessions.
//!
//! Each session lives in a [`SessionCell`]: the state behind an async
//! mutex that a prompt turn holds for its full duration, plus a cancel
//! flag outside the lock so cancellation is visible mid-turn.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::{DashMap, Entry};
use tokio::sync::Mutex;
use tracing::info;
use ulid::Ulid;

use crate::protocol::{CapabilityServer, SessionId, SESSION_ID_PREFIX};

use super::state::SessionState;

/// One live session: its state and the out-of-band cancel flag.
pub struct SessionCell {
    state: Mutex<SessionState>,
    cancel_requested: AtomicBool,
}

impl SessionCell {
    fn new(state: SessionState) -> Self {
        Self {
            state: Mutex::new(state),
            cancel_requested: AtomicBool::new(false),
        }
    }

    /// Lock the session state. A prompt turn holds this for its whole
    /// duration, so at most one turn runs per session.
    pub async fn lock(&self) -> tokio::sync::MutexGuard<'_, SessionState> {
        self.state.lock().await
    }

    /// Raise the cancel flag. Safe to call at any time, from any task.
    pub fn request_cancel(&self) {
        self.cancel_requested.store(true, Ordering::SeqCst);
    }

    /// Whether a cancel has been requested and not yet consumed.
    pub fn is_cancel_requested(&self) -> bool {
        self.cancel_requested.load(Ordering::SeqCst)
    }

    /// Lower the cancel flag at the start of a new turn.
    pub fn clear_cancel(&self) {
        self.cancel_requested.store(false, Ordering::SeqCst);
    }
}

/// Registry of sessions currently resident in memory.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: DashMap<SessionId, Arc<SessionCell>>,
    /// Per-id locks serializing load/restore for the same session id.
    loads: DashMap<SessionId, Arc<Mutex<()>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fresh session with a unique id. Always succeeds.
    pub fn create(
        &self,
        working_dir: PathBuf,
        capability_servers: Vec<CapabilityServer>,
    ) -> (SessionId, Arc<SessionCell>) {
        let id = format!("{SESSION_ID_PREFIX}{}", Ulid::new());
        let cell = Arc::new(SessionCell::new(SessionState::new(
            id.clone(),
            working_dir,
            capability_servers,
        )));
        self.sessions.insert(id.clone(), cell.clone());
        info!(session_id = %id, "Session created");
        (id, cell)
    }

    /// Insert a session restored from a snapshot.
    ///
    /// If a session with the same id is already resident, the live cell
    /// is kept and returned and the restored copy is dropped: a snapshot
    /// is always at least as old as the live state, and replacing it
    /// would shrink the append-only history.
    pub fn insert_restored(&self, state: SessionState) -> Arc<SessionCell> {
        let id = state.id.clone();
        match self.sessions.entry(id.clone()) {
            Entry::Occupied(entry) => entry.get().clone(),
            Entry::Vacant(entry) => {
                let cell = Arc::new(SessionCell::new(state));
                entry.insert(cell.clone());
                info!(session_id = %id, "Session restored");
                cell
            }
        }
    }

    /// The lock serializing load/restore operations for one session id.
    ///
    /// Held across the registry-miss, store-read, and insert so two
    /// concurrent loads of the same id cannot race each other; the loser
    /// observes the winner's cell on its re-check.
    pub fn load_lock(&self, session_id: &str) -> Arc<Mutex<()>> {
        self.loads
            .entry(session_id.to_string())
            .or_default()
            .clone()
    }

    /// Look up a resident session by id.
    pub fn get(&self, session_id: &str) -> Option<Arc<SessionCell>> {
        self.sessions.get(session_id).map(|e| e.value().clone())
    }

    /// Number of resident sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
