//! Durable session snapshot schema.
//!
//! One snapshot per session: the working context, the ordered history,
//! the tool-call table as an ordered list of records, and the plan.
//! Written as YAML by the file store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::protocol::{CapabilityServer, Message, PlanEntry, SessionId};

use super::state::{SessionState, ToolCallRecord};

/// The durable, serializable representation of a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Schema version for forward compatibility.
    pub schema_version: String,
    pub session_id: SessionId,
    pub created_at: DateTime<Utc>,
    /// When this snapshot was taken.
    pub snapshot_at: DateTime<Utc>,
    /// Client-supplied working context.
    pub working_dir: PathBuf,
    #[serde(default)]
    pub capability_servers: Vec<CapabilityServer>,
    /// Ordered message history.
    pub history: Vec<Message>,
    /// Tool call records in creation order; each record carries its id.
    #[serde(default)]
    pub tool_calls: Vec<ToolCallRecord>,
    /// Monotonic counter so restored sessions never reuse a tool call id.
    #[serde(default)]
    pub next_tool_call_seq: u64,
    #[serde(default)]
    pub plan: Vec<PlanEntry>,
}

impl SessionSnapshot {
    /// Current schema version.
    pub const SCHEMA_VERSION: &'static str = "1";

    /// Capture the current state of a session.
    pub fn of(state: &SessionState) -> Self {
        let (history, tool_calls, next_tool_call_seq, plan) = state.persisted_parts();
        Self {
            schema_version: Self::SCHEMA_VERSION.to_string(),
            session_id: state.id.clone(),
            created_at: state.created_at,
            snapshot_at: Utc::now(),
            working_dir: state.working_dir.clone(),
            capability_servers: state.capability_servers.clone(),
            history: history.to_vec(),
            tool_calls: tool_calls.to_vec(),
            next_tool_call_seq,
            plan: plan.to_vec(),
        }
    }

    /// Check if this snapshot was written by a known schema.
    pub fn is_compatible(&self) -> bool {
        self.schema_version == Self::SCHEMA_VERSION
    }

    /// Reconstruct session state from this snapshot.
    ///
    /// The client supplies a fresh working context and capability servers
    /// on load; `cancelRequested` is reset and the session is active.
    pub fn into_state(
        self,
        working_dir: PathBuf,
        capability_servers: Vec<CapabilityServer>,
    ) -> SessionState {
        let mut state = SessionState::new(self.session_id, working_dir, capability_servers);
        state.restore(
            self.history,
            self.tool_calls,
            self.next_tool_call_seq,
            self.plan,
            self.created_at,
        );
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Role, ToolCallStatus};

    fn sample_state() -> SessionState {
        let mut state = SessionState::new(
            "sess_snap".to_string(),
            PathBuf::from("/workspace"),
            Vec::new(),
        );
        state.push_message(Message::text(Role::User, "read the readme"));
        state.push_message(Message::text(Role::Assistant, "done"));
        let id = state.next_tool_call_id();
        let mut record =
            ToolCallRecord::pending(id, "read_file".to_string(), "Read README.md".to_string());
        record.advance(ToolCallStatus::InProgress);
        record.advance(ToolCallStatus::Completed);
        record.content = Some("# readme".to_string());
        state.insert_tool_call(record);
        state
    }

    #[test]
    fn snapshot_yaml_roundtrip() {
        let snapshot = SessionSnapshot::of(&sample_state());

        let yaml = serde_yaml::to_string(&snapshot).unwrap();
        assert!(yaml.contains("session_id: sess_snap"));
        assert!(yaml.contains("schema_version: '1'"));

        let parsed: SessionSnapshot = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.session_id, "sess_snap");
        assert_eq!(parsed.history.len(), 2);
        assert_eq!(parsed.tool_calls.len(), 1);
        assert_eq!(parsed.tool_calls[0].id, "call_1");
        assert_eq!(parsed.next_tool_call_seq, 1);
    }

    #[test]
    fn restored_state_never_reuses_tool_call_ids() {
        let snapshot = SessionSnapshot::of(&sample_state());
        let mut state = snapshot.into_state(PathBuf::from("/elsewhere"), Vec::new());

        assert_eq!(state.next_tool_call_id(), "call_2");
        assert!(state.active);
        assert_eq!(state.working_dir, PathBuf::from("/elsewhere"));
    }

    #[test]
    fn incompatible_schema_detected() {
        let mut snapshot = SessionSnapshot::of(&sample_state());
        snapshot.schema_version = "0".to_string();
        assert!(!snapshot.is_compatible());
    }
}
