//! Mutable per-session state.
//!
//! `SessionState` is owned by exactly one logical worker at a time: the
//! prompt turn locks it for its whole duration, and only the cancel flag
//! (held on [`SessionCell`](super::registry::SessionCell), outside the
//! lock) may be touched concurrently.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

use crate::protocol::{CapabilityServer, Message, PlanEntry, SessionId, ToolCallStatus};

/// Record of a single tool invocation within a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallRecord {
    /// Unique within the session, never reused.
    pub id: String,
    /// Name of the tool invoked.
    pub tool_name: String,
    /// Human-readable title for display.
    pub title: String,
    /// Current status; moves forward only.
    pub status: ToolCallStatus,
    /// Result content, set on successful completion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Error content, set on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolCallRecord {
    /// Create a fresh pending record.
    pub fn pending(id: String, tool_name: String, title: String) -> Self {
        Self {
            id,
            tool_name,
            title,
            status: ToolCallStatus::Pending,
            content: None,
            error: None,
        }
    }

    /// Advance the status, enforcing the forward-only state machine.
    ///
    /// Returns false (and leaves the record untouched) if the transition
    /// would move backward or restart a terminal call.
    pub fn advance(&mut self, next: ToolCallStatus) -> bool {
        if !self.status.can_advance_to(next) {
            warn!(
                tool_call_id = %self.id,
                from = %self.status,
                to = %next,
                "Rejected backward tool call status transition"
            );
            return false;
        }
        self.status = next;
        true
    }
}

/// State of one conversation.
#[derive(Debug)]
pub struct SessionState {
    /// Opaque unique identifier.
    pub id: SessionId,
    /// Client-supplied working context.
    pub working_dir: PathBuf,
    /// Capability providers attached at creation/load time.
    pub capability_servers: Vec<CapabilityServer>,
    /// Append-only message history.
    history: Vec<Message>,
    /// Tool call records in creation order; ids are never reused.
    tool_calls: Vec<ToolCallRecord>,
    /// Monotonic counter backing tool call id allocation.
    next_tool_call_seq: u64,
    /// Current plan, replaced at the start of a turn when non-empty.
    pub plan: Vec<PlanEntry>,
    /// Whether the session is currently usable.
    pub active: bool,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// When the session was last mutated.
    pub updated_at: DateTime<Utc>,
}

impl SessionState {
    /// Create an empty session.
    pub fn new(
        id: SessionId,
        working_dir: PathBuf,
        capability_servers: Vec<CapabilityServer>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            working_dir,
            capability_servers,
            history: Vec::new(),
            tool_calls: Vec::new(),
            next_tool_call_seq: 0,
            plan: Vec::new(),
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// The full message history, oldest first.
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Append a message. History never shrinks and is never edited in place.
    pub fn push_message(&mut self, message: Message) {
        self.history.push(message);
        self.updated_at = Utc::now();
    }

    /// Tool call records in creation order.
    pub fn tool_calls(&self) -> &[ToolCallRecord] {
        &self.tool_calls
    }

    /// Allocate the next tool call id. Ids are unique and never reused.
    pub fn next_tool_call_id(&mut self) -> String {
        self.next_tool_call_seq += 1;
        format!("call_{}", self.next_tool_call_seq)
    }

    /// Insert a new record. The id must come from `next_tool_call_id`.
    pub fn insert_tool_call(&mut self, record: ToolCallRecord) {
        debug_assert!(
            self.tool_calls.iter().all(|r| r.id != record.id),
            "tool call id reused"
        );
        self.tool_calls.push(record);
        self.updated_at = Utc::now();
    }

    /// Advance a record's status through the forward-only state machine.
    ///
    /// Returns false when the record is absent or the transition is
    /// illegal; the session is left untouched in both cases.
    pub fn advance_tool_call(&mut self, id: &str, next: ToolCallStatus) -> bool {
        match self.tool_calls.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                if record.advance(next) {
                    self.updated_at = Utc::now();
                    true
                } else {
                    false
                }
            }
            None => false,
        }
    }

    /// Attach result content to a record.
    pub fn attach_tool_call_content(&mut self, id: &str, content: String) {
        if let Some(record) = self.tool_calls.iter_mut().find(|r| r.id == id) {
            record.content = Some(content);
            self.updated_at = Utc::now();
        }
    }

    /// Attach error content to a record.
    pub fn attach_tool_call_error(&mut self, id: &str, error: String) {
        if let Some(record) = self.tool_calls.iter_mut().find(|r| r.id == id) {
            record.error = Some(error);
            self.updated_at = Utc::now();
        }
    }

    /// Restore internals from a persisted snapshot (crate-internal).
    pub(crate) fn restore(
        &mut self,
        history: Vec<Message>,
        tool_calls: Vec<ToolCallRecord>,
        next_tool_call_seq: u64,
        plan: Vec<PlanEntry>,
        created_at: DateTime<Utc>,
    ) {
        self.history = history;
        self.tool_calls = tool_calls;
        self.next_tool_call_seq = next_tool_call_seq;
        self.plan = plan;
        self.created_at = created_at;
    }

    /// Snapshot internals for persistence (crate-internal).
    pub(crate) fn persisted_parts(
        &self,
    ) -> (&[Message], &[ToolCallRecord], u64, &[PlanEntry]) {
        (
            &self.history,
            &self.tool_calls,
            self.next_tool_call_seq,
            &self.plan,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Role;

    fn empty_state() -> SessionState {
        SessionState::new("sess_test".to_string(), PathBuf::from("/tmp"), Vec::new())
    }

    #[test]
    fn history_is_append_only() {
        let mut state = empty_state();
        state.push_message(Message::text(Role::User, "one"));
        state.push_message(Message::text(Role::Assistant, "two"));

        assert_eq!(state.history().len(), 2);
        assert_eq!(state.history()[0].role, Role::User);
        assert_eq!(state.history()[1].role, Role::Assistant);
    }

    #[test]
    fn tool_call_ids_are_monotonic() {
        let mut state = empty_state();
        assert_eq!(state.next_tool_call_id(), "call_1");
        assert_eq!(state.next_tool_call_id(), "call_2");
        assert_eq!(state.next_tool_call_id(), "call_3");
    }

    #[test]
    fn record_advance_rejects_backward() {
        let mut record = ToolCallRecord::pending(
            "call_1".to_string(),
            "read_file".to_string(),
            "Read file".to_string(),
        );

        assert!(record.advance(ToolCallStatus::InProgress));
        assert!(record.advance(ToolCallStatus::Completed));

        // Terminal: no further transitions
        assert!(!record.advance(ToolCallStatus::Failed));
        assert!(!record.advance(ToolCallStatus::Pending));
        assert_eq!(record.status, ToolCallStatus::Completed);
    }

    #[test]
    fn advance_tool_call_only_touches_timestamp_on_a_hit() {
        let mut state = empty_state();
        let id = state.next_tool_call_id();
        state.insert_tool_call(ToolCallRecord::pending(
            id.clone(),
            "read_file".to_string(),
            "Read file".to_string(),
        ));

        let before = state.updated_at;
        assert!(!state.advance_tool_call("call_9", ToolCallStatus::InProgress));
        assert_eq!(state.updated_at, before);

        assert!(state.advance_tool_call(&id, ToolCallStatus::InProgress));
        assert!(state.updated_at >= before);

        // Illegal transition: rejected, timestamp untouched.
        let before = state.updated_at;
        assert!(!state.advance_tool_call(&id, ToolCallStatus::Pending));
        assert_eq!(state.updated_at, before);
    }

    #[test]
    fn attach_content_on_missing_record_is_a_no_op() {
        let mut state = empty_state();
        let before = state.updated_at;
        state.attach_tool_call_content("call_9", "output".to_string());
        state.attach_tool_call_error("call_9", "boom".to_string());
        assert_eq!(state.updated_at, before);
        assert!(state.tool_calls().is_empty());
    }

    #[test]
    fn record_pending_to_failed_for_rejection() {
        let mut record = ToolCallRecord::pending(
            "call_1".to_string(),
            "write_file".to_string(),
            "Write file".to_string(),
        );
        assert!(record.advance(ToolCallStatus::Failed));
        assert_eq!(record.status, ToolCallStatus::Failed);
    }
}
