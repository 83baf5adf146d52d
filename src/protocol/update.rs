//! Update events pushed from the engine to the client.
//!
//! Every state transition inside a turn emits exactly one update through
//! the channel, in the order the transition happened. A reconnecting
//! client rebuilds its view by replaying the same events on `loadSession`.

use serde::{Deserialize, Serialize};

use super::types::{ContentBlock, PermissionOption, PlanEntry, SessionId, ToolCallStatus};

/// A notification pushed to the client, scoped to one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionNotification {
    pub session_id: SessionId,
    pub update: SessionUpdate,
}

/// The payload of a pushed update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionUpdate {
    /// One block of an inbound user message, in input order.
    UserMessageChunk { content: ContentBlock },
    /// One block of the assistant's response, in output order.
    AgentMessageChunk { content: ContentBlock },
    /// The turn's derived plan, emitted once when non-empty.
    Plan { entries: Vec<PlanEntry> },
    /// A tool call record was created (or replayed with its stored state).
    ToolCall {
        id: String,
        tool_name: String,
        title: String,
        status: ToolCallStatus,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
    },
    /// A tool call changed status or gained content.
    ToolCallUpdate {
        id: String,
        status: ToolCallStatus,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
    },
}

/// An engine-initiated request for a permission decision.
///
/// The decision travels back through `Engine::resolve_permission`; the
/// channel only carries the outbound request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRequest {
    pub session_id: SessionId,
    pub tool_call_id: String,
    /// Title of the tool call awaiting authorization.
    pub title: String,
    pub options: Vec<PermissionOption>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::types::ContentBlock;

    #[test]
    fn update_serialization_tags() {
        let update = SessionUpdate::UserMessageChunk {
            content: ContentBlock::text("hi"),
        };
        let json = serde_json::to_string(&update).unwrap();
        assert!(json.contains("\"type\":\"user_message_chunk\""));

        let update = SessionUpdate::ToolCallUpdate {
            id: "call_1".to_string(),
            status: ToolCallStatus::InProgress,
            content: None,
        };
        let json = serde_json::to_string(&update).unwrap();
        assert!(json.contains("\"type\":\"tool_call_update\""));
        assert!(json.contains("\"status\":\"in_progress\""));
        assert!(!json.contains("\"content\""));
    }

    #[test]
    fn notification_roundtrip() {
        let notification = SessionNotification {
            session_id: "sess_abc".to_string(),
            update: SessionUpdate::Plan {
                entries: vec![PlanEntry::new(
                    "Read the requested file",
                    crate::protocol::types::PlanPriority::Medium,
                )],
            },
        };
        let json = serde_json::to_string(&notification).unwrap();
        let parsed: SessionNotification = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, notification);
    }
}
