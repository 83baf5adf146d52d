//! Core protocol data types shared between the engine and its client.

use serde::{Deserialize, Serialize};

/// Opaque unique session identifier.
pub type SessionId = String;

/// Prefix for generated session ids.
pub const SESSION_ID_PREFIX: &str = "sess_";

/// Protocol version implemented by this engine.
pub const PROTOCOL_VERSION: u16 = 1;

/// A single block of message content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain text.
    Text { text: String },
    /// Base64-encoded image data.
    Image { mime_type: String, data: String },
}

impl ContentBlock {
    /// Create a text block.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// The text of this block, if it is a text block.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            Self::Image { .. } => None,
        }
    }
}

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One message in the session history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

impl Message {
    /// Create a message from a role and content blocks.
    pub fn new(role: Role, content: Vec<ContentBlock>) -> Self {
        Self { role, content }
    }

    /// Create a single-block text message.
    pub fn text(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            content: vec![ContentBlock::text(text)],
        }
    }
}

/// Terminal classification of a completed prompt turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The turn ran to completion.
    EndTurn,
    /// A cancel notification was observed during the turn.
    Cancelled,
}

/// Status of a tool call within its state machine.
///
/// Moves strictly forward: `Pending` → `InProgress` → `Completed`/`Failed`,
/// with `Pending` → `Failed` allowed for permission rejections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCallStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl ToolCallStatus {
    /// Whether `next` is a legal forward transition from `self`.
    pub fn can_advance_to(self, next: ToolCallStatus) -> bool {
        use ToolCallStatus::*;
        matches!(
            (self, next),
            (Pending, InProgress) | (Pending, Failed) | (InProgress, Completed) | (InProgress, Failed)
        )
    }

    /// Whether this status is terminal.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for ToolCallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Relative priority of a plan entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanPriority {
    Low,
    Medium,
    High,
}

/// Progress status of a plan entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanEntryStatus {
    Pending,
    InProgress,
    Completed,
}

/// A coarse, human-readable statement of an upcoming step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanEntry {
    pub description: String,
    pub priority: PlanPriority,
    pub status: PlanEntryStatus,
}

impl PlanEntry {
    /// Create a pending plan entry.
    pub fn new(description: impl Into<String>, priority: PlanPriority) -> Self {
        Self {
            description: description.into(),
            priority,
            status: PlanEntryStatus::Pending,
        }
    }
}

/// Descriptor for an external capability provider attached to a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityServer {
    /// Display name of the provider.
    pub name: String,
    /// Command used to launch the provider.
    pub command: String,
    /// Arguments passed to the command.
    #[serde(default)]
    pub args: Vec<String>,
}

/// One selectable option in a permission request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionOption {
    /// Identifier echoed back in the client's decision.
    pub id: String,
    /// Human-readable label.
    pub label: String,
    /// Whether selecting this option authorizes the tool call.
    pub kind: PermissionOptionKind,
}

/// Classification of a permission option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionOptionKind {
    AllowOnce,
    RejectOnce,
}

impl PermissionOption {
    /// The minimum option set offered with every permission request.
    pub fn defaults() -> Vec<PermissionOption> {
        vec![
            PermissionOption {
                id: "allow_once".to_string(),
                label: "Allow once".to_string(),
                kind: PermissionOptionKind::AllowOnce,
            },
            PermissionOption {
                id: "reject_once".to_string(),
                label: "Reject".to_string(),
                kind: PermissionOptionKind::RejectOnce,
            },
        ]
    }
}

/// The client's resolution of a permission request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PermissionOutcome {
    /// The client picked one of the offered options.
    Selected { option_id: String },
    /// The request was cancelled before a choice was made.
    Cancelled,
}

/// An authentication method advertised by `initialize`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthMethod {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Engine capabilities reported during initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineCapabilities {
    /// Whether persisted sessions can be restored via `loadSession`.
    pub load_session: bool,
}

impl Default for EngineCapabilities {
    fn default() -> Self {
        Self { load_session: true }
    }
}

/// Response to `initialize`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitializeResponse {
    /// The protocol version the engine will speak.
    pub protocol_version: u16,
    pub capabilities: EngineCapabilities,
    pub auth_methods: Vec<AuthMethod>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_transitions_forward_only() {
        use ToolCallStatus::*;
        assert!(Pending.can_advance_to(InProgress));
        assert!(Pending.can_advance_to(Failed));
        assert!(InProgress.can_advance_to(Completed));
        assert!(InProgress.can_advance_to(Failed));

        assert!(!InProgress.can_advance_to(Pending));
        assert!(!Completed.can_advance_to(Failed));
        assert!(!Failed.can_advance_to(Pending));
        assert!(!Pending.can_advance_to(Completed));
    }

    #[test]
    fn permission_outcome_serialization() {
        let selected = PermissionOutcome::Selected {
            option_id: "allow_once".to_string(),
        };
        let json = serde_json::to_string(&selected).unwrap();
        assert!(json.contains("\"outcome\":\"selected\""));
        assert!(json.contains("\"option_id\":\"allow_once\""));

        let cancelled: PermissionOutcome =
            serde_json::from_str(r#"{"outcome":"cancelled"}"#).unwrap();
        assert_eq!(cancelled, PermissionOutcome::Cancelled);
    }

    #[test]
    fn content_block_serialization() {
        let block = ContentBlock::text("hello");
        let json = serde_json::to_string(&block).unwrap();
        assert!(json.contains("\"type\":\"text\""));
        assert!(json.contains("\"text\":\"hello\""));
    }

    #[test]
    fn default_permission_options() {
        let options = PermissionOption::defaults();
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].id, "allow_once");
        assert_eq!(options[0].kind, PermissionOptionKind::AllowOnce);
        assert_eq!(options[1].id, "reject_once");
        assert_eq!(options[1].kind, PermissionOptionKind::RejectOnce);
    }
}
