//! Protocol types exchanged between client and engine.
//!
//! The wire encoding is out of scope; these types define the logical
//! shape of operations, updates, and permission requests. The transport
//! is abstracted behind the [`Channel`] trait.

mod channel;
mod types;
mod update;

pub use channel::Channel;
pub use types::{
    AuthMethod, CapabilityServer, ContentBlock, EngineCapabilities, InitializeResponse, Message,
    PROTOCOL_VERSION, PermissionOption, PermissionOptionKind, PermissionOutcome, PlanEntry,
    PlanEntryStatus, PlanPriority, Role, SESSION_ID_PREFIX, SessionId, StopReason, ToolCallStatus,
};
pub use update::{PermissionRequest, SessionNotification, SessionUpdate};
