//! Outbound half of the client channel.
//!
//! The transport itself is supplied by the embedding application: anything
//! that delivers ordered messages both ways will do. The engine only needs
//! a sink for its pushed updates and permission requests; inbound
//! operations arrive as direct calls on [`Engine`](crate::engine::Engine).

use async_trait::async_trait;

use super::update::{PermissionRequest, SessionNotification};

/// Sink for engine-pushed messages.
///
/// Implementations must preserve the order in which `send_update` is
/// called for a given session; the engine relies on the transport being
/// ordered and reliable.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Push a session update to the client.
    async fn send_update(&self, notification: SessionNotification);

    /// Push a permission request to the client.
    ///
    /// This is fire-and-forget from the channel's point of view: the
    /// decision comes back via `Engine::resolve_permission`.
    async fn send_permission_request(&self, request: PermissionRequest);
}
