//! Permission gate: correlates permission requests with client decisions.
//!
//! A turn that reaches a permission-gated tool call suspends here until
//! the client answers, the session is cancelled, or an operator-configured
//! timeout fires. Each outstanding request is backed by a oneshot channel,
//! so a decision resolves exactly once no matter which path wins.

use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::protocol::{
    Channel, PermissionOption, PermissionOutcome, PermissionRequest, SessionId,
};

/// Pending permission requests keyed by (session id, tool call id).
///
/// Exactly one outstanding request may exist per tool call id.
#[derive(Default)]
pub struct PermissionGate {
    pending: DashMap<(SessionId, String), oneshot::Sender<PermissionOutcome>>,
}

impl PermissionGate {
    /// Create an empty gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Send a permission request and wait for the decision.
    ///
    /// Blocks the invoking turn until the client resolves the request or
    /// it is cancelled. With `timeout` set, an expired wait resolves as
    /// [`PermissionOutcome::Cancelled`]; without one, the wait is
    /// unbounded.
    ///
    /// `cancelled` is consulted once after the request is registered:
    /// a cancel that lands before registration drains an empty pending
    /// map, so the flag is the only way to observe it. A cancel landing
    /// after registration resolves the pending entry directly.
    pub async fn request(
        &self,
        channel: &dyn Channel,
        session_id: &SessionId,
        tool_call_id: &str,
        title: &str,
        options: Vec<PermissionOption>,
        timeout: Option<Duration>,
        cancelled: impl Fn() -> bool,
    ) -> PermissionOutcome {
        let key = (session_id.clone(), tool_call_id.to_string());

        let (tx, rx) = oneshot::channel();
        if self.pending.insert(key.clone(), tx).is_some() {
            // The turn drives tool calls sequentially, so this can only
            // happen if a caller violates the one-outstanding contract.
            warn!(
                session_id = %session_id,
                tool_call_id = %tool_call_id,
                "Duplicate permission request for tool call, cancelling previous"
            );
        }

        if cancelled() {
            debug!(
                session_id = %session_id,
                tool_call_id = %tool_call_id,
                "Session cancelled before permission request registration"
            );
            self.pending.remove(&key);
            return PermissionOutcome::Cancelled;
        }

        channel
            .send_permission_request(PermissionRequest {
                session_id: session_id.clone(),
                tool_call_id: tool_call_id.to_string(),
                title: title.to_string(),
                options,
            })
            .await;

        let outcome = match timeout {
            Some(limit) => match tokio::time::timeout(limit, rx).await {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(_)) => PermissionOutcome::Cancelled,
                Err(_) => {
                    debug!(
                        session_id = %session_id,
                        tool_call_id = %tool_call_id,
                        "Permission request timed out"
                    );
                    PermissionOutcome::Cancelled
                }
            },
            None => rx.await.unwrap_or(PermissionOutcome::Cancelled),
        };

        // Drop our entry so a late decision for this call id is rejected.
        self.pending.remove(&key);
        outcome
    }

    /// Deliver a client decision for an outstanding request.
    ///
    /// Returns false if no request is pending for the id (already
    /// resolved, timed out, or never made).
    pub fn resolve(
        &self,
        session_id: &SessionId,
        tool_call_id: &str,
        outcome: PermissionOutcome,
    ) -> bool {
        let key = (session_id.clone(), tool_call_id.to_string());
        match self.pending.remove(&key) {
            Some((_, tx)) => tx.send(outcome).is_ok(),
            None => {
                debug!(
                    session_id = %session_id,
                    tool_call_id = %tool_call_id,
                    "Permission decision for unknown request ignored"
                );
                false
            }
        }
    }

    /// Resolve every outstanding request of a session as cancelled.
    ///
    /// Called when a cancel notification arrives so a turn suspended on
    /// the gate wakes up and observes the cancel flag.
    pub fn cancel_session(&self, session_id: &SessionId) {
        let keys: Vec<_> = self
            .pending
            .iter()
            .filter(|entry| &entry.key().0 == session_id)
            .map(|entry| entry.key().clone())
            .collect();

        for key in keys {
            if let Some((_, tx)) = self.pending.remove(&key) {
                let _ = tx.send(PermissionOutcome::Cancelled);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::Mutex;

    use crate::protocol::{PermissionRequest, SessionNotification};

    #[derive(Default)]
    struct RecordingChannel {
        requests: Mutex<Vec<PermissionRequest>>,
    }

    #[async_trait]
    impl Channel for RecordingChannel {
        async fn send_update(&self, _notification: SessionNotification) {}

        async fn send_permission_request(&self, request: PermissionRequest) {
            self.requests.lock().unwrap().push(request);
        }
    }

    #[tokio::test]
    async fn request_resolves_with_selected_option() {
        let gate = Arc::new(PermissionGate::new());
        let channel = Arc::new(RecordingChannel::default());
        let session_id = "sess_1".to_string();

        let wait = {
            let gate = gate.clone();
            let channel = channel.clone();
            let session_id = session_id.clone();
            tokio::spawn(async move {
                gate.request(
                    channel.as_ref(),
                    &session_id,
                    "call_1",
                    "Read file",
                    PermissionOption::defaults(),
                    None,
                    || false,
                )
                .await
            })
        };

        // Wait until the outbound request is visible, then resolve.
        loop {
            if !channel.requests.lock().unwrap().is_empty() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(gate.resolve(
            &session_id,
            "call_1",
            PermissionOutcome::Selected {
                option_id: "allow_once".to_string()
            }
        ));

        let outcome = wait.await.unwrap();
        assert_eq!(
            outcome,
            PermissionOutcome::Selected {
                option_id: "allow_once".to_string()
            }
        );
    }

    #[tokio::test]
    async fn cancel_session_wakes_pending_request() {
        let gate = Arc::new(PermissionGate::new());
        let channel = Arc::new(RecordingChannel::default());
        let session_id = "sess_1".to_string();

        let wait = {
            let gate = gate.clone();
            let channel = channel.clone();
            let session_id = session_id.clone();
            tokio::spawn(async move {
                gate.request(
                    channel.as_ref(),
                    &session_id,
                    "call_1",
                    "Write file",
                    PermissionOption::defaults(),
                    None,
                    || false,
                )
                .await
            })
        };

        loop {
            if !channel.requests.lock().unwrap().is_empty() {
                break;
            }
            tokio::task::yield_now().await;
        }
        gate.cancel_session(&session_id);

        assert_eq!(wait.await.unwrap(), PermissionOutcome::Cancelled);
    }

    #[tokio::test]
    async fn request_times_out_as_cancelled() {
        let gate = PermissionGate::new();
        let channel = RecordingChannel::default();
        let session_id = "sess_1".to_string();

        let outcome = gate
            .request(
                &channel,
                &session_id,
                "call_1",
                "Read file",
                PermissionOption::defaults(),
                Some(Duration::from_millis(10)),
                || false,
            )
            .await;

        assert_eq!(outcome, PermissionOutcome::Cancelled);
        // A late decision is rejected.
        assert!(!gate.resolve(
            &session_id,
            "call_1",
            PermissionOutcome::Selected {
                option_id: "allow_once".to_string()
            }
        ));
    }

    #[tokio::test]
    async fn cancel_landing_before_registration_still_resolves() {
        let gate = PermissionGate::new();
        let channel = RecordingChannel::default();
        let session_id = "sess_1".to_string();

        // The cancel drained an empty pending map before this request
        // existed; only the session's flag records it.
        gate.cancel_session(&session_id);

        let outcome = gate
            .request(
                &channel,
                &session_id,
                "call_1",
                "Write file",
                PermissionOption::defaults(),
                None,
                || true,
            )
            .await;

        assert_eq!(outcome, PermissionOutcome::Cancelled);
        // The client never saw a request it could not answer.
        assert!(channel.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn resolve_unknown_request_returns_false() {
        let gate = PermissionGate::new();
        assert!(!gate.resolve(
            &"sess_x".to_string(),
            "call_9",
            PermissionOutcome::Cancelled
        ));
    }
}
