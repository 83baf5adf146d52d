//! Tool call executor: drives one invocation through its state machine.
//!
//! ```text
//! pending ──(permission rejected/cancelled)──▶ failed
//! pending ──▶ in_progress ──▶ completed
//!                        └──▶ failed
//! ```
//!
//! Every transition updates the session's record and emits an ordered
//! update event. Executor errors are caught here and become a `failed`
//! terminal state for this call only; the rest of the turn's queue is
//! unaffected.

use std::time::Duration;

use tracing::{debug, warn};

use crate::llm::ToolInvocation;
use crate::permission::PermissionGate;
use crate::protocol::{
    Channel, PermissionOption, PermissionOptionKind, PermissionOutcome, SessionNotification,
    SessionUpdate, ToolCallStatus,
};
use crate::session::{SessionCell, SessionState, ToolCallRecord};

use super::error::ToolError;
use super::registry::ToolRegistry;
use super::tool::ToolContext;

/// Shared collaborators for driving tool calls within a turn.
pub struct ToolCallExecutor<'a> {
    pub tools: &'a ToolRegistry,
    pub gate: &'a PermissionGate,
    pub channel: &'a dyn Channel,
    /// The session's cell, consulted for the cancel flag while waiting
    /// on the permission gate.
    pub cell: &'a SessionCell,
    /// Timeout applied around each executor invocation, if configured.
    pub tool_timeout: Option<Duration>,
    /// Timeout applied around each permission wait, if configured.
    pub permission_timeout: Option<Duration>,
}

impl ToolCallExecutor<'_> {
    /// Drive a single requested invocation to a terminal state.
    ///
    /// Always leaves a terminal record in the session; never returns an
    /// error to the turn.
    pub async fn drive(&self, session: &mut SessionState, invocation: &ToolInvocation) {
        let call_id = session.next_tool_call_id();
        let session_id = session.id.clone();

        let tool = self.tools.get(&invocation.name).cloned();
        let title = match &tool {
            Some(t) => t.title(&invocation.arguments),
            None => invocation.name.clone(),
        };

        session.insert_tool_call(ToolCallRecord::pending(
            call_id.clone(),
            invocation.name.clone(),
            title.clone(),
        ));
        self.emit(
            &session_id,
            SessionUpdate::ToolCall {
                id: call_id.clone(),
                tool_name: invocation.name.clone(),
                title: title.clone(),
                status: ToolCallStatus::Pending,
                content: None,
            },
        )
        .await;

        let Some(tool) = tool else {
            let error = ToolError::NotFound(invocation.name.clone());
            self.fail(session, &call_id, error.to_string()).await;
            return;
        };

        if tool.requires_permission() {
            let options = PermissionOption::defaults();
            let outcome = self
                .gate
                .request(
                    self.channel,
                    &session_id,
                    &call_id,
                    &title,
                    options.clone(),
                    self.permission_timeout,
                    || self.cell.is_cancel_requested(),
                )
                .await;

            if !is_authorized(&outcome, &options) {
                debug!(
                    session_id = %session_id,
                    tool_call_id = %call_id,
                    tool = %invocation.name,
                    "Permission not granted, skipping executor"
                );
                self.fail(session, &call_id, "permission denied".to_string())
                    .await;
                return;
            }
        }

        self.advance(session, &call_id, ToolCallStatus::InProgress, None)
            .await;

        let ctx = ToolContext {
            session_id: session_id.clone(),
            working_dir: session.working_dir.clone(),
        };
        let result = match self.tool_timeout {
            Some(limit) => {
                match tokio::time::timeout(limit, tool.execute(invocation.arguments.clone(), &ctx))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(ToolError::Timeout(limit.as_secs())),
                }
            }
            None => tool.execute(invocation.arguments.clone(), &ctx).await,
        };

        match result {
            Ok(output) => {
                session.attach_tool_call_content(&call_id, output.content.clone());
                self.advance(
                    session,
                    &call_id,
                    ToolCallStatus::Completed,
                    Some(output.content),
                )
                .await;
            }
            Err(e) => {
                warn!(
                    session_id = %session_id,
                    tool_call_id = %call_id,
                    tool = %invocation.name,
                    error = %e,
                    "Tool execution failed"
                );
                self.fail(session, &call_id, e.to_string()).await;
            }
        }
    }

    /// Record a failed terminal state and emit its update.
    async fn fail(&self, session: &mut SessionState, call_id: &str, error: String) {
        session.attach_tool_call_error(call_id, error.clone());
        self.advance(session, call_id, ToolCallStatus::Failed, Some(error))
            .await;
    }

    /// Advance the record's status and emit the corresponding update.
    ///
    /// Emits only when the record actually transitioned, so the event
    /// stream never diverges from recorded state.
    async fn advance(
        &self,
        session: &mut SessionState,
        call_id: &str,
        status: ToolCallStatus,
        content: Option<String>,
    ) {
        let session_id = session.id.clone();
        if !session.advance_tool_call(call_id, status) {
            return;
        }
        self.emit(
            &session_id,
            SessionUpdate::ToolCallUpdate {
                id: call_id.to_string(),
                status,
                content,
            },
        )
        .await;
    }

    async fn emit(&self, session_id: &str, update: SessionUpdate) {
        self.channel
            .send_update(SessionNotification {
                session_id: session_id.to_string(),
                update,
            })
            .await;
    }
}

/// Whether the decision authorizes the tool call.
///
/// The selected option id is matched against the offered options; only
/// an `AllowOnce` selection authorizes. Unknown ids and cancellations
/// are rejections.
fn is_authorized(outcome: &PermissionOutcome, options: &[PermissionOption]) -> bool {
    match outcome {
        PermissionOutcome::Selected { option_id } => options
            .iter()
            .find(|o| &o.id == option_id)
            .is_some_and(|o| o.kind == PermissionOptionKind::AllowOnce),
        PermissionOutcome::Cancelled => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::Mutex;

    use crate::protocol::PermissionRequest;
    use crate::session::SessionRegistry;

    #[derive(Default)]
    struct RecordingChannel {
        updates: Mutex<Vec<SessionNotification>>,
    }

    #[async_trait]
    impl Channel for RecordingChannel {
        async fn send_update(&self, notification: SessionNotification) {
            self.updates.lock().unwrap().push(notification);
        }

        async fn send_permission_request(&self, _request: PermissionRequest) {}
    }

    #[tokio::test]
    async fn advance_without_record_emits_nothing() {
        let tools = ToolRegistry::new();
        let gate = PermissionGate::new();
        let channel = RecordingChannel::default();
        let sessions = SessionRegistry::new();
        let (_, cell) = sessions.create(PathBuf::from("/tmp"), Vec::new());
        let executor = ToolCallExecutor {
            tools: &tools,
            gate: &gate,
            channel: &channel,
            cell: &cell,
            tool_timeout: None,
            permission_timeout: None,
        };

        let mut state =
            SessionState::new("sess_x".to_string(), PathBuf::from("/tmp"), Vec::new());
        executor
            .advance(&mut state, "call_9", ToolCallStatus::InProgress, None)
            .await;

        assert!(channel.updates.lock().unwrap().is_empty());
        assert!(state.tool_calls().is_empty());
    }

    #[test]
    fn authorization_requires_known_allow_option() {
        let options = PermissionOption::defaults();

        let allow = PermissionOutcome::Selected {
            option_id: "allow_once".to_string(),
        };
        let reject = PermissionOutcome::Selected {
            option_id: "reject_once".to_string(),
        };
        let unknown = PermissionOutcome::Selected {
            option_id: "allow_forever".to_string(),
        };

        assert!(is_authorized(&allow, &options));
        assert!(!is_authorized(&reject, &options));
        assert!(!is_authorized(&unknown, &options));
        assert!(!is_authorized(&PermissionOutcome::Cancelled, &options));
    }
}
