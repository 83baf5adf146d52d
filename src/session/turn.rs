//! Prompt turn orchestration.
//!
//! One turn: record the inbound message, derive a plan, invoke the
//! model backend, drive requested tool calls sequentially, stream the
//! assistant output, persist, and classify the stop reason.
//!
//! The caller holds the session lock for the whole turn; the cancel
//! flag on [`SessionCell`] is the only state touched concurrently, and
//! it is checked before each tool call and at turn end.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::EngineResult;
use crate::llm::{recent_window, ModelBackend};
use crate::permission::PermissionGate;
use crate::protocol::{
    Channel, ContentBlock, Message, Role, SessionNotification, SessionUpdate, StopReason,
};
use crate::store::SessionStore;
use crate::tools::{ToolCallExecutor, ToolRegistry};

use super::planner::derive_plan;
use super::registry::SessionCell;
use super::snapshot::SessionSnapshot;

/// Collaborators and limits for running prompt turns.
pub struct TurnRunner<'a> {
    pub channel: &'a dyn Channel,
    pub model: &'a dyn ModelBackend,
    pub tools: &'a ToolRegistry,
    pub gate: &'a PermissionGate,
    pub store: &'a dyn SessionStore,
    /// Bounded recent history window passed to the model.
    pub history_window: usize,
    pub tool_timeout: Option<Duration>,
    pub permission_timeout: Option<Duration>,
}

impl TurnRunner<'_> {
    /// Run one full prompt turn against a session.
    ///
    /// Holds the session lock for the duration of the turn, so per
    /// session at most one turn is in flight.
    pub async fn run(
        &self,
        cell: &SessionCell,
        content: Vec<ContentBlock>,
    ) -> EngineResult<StopReason> {
        let mut state = cell.lock().await;
        cell.clear_cancel();

        let session_id = state.id.clone();
        debug!(session_id = %session_id, blocks = content.len(), "Prompt turn started");

        // Inbound user message, one event per block in input order.
        for block in &content {
            self.emit(
                &session_id,
                SessionUpdate::UserMessageChunk {
                    content: block.clone(),
                },
            )
            .await;
        }
        state.push_message(Message::new(Role::User, content.clone()));

        let plan = derive_plan(&content);
        if !plan.is_empty() {
            state.plan = plan.clone();
            self.emit(&session_id, SessionUpdate::Plan { entries: plan })
                .await;
        }

        let window = recent_window(state.history(), self.history_window);
        let output = self.model.complete(window, &self.tools.definitions()).await?;

        let executor = ToolCallExecutor {
            tools: self.tools,
            gate: self.gate,
            channel: self.channel,
            cell,
            tool_timeout: self.tool_timeout,
            permission_timeout: self.permission_timeout,
        };
        for invocation in &output.tool_invocations {
            if cell.is_cancel_requested() {
                info!(
                    session_id = %session_id,
                    "Cancel observed, skipping remaining tool invocations"
                );
                break;
            }
            executor.drive(&mut state, invocation).await;
        }

        for block in &output.content {
            self.emit(
                &session_id,
                SessionUpdate::AgentMessageChunk {
                    content: block.clone(),
                },
            )
            .await;
        }
        if !output.content.is_empty() {
            state.push_message(Message::new(Role::Assistant, output.content));
        }

        // Best-effort persistence: the turn's result stands even if the
        // snapshot write fails.
        let snapshot = SessionSnapshot::of(&state);
        if let Err(e) = self.store.put(&session_id, &snapshot).await {
            warn!(session_id = %session_id, error = %e, "Failed to persist session snapshot");
        }

        let stop_reason = if cell.is_cancel_requested() {
            StopReason::Cancelled
        } else {
            StopReason::EndTurn
        };
        info!(session_id = %session_id, stop_reason = ?stop_reason, "Prompt turn finished");
        Ok(stop_reason)
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
