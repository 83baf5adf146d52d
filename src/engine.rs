//! Engine facade: the operations a transport exposes to clients.
//!
//! Holds the session registry, tool registry, permission gate, store,
//! and model backend, all constructor-injected. The transport owns the
//! wire format; this type owns the semantics.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::llm::ModelBackend;
use crate::permission::PermissionGate;
use crate::protocol::{
    AuthMethod, CapabilityServer, Channel, ContentBlock, EngineCapabilities, InitializeResponse,
    PermissionOutcome, Role, SessionId, SessionNotification, SessionUpdate, StopReason,
    PROTOCOL_VERSION,
};
use crate::session::{SessionCell, SessionRegistry, TurnRunner};
use crate::store::SessionStore;
use crate::tools::ToolRegistry;

pub struct Engine {
    config: EngineConfig,
    registry: SessionRegistry,
    gate: PermissionGate,
    tools: ToolRegistry,
    store: Arc<dyn SessionStore>,
    model: Arc<dyn ModelBackend>,
    channel: Arc<dyn Channel>,
}

impl Engine {
    pub fn new(
        config: EngineConfig,
        channel: Arc<dyn Channel>,
        model: Arc<dyn ModelBackend>,
        store: Arc<dyn SessionStore>,
        tools: ToolRegistry,
    ) -> Self {
        Self {
            config,
            registry: SessionRegistry::new(),
            gate: PermissionGate::new(),
            tools,
            store,
            model,
            channel,
        }
    }

    /// Negotiate the protocol version and advertise capabilities.
    pub fn initialize(&self, requested_version: u16) -> InitializeResponse {
        let protocol_version = requested_version.min(PROTOCOL_VERSION);
        debug!(requested_version, protocol_version, "Initialize");
        InitializeResponse {
            protocol_version,
            capabilities: EngineCapabilities::default(),
            auth_methods: self
                .config
                .auth_methods
                .iter()
                .map(|m| AuthMethod {
                    id: m.id.clone(),
                    name: m.name.clone(),
                    description: m.description.clone(),
                })
                .collect(),
        }
    }

    /// Validate an authentication method id against the configuration.
    ///
    /// With no methods configured, authentication is not required and
    /// any call succeeds.
    pub fn authenticate(&self, method_id: &str) -> EngineResult<()> {
        if self.config.auth_methods.is_empty() {
            return Ok(());
        }
        if self.config.auth_methods.iter().any(|m| m.id == method_id) {
            Ok(())
        } else {
            Err(EngineError::UnknownAuthMethod(method_id.to_string()))
        }
    }

    /// Create a fresh session. Always succeeds.
    pub fn new_session(
        &self,
        working_dir: PathBuf,
        capability_servers: Vec<CapabilityServer>,
    ) -> SessionId {
        let (id, _) = self.registry.create(working_dir, capability_servers);
        id
    }

    /// Restore a session and replay its recorded events.
    ///
    /// Prefers the in-memory copy; falls back to the store. Fails with
    /// [`EngineError::SessionNotFound`] when the id exists in neither.
    /// Loads of the same id are serialized: a concurrent load cannot
    /// interleave with the registry-miss, store-read, and insert and
    /// clobber a live session with a stale snapshot.
    pub async fn load_session(
        &self,
        session_id: &str,
        working_dir: PathBuf,
        capability_servers: Vec<CapabilityServer>,
    ) -> EngineResult<()> {
        let load_lock = self.registry.load_lock(session_id);
        let _load_guard = load_lock.lock().await;

        let cell = match self.registry.get(session_id) {
            Some(cell) => {
                let mut state = cell.lock().await;
                state.working_dir = working_dir;
                state.capability_servers = capability_servers;
                state.active = true;
                drop(state);
                cell.clear_cancel();
                cell
            }
            None => {
                let snapshot = self
                    .store
                    .get(session_id)
                    .await?
                    .ok_or_else(|| EngineError::SessionNotFound(session_id.to_string()))?;
                self.registry
                    .insert_restored(snapshot.into_state(working_dir, capability_servers))
            }
        };

        self.replay(&cell).await;
        info!(session_id = %session_id, "Session loaded");
        Ok(())
    }

    /// Re-emit the recorded message and tool-call events in original
    /// order, so a reconnecting client can rebuild its view.
    async fn replay(&self, cell: &SessionCell) {
        let state = cell.lock().await;
        let session_id = state.id.clone();

        for message in state.history() {
            for block in &message.content {
                let update = match message.role {
                    Role::User => SessionUpdate::UserMessageChunk {
                        content: block.clone(),
                    },
                    Role::Assistant => SessionUpdate::AgentMessageChunk {
                        content: block.clone(),
                    },
                };
                self.emit(&session_id, update).await;
            }
        }

        for record in state.tool_calls() {
            self.emit(
                &session_id,
                SessionUpdate::ToolCall {
                    id: record.id.clone(),
                    tool_name: record.tool_name.clone(),
                    title: record.title.clone(),
                    status: record.status,
                    content: record.content.clone(),
                },
            )
            .await;
        }
    }

    /// Run one prompt turn.
    pub async fn prompt(
        &self,
        session_id: &str,
        content: Vec<ContentBlock>,
    ) -> EngineResult<StopReason> {
        if content.is_empty() {
            return Err(EngineError::MalformedRequest(
                "prompt content must not be empty".to_string(),
            ));
        }
        let cell = self
            .registry
            .get(session_id)
            .ok_or_else(|| EngineError::SessionNotFound(session_id.to_string()))?;

        let runner = TurnRunner {
            channel: self.channel.as_ref(),
            model: self.model.as_ref(),
            tools: &self.tools,
            gate: &self.gate,
            store: self.store.as_ref(),
            history_window: self.config.history_window,
            tool_timeout: self.config.tool_timeout(),
            permission_timeout: self.config.permission_timeout(),
        };
        runner.run(&cell, content).await
    }

    /// Fire-and-forget cancel notification.
    ///
    /// Raises the session's cancel flag and resolves any permission
    /// request the turn is suspended on. Unknown ids are ignored.
    pub fn cancel(&self, session_id: &str) {
        match self.registry.get(session_id) {
            Some(cell) => {
                info!(session_id = %session_id, "Cancel requested");
                cell.request_cancel();
                self.gate.cancel_session(&session_id.to_string());
            }
            None => {
                debug!(session_id = %session_id, "Cancel for unknown session ignored");
            }
        }
    }

    /// Deliver a client's permission decision.
    ///
    /// Returns false if no matching request is outstanding.
    pub fn resolve_permission(
        &self,
        session_id: &str,
        tool_call_id: &str,
        outcome: PermissionOutcome,
    ) -> bool {
        self.gate
            .resolve(&session_id.to_string(), tool_call_id, outcome)
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
