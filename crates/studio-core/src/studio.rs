use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::warn;

use crate::completion::CompletionBackend;
use crate::conversation::ConversationStore;
use crate::error::StudioError;
use crate::registry::{AgentPatch, AgentProfile, AgentRegistry};
use crate::types::ChatTurn;

/// Notice surfaced to the user when a submission fails.
pub const COMPLETION_FAILED_NOTICE: &str =
    "Failed to get response after multiple attempts. Please check your connection.";

/// Registry, store, and transient submission state gathered into one
/// explicit object. Nothing here is global.
#[derive(Debug, Default)]
pub struct Workspace {
    pub registry: AgentRegistry,
    pub store: ConversationStore,
    pub last_error: Option<String>,
}

/// Snapshot of transient state for the UI.
#[derive(Debug, Clone, Serialize)]
pub struct StudioStatus {
    pub busy: bool,
    pub last_error: Option<String>,
    pub active_id: String,
}

/// The studio service: owns the workspace behind an async lock and funnels
/// submissions through a single-flight gate.
pub struct Studio {
    workspace: RwLock<Workspace>,
    backend: Arc<dyn CompletionBackend>,
    submit_gate: Mutex<()>,
}

impl Studio {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self {
            workspace: RwLock::new(Workspace::default()),
            backend,
            submit_gate: Mutex::new(()),
        }
    }

    pub async fn agents(&self) -> Vec<AgentProfile> {
        self.workspace.read().await.registry.agents().to_vec()
    }

    pub async fn active_agent(&self) -> AgentProfile {
        self.workspace.read().await.registry.active().clone()
    }

    pub async fn create_agent(&self) -> AgentProfile {
        self.workspace.write().await.registry.create_agent().clone()
    }

    pub async fn update_agent(
        &self,
        id: &str,
        patch: AgentPatch,
    ) -> Result<AgentProfile, StudioError> {
        let mut workspace = self.workspace.write().await;
        workspace.registry.update_agent(id, patch)?;
        Ok(workspace.registry.get(id).expect("just updated").clone())
    }

    /// Delete an agent and discard its conversation.
    pub async fn delete_agent(&self, id: &str) -> Result<(), StudioError> {
        let mut workspace = self.workspace.write().await;
        let removed = workspace.registry.delete_agent(id)?;
        workspace.store.remove(&removed.id);
        Ok(())
    }

    pub async fn set_active(&self, id: &str) -> Result<(), StudioError> {
        self.workspace.write().await.registry.set_active(id)
    }

    /// Conversation history for an existing agent (empty if it has none yet).
    pub async fn turns(&self, id: &str) -> Result<Vec<ChatTurn>, StudioError> {
        let workspace = self.workspace.read().await;
        if workspace.registry.get(id).is_none() {
            return Err(StudioError::AgentNotFound(id.to_string()));
        }
        Ok(workspace.store.turns(id).to_vec())
    }

    pub async fn status(&self) -> StudioStatus {
        let workspace = self.workspace.read().await;
        StudioStatus {
            busy: self.submit_gate.try_lock().is_err(),
            last_error: workspace.last_error.clone(),
            active_id: workspace.registry.active_id().to_string(),
        }
    }

    /// Submit user input to the active agent and return the assistant turn.
    ///
    /// The user turn is appended before the remote call and kept on failure;
    /// the caller may resubmit manually. At most one submission (including
    /// its retries) is in flight at a time.
    pub async fn submit(&self, text: &str) -> Result<ChatTurn, StudioError> {
        let _in_flight = self.submit_gate.try_lock().map_err(|_| StudioError::Busy)?;

        if text.trim().is_empty() {
            return Err(StudioError::EmptyMessage);
        }

        // Append the user turn and snapshot the active agent, releasing the
        // state lock before the (potentially long) remote call.
        let (agent_id, system_prompt) = {
            let mut workspace = self.workspace.write().await;
            workspace.last_error = None;
            let active = workspace.registry.active().clone();
            workspace.store.append_user_turn(&active.id, text);
            (active.id, active.system_prompt)
        };

        match self.backend.complete(text, &system_prompt).await {
            Ok(reply) => {
                let mut workspace = self.workspace.write().await;
                workspace.store.append_assistant_turn(&agent_id, reply);
                Ok(workspace
                    .store
                    .turns(&agent_id)
                    .last()
                    .expect("just appended")
                    .clone())
            }
            Err(err) => {
                warn!("Completion for agent {} failed: {}", agent_id, err);
                let mut workspace = self.workspace.write().await;
                workspace.last_error = Some(COMPLETION_FAILED_NOTICE.to_string());
                Err(err)
            }
        }
    }
}
