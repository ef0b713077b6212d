use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StudioError;

/// A named agent configuration that parameterizes completion calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentProfile {
    /// Opaque unique identifier, immutable after creation.
    pub id: String,
    pub name: String,
    /// Short free-text description shown next to the name.
    pub role: String,
    /// Sent verbatim as the model's system instruction.
    pub system_prompt: String,
    pub presentation: Presentation,
}

/// Cosmetic icon/color tags resolved by the UI layer. Opaque to the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Presentation {
    pub icon: String,
    pub color: String,
}

impl AgentProfile {
    fn new(
        name: impl Into<String>,
        role: impl Into<String>,
        system_prompt: impl Into<String>,
        icon: &str,
        color: &str,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            role: role.into(),
            system_prompt: system_prompt.into(),
            presentation: Presentation {
                icon: icon.into(),
                color: color.into(),
            },
        }
    }
}

/// Partial update for an agent. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgentPatch {
    pub name: Option<String>,
    pub role: Option<String>,
    pub system_prompt: Option<String>,
    pub presentation: Option<Presentation>,
}

/// Ordered collection of agent profiles plus the currently active one.
///
/// Invariants: the registry never becomes empty, and the active id always
/// references an existing agent.
#[derive(Debug, Clone)]
pub struct AgentRegistry {
    agents: Vec<AgentProfile>,
    active_id: String,
}

impl Default for AgentRegistry {
    /// Seed registry: a general-purpose assistant and a coding specialist,
    /// with the first one active.
    fn default() -> Self {
        let general = AgentProfile::new(
            "General Assistant",
            "Helpful and concise AI companion",
            "You are a helpful, versatile AI assistant. Provide clear, accurate, and concise answers.",
            "bot",
            "blue",
        );
        let coder = AgentProfile::new(
            "Code Master",
            "Expert software engineer and debugger",
            "You are an expert software engineer. When asked for code, provide clean, efficient, \
             and well-commented solutions. Explain your logic briefly.",
            "terminal",
            "emerald",
        );
        let active_id = general.id.clone();
        Self {
            agents: vec![general, coder],
            active_id,
        }
    }
}

impl AgentRegistry {
    /// Append a default-configured agent and make it active.
    pub fn create_agent(&mut self) -> &AgentProfile {
        let agent = AgentProfile::new(
            "New Agent",
            "Define a role...",
            "You are a helpful assistant.",
            "sparkles",
            "purple",
        );
        self.active_id = agent.id.clone();
        self.agents.push(agent);
        self.agents.last().expect("just pushed")
    }

    /// Replace the named fields of the agent matching `id`.
    pub fn update_agent(&mut self, id: &str, patch: AgentPatch) -> Result<(), StudioError> {
        let agent = self
            .agents
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| StudioError::AgentNotFound(id.to_string()))?;

        if let Some(name) = patch.name {
            agent.name = name;
        }
        if let Some(role) = patch.role {
            agent.role = role;
        }
        if let Some(system_prompt) = patch.system_prompt {
            agent.system_prompt = system_prompt;
        }
        if let Some(presentation) = patch.presentation {
            agent.presentation = presentation;
        }
        Ok(())
    }

    /// Remove the agent matching `id`.
    ///
    /// Deleting the last remaining agent is rejected. If the removed agent
    /// was active, the first remaining agent becomes active.
    pub fn delete_agent(&mut self, id: &str) -> Result<AgentProfile, StudioError> {
        let index = self
            .agents
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| StudioError::AgentNotFound(id.to_string()))?;

        if self.agents.len() == 1 {
            return Err(StudioError::LastAgent);
        }

        let removed = self.agents.remove(index);
        if self.active_id == removed.id {
            self.active_id = self.agents[0].id.clone();
        }
        Ok(removed)
    }

    /// Make the agent matching `id` the active one.
    pub fn set_active(&mut self, id: &str) -> Result<(), StudioError> {
        if !self.agents.iter().any(|a| a.id == id) {
            return Err(StudioError::AgentNotFound(id.to_string()));
        }
        self.active_id = id.to_string();
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&AgentProfile> {
        self.agents.iter().find(|a| a.id == id)
    }

    /// The currently active agent.
    pub fn active(&self) -> &AgentProfile {
        self.agents
            .iter()
            .find(|a| a.id == self.active_id)
            .expect("active id always references an existing agent")
    }

    pub fn active_id(&self) -> &str {
        &self.active_id
    }

    /// All agents in collection order.
    pub fn agents(&self) -> &[AgentProfile] {
        &self.agents
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
