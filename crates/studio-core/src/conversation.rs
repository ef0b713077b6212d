use std::collections::HashMap;

use crate::types::ChatTurn;

/// Per-agent conversation history, keyed by agent id.
///
/// Sequences are append-only and come into existence lazily on the first
/// turn. The store knows agents only by identifier; deleting an agent in the
/// registry requires a matching [`remove`](ConversationStore::remove) here.
#[derive(Debug, Default)]
pub struct ConversationStore {
    turns: HashMap<String, Vec<ChatTurn>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user turn. Empty or whitespace-only text is ignored,
    /// mirroring the UI submit guard.
    pub fn append_user_turn(&mut self, agent_id: &str, text: impl Into<String>) {
        let text = text.into();
        if text.trim().is_empty() {
            return;
        }
        self.turns
            .entry(agent_id.to_string())
            .or_default()
            .push(ChatTurn::user(text));
    }

    /// Append an assistant turn.
    pub fn append_assistant_turn(&mut self, agent_id: &str, text: impl Into<String>) {
        self.turns
            .entry(agent_id.to_string())
            .or_default()
            .push(ChatTurn::assistant(text));
    }

    /// The ordered sequence for `agent_id`, empty if none exists yet.
    pub fn turns(&self, agent_id: &str) -> &[ChatTurn] {
        self.turns.get(agent_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Discard the sequence for `agent_id` (agent deletion path).
    pub fn remove(&mut self, agent_id: &str) {
        self.turns.remove(agent_id);
    }
}
