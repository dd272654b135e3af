use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::models::chat::{ChatMessage, Role};

/// Per-user conversation: message history plus its activity record.
///
/// The seed prompt is shared by every conversation and is materialized as the
/// leading system message whenever the history is read.
#[derive(Debug, Clone)]
pub struct ConversationState {
    system_prompt: Arc<str>,

    /// User/assistant turns after the system message
    turns: Vec<ChatMessage>,

    /// Last interaction, drives expiry
    pub last_activity: Instant,

    /// Set once the sweeper (or an explicit evict) removed this conversation.
    /// Holders of a stale slot must go back through `get_or_create`.
    pub evicted: bool,
}

impl ConversationState {
    pub fn new(system_prompt: Arc<str>, now: Instant) -> Self {
        Self {
            system_prompt,
            turns: Vec::new(),
            last_activity: now,
            evicted: false,
        }
    }

    pub fn touch(&mut self, now: Instant) {
        self.last_activity = now;
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.turns.push(message);
    }

    /// Full history, system message first
    pub fn history(&self) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(self.turns.len() + 1);
        messages.push(ChatMessage::new(Role::System, &*self.system_prompt));
        messages.extend(self.turns.iter().cloned());
        messages
    }

    /// Message count including the system message
    pub fn message_count(&self) -> usize {
        self.turns.len() + 1
    }

    #[cfg(test)]
    fn last_role(&self) -> Role {
        self.turns.last().map(|m| m.role).unwrap_or(Role::System)
    }

    /// Strictly greater than `max_idle`: a record exactly at the boundary is kept
    pub fn is_idle(&self, now: Instant, max_idle: Duration) -> bool {
        now.saturating_duration_since(self.last_activity) > max_idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_starts_with_system_prompt() {
        let mut state = ConversationState::new(Arc::from("seed"), Instant::now());
        assert_eq!(state.history(), vec![ChatMessage::system("seed")]);
        assert_eq!(state.last_role(), Role::System);

        state.push(ChatMessage::user("hola"));
        state.push(ChatMessage::assistant("buenas"));
        assert_eq!(state.message_count(), 3);
        assert_eq!(state.history()[1], ChatMessage::user("hola"));
        assert_eq!(state.last_role(), Role::Assistant);
    }

    #[test]
    fn test_idle_boundary_is_strict() {
        let start = Instant::now();
        let state = ConversationState::new(Arc::from("seed"), start);
        let window = Duration::from_secs(60);

        assert!(!state.is_idle(start + window, window));
        assert!(state.is_idle(start + window + Duration::from_millis(1), window));
        // Clock readings older than the record never count as idle
        assert!(!state.is_idle(start, window));
    }
}
