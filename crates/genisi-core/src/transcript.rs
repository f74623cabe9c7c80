//! Append-only transcript store

use crate::state::ChatMessage;

/// Ordered chat history. Entries are only ever appended; the whole
/// store can be cleared, which bumps its generation.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
    generation: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Drop every message and start a new generation.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.generation = self.generation.wrapping_add(1);
    }

    /// Identifies the conversation the current messages belong to.
    /// Replies tagged with an older generation are stale.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
