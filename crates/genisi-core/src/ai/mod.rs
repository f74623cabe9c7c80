pub mod claude;

pub use claude::ClaudeClient;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::DeliveryError;
use crate::state::ChatMessage;

/// Model identifier sent with every request
pub const MODEL: &str = "claude-sonnet-4-20250514";

/// Upper bound on reply length, in tokens
pub const MAX_TOKENS: u32 = 1000;

/// Body of one completion call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<ChatMessage>,
}

impl CompletionRequest {
    /// Build a request carrying the whole conversation, oldest first.
    pub fn from_history(history: &[ChatMessage]) -> Self {
        Self {
            model: MODEL.to_string(),
            max_tokens: MAX_TOKENS,
            messages: history
                .iter()
                .map(|m| ChatMessage {
                    role: m.role,
                    content: m.content.clone(),
                })
                .collect(),
        }
    }
}

/// Something that turns a conversation into a reply.
///
/// Implementations return the reply text with its segments already
/// joined; an empty string means the service answered without text.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, DeliveryError>;
}
