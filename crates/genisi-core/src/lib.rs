pub mod ai;
pub mod config;
pub mod error;
pub mod session;
pub mod state;
pub mod strings;
pub mod transcript;
pub mod view;

// Re-export main types for convenience
pub use ai::{ClaudeClient, CompletionRequest, CompletionService};
pub use config::Config;
pub use error::DeliveryError;
pub use session::{dispatch, ChatSession, PendingRequest};
pub use state::{ChatMessage, ChatRole};
pub use transcript::Transcript;
pub use view::{apply_suggestion, chat_view, ChatView};
