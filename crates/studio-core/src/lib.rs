pub mod completion;
pub mod config;
pub mod conversation;
pub mod error;
pub mod registry;
pub mod retry;
pub mod studio;
pub mod types;

pub use completion::{CompletionBackend, GeminiClient, FALLBACK_TEXT};
pub use config::StudioConfig;
pub use conversation::ConversationStore;
pub use error::StudioError;
pub use registry::{AgentPatch, AgentProfile, AgentRegistry};
pub use retry::RetryPolicy;
pub use studio::{Studio, StudioStatus, COMPLETION_FAILED_NOTICE};
pub use types::{ChatTurn, TurnRole};
