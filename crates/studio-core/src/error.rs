use thiserror::Error;

#[derive(Error, Debug)]
pub enum StudioError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    #[error("Cannot delete the last remaining agent")]
    LastAgent,

    #[error("Message is empty")]
    EmptyMessage,

    #[error("A completion request is already in flight")]
    Busy,

    #[error("Remote call failed: {message}")]
    RemoteCallFailed {
        /// Last observed HTTP status, if the failure came from a response.
        status: Option<u16>,
        message: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StudioError>;
