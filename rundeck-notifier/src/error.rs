//! Error types for the notifier

use rundeck_client::ClientError;
use thiserror::Error;

/// Result type alias for notifier operations
pub type Result<T> = std::result::Result<T, NotifierError>;

/// Errors raised by the notifier and its tracker
#[derive(Debug, Error)]
pub enum NotifierError {
    /// No Rundeck instance registered under this name
    #[error("Unknown Rundeck instance: {0}")]
    UnknownInstance(String),

    /// Configuration rejected by validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Polling asked for before any job was triggered
    #[error("No Rundeck execution has been triggered")]
    NotTriggered,

    /// Talking to Rundeck failed; kept exactly as the client reported it
    #[error(transparent)]
    Client(#[from] ClientError),
}

impl NotifierError {
    /// The client error behind this one, if any
    pub fn client_error(&self) -> Option<&ClientError> {
        match self {
            Self::Client(err) => Some(err),
            _ => None,
        }
    }
}
