//! Error types for the Rundeck client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when talking to Rundeck
///
/// Three kinds matter to callers: transport failures (no usable answer),
/// API errors (the server answered and refused) and malformed responses
/// (valid XML missing a required field).
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Server answered with an error status and no API error document
    #[error("HTTP error (status {status}): {message}")]
    HttpStatus {
        /// HTTP status code
        status: u16,
        /// Response body or reason
        message: String,
    },

    /// Base URL cannot carry API paths
    #[error("Invalid Rundeck URL: {0}")]
    InvalidUrl(String),

    /// Response body is not XML
    #[error("Invalid XML response: {0}")]
    InvalidXml(String),

    /// Rundeck reported an error; the message is kept exactly as sent
    #[error("{message}")]
    Api {
        /// Error message from the API
        message: String,
    },

    /// Response is valid XML but lacks a required field
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl ClientError {
    /// Create an API error from the server message
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a malformed response error
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedResponse(reason.into())
    }

    /// No valid answer was obtained from the server
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::RequestFailed(_)
                | Self::HttpStatus { .. }
                | Self::InvalidUrl(_)
                | Self::InvalidXml(_)
        )
    }

    /// The server answered but refused the operation
    pub fn is_api(&self) -> bool {
        matches!(self, Self::Api { .. })
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedResponse(_))
    }

    /// Whether the server rejected the credentials
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::HttpStatus { status: 401 | 403, .. })
    }
}

impl From<quick_xml::Error> for ClientError {
    fn from(err: quick_xml::Error) -> Self {
        Self::InvalidXml(err.to_string())
    }
}
