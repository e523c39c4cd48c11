//! Error handling for the Stockbill client
//!
//! Every failure ends up as a message a person can read. Server errors keep
//! their HTTP status and the `detail` text the API sent, when there was one.

use shared::{LineItemError, StorageError, TransitionError};
use thiserror::Error;

/// Message shown for any 401 response
pub const AUTH_FAILURE_MESSAGE: &str = "Authentication failed. Please sign in again.";

/// Client error types
#[derive(Error, Debug)]
pub enum ClientError {
    // Server responses
    #[error("Authentication failed")]
    Unauthorized,

    #[error("API error {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Api { status: u16, detail: Option<String> },

    // Transport errors
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid request path: {0}")]
    InvalidRequest(String),

    // Client-local validation
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    LineItem(#[from] LineItemError),

    #[error(transparent)]
    InvalidState(#[from] TransitionError),

    #[error("Another request is still in flight")]
    Busy,

    // Local resources
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Configuration(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// HTTP status of a server rejection
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Unauthorized => Some(401),
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Short machine-readable code, handy for logs and JSON output
    pub fn code(&self) -> &'static str {
        match self {
            ClientError::Unauthorized => "UNAUTHORIZED",
            ClientError::Api { .. } => "API_ERROR",
            ClientError::Network(_) => "NETWORK_ERROR",
            ClientError::InvalidResponse(_) => "INVALID_RESPONSE",
            ClientError::InvalidRequest(_) => "INVALID_REQUEST",
            ClientError::Validation(_) | ClientError::LineItem(_) => "VALIDATION_ERROR",
            ClientError::InvalidState(_) => "INVALID_STATE",
            ClientError::Busy => "BUSY",
            ClientError::Storage(_) => "STORAGE_ERROR",
            ClientError::Io(_) => "IO_ERROR",
            ClientError::Configuration(_) => "CONFIGURATION_ERROR",
            ClientError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// True for errors caught before anything was sent to the server
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ClientError::Validation(_) | ClientError::LineItem(_) | ClientError::InvalidState(_)
        )
    }

    /// The text to show the user.
    ///
    /// Server `detail` wins when present; transport failures and bare
    /// statuses fall back to the caller's generic message.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Unauthorized => AUTH_FAILURE_MESSAGE.to_string(),
            ClientError::Api {
                detail: Some(detail),
                ..
            } if !detail.trim().is_empty() => detail.clone(),
            ClientError::Api { .. }
            | ClientError::Network(_)
            | ClientError::InvalidResponse(_)
            | ClientError::InvalidRequest(_)
            | ClientError::Serialization(_) => fallback.to_string(),
            ClientError::Validation(msg) => msg.clone(),
            ClientError::LineItem(e) => e.to_string(),
            ClientError::InvalidState(e) => e.to_string(),
            ClientError::Busy => "Please wait for the current request to finish".to_string(),
            ClientError::Storage(e) => e.to_string(),
            ClientError::Io(e) => e.to_string(),
            ClientError::Configuration(e) => format!("Configuration error: {}", e),
        }
    }
}

impl From<validator::ValidationErrors> for ClientError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ClientError::Validation(shared::first_error_message(&errors))
    }
}

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;
