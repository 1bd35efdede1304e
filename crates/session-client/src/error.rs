//! Error types for the session-client library

use thiserror::Error;

/// Result type for session client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the live-session client
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// A join was already attempted on this client instance
    #[error("A join has already been attempted for this session instance")]
    AlreadyJoined,

    /// Teardown is already in progress or finished
    #[error("The session is already leaving or has left")]
    AlreadyLeaving,

    /// Camera/microphone access is blocked before the join was attempted
    #[error("Media permission denied: {message}")]
    PermissionDenied { message: String },

    /// The room provider rejected the join call
    #[error("Failed to join the session: {message}")]
    JoinFailed { message: String },

    /// No connection signal arrived within the configured timeout
    #[error("Could not connect to the session within {seconds} seconds")]
    ConnectionTimeout { seconds: u64 },

    /// A local media operation failed
    #[error("Media operation '{operation}' failed: {message}")]
    Media { operation: String, message: String },

    /// A backend collaborator call failed
    #[error("{service} backend error: {message}")]
    Backend { service: String, message: String },

    /// The client configuration is invalid
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// Internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ClientError {
    /// Create a permission-denied error
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied {
            message: message.into(),
        }
    }

    /// Create a join-failure error
    pub fn join_failed(message: impl Into<String>) -> Self {
        Self::JoinFailed {
            message: message.into(),
        }
    }

    /// Create a media error
    pub fn media(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Media {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a backend error
    pub fn backend(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Backend {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
