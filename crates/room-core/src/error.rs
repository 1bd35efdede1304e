//! Error types for room provider operations

use thiserror::Error;

/// Result type for room provider operations
pub type RoomResult<T> = Result<T, RoomError>;

/// Errors that can occur while talking to a video-room provider
#[derive(Debug, Clone, Error)]
pub enum RoomError {
    /// The provider rejected the join call outright
    #[error("Join rejected: {message}")]
    JoinRejected { message: String },

    /// An operation was attempted while not connected to a room
    #[error("Not connected to a room")]
    NotConnected,

    /// The local participant lacks the role required for a host action
    #[error("Host permission required: {action}")]
    HostPermissionRequired { action: String },

    /// A local media toggle (microphone, camera, screen share) failed
    ///
    /// `name` carries the platform error name when the SDK surfaces one
    /// (e.g. `NotAllowedError` when the user dismisses a share picker).
    #[error("Media operation '{operation}' failed: {message}")]
    MediaToggleFailed {
        operation: String,
        name: Option<String>,
        message: String,
    },

    /// Underlying transport failure (signalling socket, ICE, etc.)
    #[error("Room transport error: {message}")]
    Transport { message: String },
}

impl RoomError {
    /// Create a join-rejection error
    pub fn join_rejected(message: impl Into<String>) -> Self {
        Self::JoinRejected {
            message: message.into(),
        }
    }

    /// Create a host-permission error
    pub fn host_permission(action: impl Into<String>) -> Self {
        Self::HostPermissionRequired {
            action: action.into(),
        }
    }

    /// Create a media toggle error without a platform error name
    pub fn media_toggle(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MediaToggleFailed {
            operation: operation.into(),
            name: None,
            message: message.into(),
        }
    }

    /// Create a media toggle error carrying the platform error name
    pub fn media_toggle_named(
        operation: impl Into<String>,
        name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::MediaToggleFailed {
            operation: operation.into(),
            name: Some(name.into()),
            message: message.into(),
        }
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}
