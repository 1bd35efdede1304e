//! Event handling for session-client operations
//!
//! The client publishes [`SessionEvent`]s on a broadcast channel for UI
//! observers, and additionally drives an optional [`SessionEventHandler`]
//! registered by the hosting application. Both see the same transitions; the
//! handler exists so a host can react without running its own receive loop.

use async_trait::async_trait;

use crate::client::media::ScreenShareAvailability;
use crate::client::teardown::TeardownReport;
use crate::session::SessionId;

/// Connection state of a session instance
///
/// Derived by the connection watchdog, never stored authoritatively anywhere
/// else. Once a client leaves `Joining` it never re-enters it for the same
/// join attempt; a fresh attempt (after a failed one) starts over at
/// `Joining`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// Waiting for a definitive connection signal
    Joining,
    /// A connectivity signal arrived; the session is live
    Joined,
    /// The join attempt failed; `message` is user-presentable
    Errored {
        /// Human-readable description of what went wrong
        message: String,
    },
}

impl ConnectionState {
    /// Whether this is a terminal state for the join attempt
    pub fn is_resolved(&self) -> bool {
        !matches!(self, ConnectionState::Joining)
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Joining => write!(f, "joining"),
            ConnectionState::Joined => write!(f, "joined"),
            ConnectionState::Errored { .. } => write!(f, "errored"),
        }
    }
}

/// Events emitted by a live-session client
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The derived connection state changed
    ConnectionStateChanged {
        /// State before the transition
        previous: ConnectionState,
        /// State after the transition
        current: ConnectionState,
        /// Which signal caused the transition (for logging/diagnostics)
        reason: Option<String>,
    },

    /// The cosmetic joining indicator was cleared by the UI fallback timer
    ///
    /// This does not mean the connection resolved; it only stops an
    /// indefinitely stuck spinner.
    JoiningIndicatorCleared,

    /// A remote participant started or stopped screen sharing
    ScreenShareAvailabilityChanged {
        /// Whether the local share control is currently available
        availability: ScreenShareAvailability,
    },

    /// A local screen-share request failed for a reason other than the user
    /// cancelling or denying the share picker
    ScreenShareFailed {
        /// User-presentable failure description
        message: String,
    },

    /// The room was ended for everyone
    RoomEnded {
        /// Reason supplied by whoever ended the room
        reason: String,
    },

    /// Teardown finished; the hosting UI should navigate away
    SessionClosed {
        /// The session that closed
        session_id: SessionId,
        /// Per-step outcome of the teardown sequence
        report: TeardownReport,
    },
}

/// Callback interface for hosting applications
///
/// All methods have defaults except the two every host cares about:
/// connection state changes (drive the joining/error view) and session
/// closure (navigate away).
#[async_trait]
pub trait SessionEventHandler: Send + Sync {
    /// Called on every connection state transition
    async fn on_connection_state_changed(
        &self,
        previous: ConnectionState,
        current: ConnectionState,
    );

    /// Called exactly once when teardown completes
    async fn on_session_closed(&self, session_id: SessionId);

    /// Called when a screen-share request fails visibly (not on cancellation)
    async fn on_screen_share_failed(&self, _message: String) {}

    /// Called when the cosmetic joining indicator is cleared by the fallback
    async fn on_joining_indicator_cleared(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joining_is_unresolved() {
        assert!(!ConnectionState::Joining.is_resolved());
        assert!(ConnectionState::Joined.is_resolved());
        assert!(ConnectionState::Errored {
            message: "timed out".to_string()
        }
        .is_resolved());
    }

    #[test]
    fn state_display() {
        assert_eq!(ConnectionState::Joining.to_string(), "joining");
        assert_eq!(ConnectionState::Joined.to_string(), "joined");
    }
}
