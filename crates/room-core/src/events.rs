//! Room event feed
//!
//! Providers publish these on a `tokio::sync::broadcast` channel obtained via
//! [`crate::RoomProvider::subscribe`]. Event ordering relative to roster reads
//! is not guaranteed by real SDKs; consumers that need a definitive answer
//! should re-read [`crate::RoomProvider::remote_participants`] when handling
//! an event rather than trusting the event payload alone.

use crate::types::Participant;

/// Events emitted by a room provider
#[derive(Debug, Clone)]
pub enum RoomEvent {
    /// The provider's explicit connected flag changed
    ConnectionChanged {
        /// New value of the connected flag
        connected: bool,
    },

    /// A remote participant joined the room
    ParticipantJoined {
        /// Snapshot of the participant at join time
        participant: Participant,
    },

    /// A remote participant left the room
    ParticipantLeft {
        /// Display name of the participant that left
        display_name: String,
    },

    /// A remote participant's media state changed (mute, camera, tracks)
    ParticipantUpdated {
        /// Fresh snapshot of the participant
        participant: Participant,
    },

    /// A remote participant started screen sharing
    ScreenShareStarted {
        /// Display name of the sharer
        display_name: String,
    },

    /// A remote participant stopped screen sharing
    ScreenShareStopped {
        /// Display name of the former sharer
        display_name: String,
    },

    /// The room was ended for everyone (host action or server shutdown)
    RoomEnded {
        /// Human-readable reason supplied by whoever ended the room
        reason: String,
    },
}
