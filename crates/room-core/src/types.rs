//! Type definitions for the room-core library
//!
//! Participants and their tracks are owned by the room provider; the types
//! here are read-only snapshots handed to consumers. Nothing in this module
//! mutates provider state.

use serde::{Deserialize, Serialize};

/// Opaque bearer credential required to join a room
///
/// Created by the hosting application (usually minted by a backend) and passed
/// through unchanged. The token is never logged; `Debug` renders a redacted
/// placeholder.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomCredential(String);

impl RoomCredential {
    /// Wrap a raw bearer token
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for the provider's join call only
    pub fn token(&self) -> &str {
        &self.0
    }

    /// Whether the credential is empty (never valid for a join)
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for RoomCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RoomCredential(<redacted>)")
    }
}

/// Role of a participant inside a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantRole {
    /// The session host (faculty/mentor); may perform host actions
    Tutor,
    /// A regular attendee (student)
    Attendee,
}

impl std::fmt::Display for ParticipantRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParticipantRole::Tutor => write!(f, "tutor"),
            ParticipantRole::Attendee => write!(f, "attendee"),
        }
    }
}

/// Kind of media track a participant can publish
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackKind {
    /// Camera video track
    Camera,
    /// Microphone audio track
    Microphone,
    /// Auxiliary screen-share video track
    ScreenShare,
}

/// A published media track and its live enabled state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackInfo {
    /// What kind of track this is
    pub kind: TrackKind,
    /// Whether the track is currently enabled (unmuted / actively publishing)
    pub enabled: bool,
}

impl TrackInfo {
    /// Convenience constructor for an enabled track of the given kind
    pub fn enabled(kind: TrackKind) -> Self {
        Self {
            kind,
            enabled: true,
        }
    }
}

/// Read-only snapshot of one attendee in a room
///
/// The roster is owned by the room provider; consumers receive cloned
/// snapshots and must not assume they stay current after roster events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Display name shown in the session UI
    pub display_name: String,
    /// Role inside the room
    pub role: ParticipantRole,
    /// Whether the participant's microphone track is enabled
    pub microphone_enabled: bool,
    /// Whether the participant's camera track is enabled
    pub camera_enabled: bool,
    /// Auxiliary (screen-share) tracks, usually zero or one
    pub aux_tracks: Vec<TrackInfo>,
}

impl Participant {
    /// Create an attendee with all media muted and no auxiliary tracks
    pub fn attendee(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            role: ParticipantRole::Attendee,
            microphone_enabled: false,
            camera_enabled: false,
            aux_tracks: Vec::new(),
        }
    }

    /// Create a tutor with all media muted and no auxiliary tracks
    pub fn tutor(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            role: ParticipantRole::Tutor,
            microphone_enabled: false,
            camera_enabled: false,
            aux_tracks: Vec::new(),
        }
    }

    /// Whether this participant has an active screen share
    pub fn is_screen_sharing(&self) -> bool {
        self.aux_tracks
            .iter()
            .any(|t| t.kind == TrackKind::ScreenShare && t.enabled)
    }

    /// Builder-style helper: add an active screen-share track
    pub fn with_screen_share(mut self) -> Self {
        self.aux_tracks.push(TrackInfo::enabled(TrackKind::ScreenShare));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_debug_is_redacted() {
        let credential = RoomCredential::new("super-secret-token");
        let rendered = format!("{:?}", credential);
        assert!(!rendered.contains("super-secret-token"));
        assert!(rendered.contains("redacted"));
    }

    #[test]
    fn screen_share_detection() {
        let idle = Participant::attendee("Asha");
        assert!(!idle.is_screen_sharing());

        let sharing = Participant::tutor("Ravi").with_screen_share();
        assert!(sharing.is_screen_sharing());

        // A disabled aux track does not count as an active share
        let mut stopped = Participant::tutor("Meera");
        stopped.aux_tracks.push(TrackInfo {
            kind: TrackKind::ScreenShare,
            enabled: false,
        });
        assert!(!stopped.is_screen_sharing());
    }

    #[test]
    fn role_display() {
        assert_eq!(ParticipantRole::Tutor.to_string(), "tutor");
        assert_eq!(ParticipantRole::Attendee.to_string(), "attendee");
    }
}
