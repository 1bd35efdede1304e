//! Session identity types
//!
//! A [`SessionDescriptor`] is created by the hosting application before the
//! client is built and stays immutable for the client's lifetime. It carries
//! everything needed to join the room and to identify the session to the
//! attendance and scheduling backends afterwards.

use liveclass_room_core::RoomCredential;
use serde::{Deserialize, Serialize};

/// Numeric identifier of a scheduled live session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Numeric identifier of the faculty/mentor that owns a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FacultyId(pub u64);

impl std::fmt::Display for FacultyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of one live class instance
#[derive(Debug, Clone)]
pub struct SessionDescriptor {
    /// Session id in the scheduling backend
    pub session_id: SessionId,
    /// Faculty that owns the session (used for attendance accounting)
    pub faculty_id: FacultyId,
    /// Batch/course display name, if known; used as the room display name
    pub batch_name: Option<String>,
    /// Bearer credential for the video room
    pub credential: RoomCredential,
}

impl SessionDescriptor {
    /// Create a descriptor for the given session and faculty
    pub fn new(
        session_id: SessionId,
        faculty_id: FacultyId,
        credential: RoomCredential,
    ) -> Self {
        Self {
            session_id,
            faculty_id,
            batch_name: None,
            credential,
        }
    }

    /// Attach the batch/course display name
    pub fn with_batch_name(mut self, batch_name: impl Into<String>) -> Self {
        self.batch_name = Some(batch_name.into());
        self
    }
}
