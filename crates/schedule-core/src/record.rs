//! Session records and status derivation
//!
//! Status is never stored; it is re-derived from the record and the current
//! wall clock every time it is needed. Precedence, first match wins:
//!
//! 1. completed flag or an end mark -> `Completed`
//! 2. an explicit start mark -> `Live` (a postponement arriving mid-flight
//!    does not demote a session that is actually running)
//! 3. the scheduled window contains "now" -> `Live` (wall-clock inference)
//! 4. start is in the future and the record was ever moved -> `Rescheduled`
//! 5. start is in the future -> `Upcoming`
//! 6. the window passed without a start -> `Completed` (expired)

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Derived display status of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// The class is running right now
    Live,
    /// The class was moved and has not started yet
    Rescheduled,
    /// The class is in the future and was never moved
    Upcoming,
    /// The class ended, was marked complete, or its window expired unused
    Completed,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::Live => write!(f, "live"),
            SessionStatus::Rescheduled => write!(f, "rescheduled"),
            SessionStatus::Upcoming => write!(f, "upcoming"),
            SessionStatus::Completed => write!(f, "completed"),
        }
    }
}

/// Raw session record as returned by the scheduling backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Session id in the scheduling backend
    pub session_id: u64,
    /// Owning faculty id
    pub faculty_id: u64,
    /// Batch/course display name, if any
    #[serde(default)]
    pub batch_name: Option<String>,
    /// Planned start of the session
    pub scheduled_start: DateTime<Utc>,
    /// Planned duration in minutes
    pub duration_minutes: u32,
    /// When the session actually started, if it did
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    /// When the session actually ended, if it did
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
    /// How many times the session has been moved (0 = never)
    #[serde(default)]
    pub rescheduled_count: u32,
    /// Whether the backend marked the session complete
    #[serde(default)]
    pub completed: bool,
}

impl SessionRecord {
    /// Create a record with no start/end marks
    pub fn new(
        session_id: u64,
        faculty_id: u64,
        scheduled_start: DateTime<Utc>,
        duration_minutes: u32,
    ) -> Self {
        Self {
            session_id,
            faculty_id,
            batch_name: None,
            scheduled_start,
            duration_minutes,
            started_at: None,
            ended_at: None,
            rescheduled_count: 0,
            completed: false,
        }
    }

    /// Planned end of the session
    pub fn scheduled_end(&self) -> DateTime<Utc> {
        self.scheduled_start + Duration::minutes(i64::from(self.duration_minutes))
    }
}

/// Derive the display status of a record at the given wall-clock instant
pub fn derive_status(record: &SessionRecord, now: DateTime<Utc>) -> SessionStatus {
    if record.completed || record.ended_at.is_some() {
        return SessionStatus::Completed;
    }
    if record.started_at.is_some() {
        return SessionStatus::Live;
    }
    if now >= record.scheduled_start && now < record.scheduled_end() {
        return SessionStatus::Live;
    }
    if now < record.scheduled_start {
        if record.rescheduled_count > 0 {
            return SessionStatus::Rescheduled;
        }
        return SessionStatus::Upcoming;
    }
    // Window passed and the session never started.
    SessionStatus::Completed
}
