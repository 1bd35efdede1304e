//! Backend collaborators consumed during teardown
//!
//! Two independent services learn about a session ending: the
//! multimedia/attendance backend (stops attendance accounting) and the
//! scheduling backend (marks the session complete). Both sit behind traits so
//! the teardown sequencer can be exercised with scripted failures.

pub mod http;
pub mod mock;

use async_trait::async_trait;

use crate::error::ClientResult;
use crate::session::{FacultyId, SessionId};

/// Multimedia/attendance backend
#[async_trait]
pub trait AttendanceBackend: Send + Sync {
    /// Mark the session ended for attendance-accounting purposes
    async fn end_session(&self, session_id: SessionId, faculty_id: FacultyId) -> ClientResult<()>;
}

/// Scheduling/LMS backend
#[async_trait]
pub trait ScheduleBackend: Send + Sync {
    /// Mark the session complete in the schedule
    async fn mark_session_complete(&self, session_id: SessionId) -> ClientResult<()>;
}

pub use http::{HttpAttendanceBackend, HttpScheduleBackend};
