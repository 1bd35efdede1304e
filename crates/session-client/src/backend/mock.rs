//! Recording backend doubles for tests
//!
//! Each mock counts invocations and can be scripted to fail, which is how the
//! teardown sequencer's "steps 4-5 always run" property is exercised.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::backend::{AttendanceBackend, ScheduleBackend};
use crate::error::{ClientError, ClientResult};
use crate::session::{FacultyId, SessionId};

/// Recording attendance backend
#[derive(Default)]
pub struct MockAttendanceBackend {
    calls: AtomicUsize,
    last: Mutex<Option<(SessionId, FacultyId)>>,
    failure: Mutex<Option<ClientError>>,
}

impl MockAttendanceBackend {
    /// Create a mock that succeeds
    pub fn new() -> Self {
        Self::default()
    }

    /// Script every call to fail with the given error
    pub fn fail_with(&self, error: ClientError) {
        *self.failure.lock() = Some(error);
    }

    /// Number of `end_session` calls observed
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Arguments of the most recent call
    pub fn last_call(&self) -> Option<(SessionId, FacultyId)> {
        *self.last.lock()
    }
}

#[async_trait]
impl AttendanceBackend for MockAttendanceBackend {
    async fn end_session(&self, session_id: SessionId, faculty_id: FacultyId) -> ClientResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock() = Some((session_id, faculty_id));
        match self.failure.lock().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// Recording scheduling backend
#[derive(Default)]
pub struct MockScheduleBackend {
    calls: AtomicUsize,
    last: Mutex<Option<SessionId>>,
    failure: Mutex<Option<ClientError>>,
}

impl MockScheduleBackend {
    /// Create a mock that succeeds
    pub fn new() -> Self {
        Self::default()
    }

    /// Script every call to fail with the given error
    pub fn fail_with(&self, error: ClientError) {
        *self.failure.lock() = Some(error);
    }

    /// Number of `mark_session_complete` calls observed
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Session id of the most recent call
    pub fn last_call(&self) -> Option<SessionId> {
        *self.last.lock()
    }
}

#[async_trait]
impl ScheduleBackend for MockScheduleBackend {
    async fn mark_session_complete(&self, session_id: SessionId) -> ClientResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock() = Some(session_id);
        match self.failure.lock().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
