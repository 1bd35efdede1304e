//! Leave/teardown sequencer
//!
//! Ending a session touches three independent systems: the video room (host
//! end-room action), the attendance backend, and the scheduling backend. Any
//! of the first three steps may fail without preventing the rest; the local
//! leave and the closing notification always run. Outcomes are collected into
//! a [`TeardownReport`] rather than swallowed, so callers and logs can see
//! exactly which steps failed.

use std::sync::atomic::Ordering;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::client::{LiveSessionClient, LIFECYCLE_ACTIVE, LIFECYCLE_LEAVING, LIFECYCLE_LEFT};
use crate::error::{ClientError, ClientResult};
use crate::events::SessionEvent;
use crate::session::SessionId;

/// Step name: end the room for all participants (host action)
pub const STEP_END_ROOM: &str = "end_room_for_all";
/// Step name: notify the attendance backend
pub const STEP_NOTIFY_ATTENDANCE: &str = "notify_attendance";
/// Step name: mark the session complete in the scheduling backend
pub const STEP_MARK_COMPLETE: &str = "mark_session_complete";
/// Step name: leave the room locally
pub const STEP_LEAVE_ROOM: &str = "leave_room";

/// Outcome of a single teardown step
#[derive(Debug, Clone)]
pub struct TeardownStep {
    /// Step name (one of the `STEP_*` constants)
    pub name: &'static str,
    /// Failure description, if the step failed
    pub error: Option<String>,
}

impl TeardownStep {
    /// Whether the step completed without error
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Per-step outcome report for one teardown sequence
#[derive(Debug, Clone)]
pub struct TeardownReport {
    /// The session that was torn down
    pub session_id: SessionId,
    /// Step outcomes in execution order
    pub steps: Vec<TeardownStep>,
    /// When the sequence finished
    pub finished_at: DateTime<Utc>,
}

impl TeardownReport {
    fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            steps: Vec::new(),
            finished_at: Utc::now(),
        }
    }

    fn record(&mut self, name: &'static str, result: Result<(), String>) {
        match &result {
            Ok(()) => debug!(step = name, "teardown step succeeded"),
            Err(error) => warn!(step = name, %error, "teardown step failed (continuing)"),
        }
        self.steps.push(TeardownStep {
            name,
            error: result.err(),
        });
    }

    /// Look up a step outcome by name
    pub fn step(&self, name: &str) -> Option<&TeardownStep> {
        self.steps.iter().find(|s| s.name == name)
    }

    /// Whether every step succeeded
    pub fn fully_clean(&self) -> bool {
        self.steps.iter().all(TeardownStep::succeeded)
    }

    /// Names of the steps that failed, in execution order
    pub fn failed_steps(&self) -> Vec<&'static str> {
        self.steps
            .iter()
            .filter(|s| !s.succeeded())
            .map(|s| s.name)
            .collect()
    }
}

impl LiveSessionClient {
    /// Run the leave/teardown sequence
    ///
    /// Entered at most once per instance: a second call (or a call racing the
    /// first) returns [`ClientError::AlreadyLeaving`] without side effects.
    ///
    /// Steps 1-3 (end room for all, notify attendance, mark complete) are
    /// independently fallible and never stop the sequence; failures are
    /// logged and recorded in the report. The local leave and the closing
    /// notification always run.
    pub async fn end_session(&self) -> ClientResult<TeardownReport> {
        let inner = &self.inner;
        if inner
            .lifecycle
            .compare_exchange(
                LIFECYCLE_ACTIVE,
                LIFECYCLE_LEAVING,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_err()
        {
            debug!(
                session_id = %inner.descriptor.session_id,
                "leave requested while already leaving; ignored"
            );
            return Err(ClientError::AlreadyLeaving);
        }

        let session_id = inner.descriptor.session_id;
        info!(%session_id, "ending live session");

        // The join attempt (if still pending) is over either way.
        if let Some(handle) = inner.watchdog.lock().take() {
            handle.cancel();
        }
        inner.shared.show_joining.store(false, Ordering::SeqCst);

        let mut report = TeardownReport::new(session_id);

        // 1. End the room for everyone. Expected to fail for non-host roles.
        let outcome = inner
            .shared
            .room
            .end_room_for_all(&inner.config.end_room_reason, inner.config.block_rejoin_on_end)
            .await;
        report.record(STEP_END_ROOM, outcome.map_err(|e| e.to_string()));

        // 2. Tell the attendance backend the session ended.
        let outcome = inner
            .attendance
            .end_session(session_id, inner.descriptor.faculty_id)
            .await;
        report.record(STEP_NOTIFY_ATTENDANCE, outcome.map_err(|e| e.to_string()));

        // 3. Mark the session complete in the schedule.
        let outcome = inner.schedule.mark_session_complete(session_id).await;
        report.record(STEP_MARK_COMPLETE, outcome.map_err(|e| e.to_string()));

        // 4. Leave the room locally. Always attempted.
        let outcome = inner.shared.room.leave().await;
        report.record(STEP_LEAVE_ROOM, outcome.map_err(|e| e.to_string()));

        report.finished_at = Utc::now();
        inner.lifecycle.store(LIFECYCLE_LEFT, Ordering::SeqCst);

        // 5. Hand control back to the hosting UI. Always delivered.
        let _ = inner.shared.events.send(SessionEvent::SessionClosed {
            session_id,
            report: report.clone(),
        });
        if let Some(handler) = inner.shared.handler.read().await.clone() {
            handler.on_session_closed(session_id).await;
        }

        if !report.fully_clean() {
            info!(
                %session_id,
                failed = ?report.failed_steps(),
                "session ended with partial teardown failures"
            );
        }
        Ok(report)
    }
}
