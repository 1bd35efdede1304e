//! State-machine tests for the live-session client
//!
//! All timings are shrunk test doubles of the production watchdog settings;
//! the margins between them are deliberately wide so the suite stays stable
//! on slow CI machines.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use liveclass_room_core::mock::MockRoom;
use liveclass_room_core::{Participant, RoomCredential, RoomError};

use crate::backend::mock::{MockAttendanceBackend, MockScheduleBackend};
use crate::client::{LiveSessionClient, LiveSessionClientBuilder};
use crate::config::{ClientConfig, WatchdogConfig};
use crate::error::ClientError;
use crate::events::{ConnectionState, SessionEvent, SessionEventHandler};
use crate::permissions::{PermissionStatus, StaticPermissions};
use crate::session::{FacultyId, SessionDescriptor, SessionId};

const SESSION: SessionId = SessionId(42);
const FACULTY: FacultyId = FacultyId(7);

fn test_watchdog() -> WatchdogConfig {
    WatchdogConfig {
        connect_timeout: Duration::from_millis(400),
        ui_fallback: Duration::from_millis(120),
        poll_interval: Duration::from_millis(40),
        poll_max_iterations: 5,
        poll_abandon_after: Duration::from_millis(250),
    }
}

fn descriptor() -> SessionDescriptor {
    SessionDescriptor::new(SESSION, FACULTY, RoomCredential::new("token"))
        .with_batch_name("Physics Batch A")
}

struct Harness {
    client: LiveSessionClient,
    room: Arc<MockRoom>,
    attendance: Arc<MockAttendanceBackend>,
    schedule: Arc<MockScheduleBackend>,
}

fn harness() -> Harness {
    harness_with(descriptor(), PermissionStatus::Granted)
}

fn harness_with(descriptor: SessionDescriptor, permissions: PermissionStatus) -> Harness {
    let room = MockRoom::new();
    let attendance = Arc::new(MockAttendanceBackend::new());
    let schedule = Arc::new(MockScheduleBackend::new());
    let client = LiveSessionClientBuilder::new(descriptor)
        .config(ClientConfig::default().with_watchdog(test_watchdog()))
        .room(room.clone())
        .permissions(Arc::new(StaticPermissions(permissions)))
        .attendance_backend(attendance.clone())
        .schedule_backend(schedule.clone())
        .build()
        .unwrap();
    Harness {
        client,
        room,
        attendance,
        schedule,
    }
}

async fn wait_until(what: &str, deadline: Duration, predicate: impl Fn() -> bool) {
    let start = tokio::time::Instant::now();
    while !predicate() {
        assert!(
            start.elapsed() < deadline,
            "timed out waiting for {}",
            what
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

#[derive(Default)]
struct RecordingHandler {
    transitions: Mutex<Vec<(ConnectionState, ConnectionState)>>,
    closed: Mutex<Vec<SessionId>>,
}

#[async_trait]
impl SessionEventHandler for RecordingHandler {
    async fn on_connection_state_changed(
        &self,
        previous: ConnectionState,
        current: ConnectionState,
    ) {
        self.transitions.lock().push((previous, current));
    }

    async fn on_session_closed(&self, session_id: SessionId) {
        self.closed.lock().push(session_id);
    }
}

// ===== JOIN GUARD =====

#[tokio::test]
async fn join_is_attempted_at_most_once() {
    let h = harness();
    h.client.join().await.unwrap();

    let second = h.client.join().await;
    assert!(matches!(second, Err(ClientError::AlreadyJoined)));
    assert_eq!(h.room.join_calls(), 1);
}

#[tokio::test]
async fn denied_permission_skips_the_join_entirely() {
    let h = harness_with(descriptor(), PermissionStatus::Denied);

    let result = h.client.join().await;
    assert!(matches!(result, Err(ClientError::PermissionDenied { .. })));
    assert_eq!(h.room.join_calls(), 0, "provider join must not be called");
    assert!(matches!(
        h.client.connection_state(),
        ConnectionState::Errored { .. }
    ));
}

#[tokio::test]
async fn unavailable_permission_probe_does_not_block_join() {
    let h = harness_with(descriptor(), PermissionStatus::Unavailable);
    h.client.join().await.unwrap();
    assert_eq!(h.room.join_calls(), 1);
}

#[tokio::test]
async fn rejected_join_resets_the_guard_for_a_retry() {
    let h = harness();
    h.room.fail_next_join(RoomError::transport("signalling down"));

    let first = h.client.join().await;
    assert!(matches!(first, Err(ClientError::JoinFailed { .. })));
    assert!(matches!(
        h.client.connection_state(),
        ConnectionState::Errored { .. }
    ));

    // The guard re-armed; a second attempt goes through.
    h.client.join().await.unwrap();
    assert_eq!(h.room.join_calls(), 2);
}

#[tokio::test]
async fn display_name_falls_back_when_batch_is_unknown() {
    let plain = SessionDescriptor::new(SESSION, FACULTY, RoomCredential::new("token"));
    let h = harness_with(plain, PermissionStatus::Granted);
    h.client.join().await.unwrap();
    assert_eq!(h.room.joined_display_names(), vec!["Live Class".to_string()]);

    let h = harness();
    h.client.join().await.unwrap();
    assert_eq!(
        h.room.joined_display_names(),
        vec!["Physics Batch A".to_string()]
    );
}

// ===== WATCHDOG RESOLUTION =====

#[tokio::test]
async fn participants_prove_connection_without_the_explicit_flag() {
    // Scenario A: the SDK never raises connected, but a peer appears.
    let h = harness();
    h.client.join().await.unwrap();

    tokio::time::sleep(Duration::from_millis(30)).await;
    h.room.add_remote_participant(Participant::attendee("Asha"));

    h.client.wait_for_join().await.unwrap();
    assert_eq!(h.client.connection_state(), ConnectionState::Joined);
    // Resolved by presence, not by the timeout path.
    assert_eq!(h.room.leave_calls(), 0);
}

#[tokio::test]
async fn explicit_connected_flag_resolves_immediately() {
    let h = harness();
    h.client.join().await.unwrap();
    h.room.set_connected(true);

    h.client.wait_for_join().await.unwrap();
    assert_eq!(h.client.connection_state(), ConnectionState::Joined);
}

#[tokio::test]
async fn connected_before_join_is_caught_by_the_initial_probe() {
    let h = harness();
    // The flag is already up before join() is even called.
    h.room.set_connected(true);
    h.client.join().await.unwrap();

    h.client.wait_for_join().await.unwrap();
    assert_eq!(h.client.connection_state(), ConnectionState::Joined);
}

#[tokio::test]
async fn sticky_latch_never_reverts_to_joining() {
    let h = harness();
    h.client.join().await.unwrap();

    h.room.add_remote_participant(Participant::attendee("Asha"));
    h.client.wait_for_join().await.unwrap();

    // The roster emptying later must not demote the state.
    h.room.remove_remote_participant("Asha");
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(h.client.connection_state(), ConnectionState::Joined);
}

#[tokio::test]
async fn timeout_surfaces_error_and_cleans_up() {
    // Scenario B: no signal ever arrives.
    let h = harness();
    h.client.join().await.unwrap();

    let result = h.client.wait_for_join().await;
    assert!(matches!(result, Err(ClientError::ConnectionTimeout { .. })));
    assert!(matches!(
        h.client.connection_state(),
        ConnectionState::Errored { .. }
    ));

    // The timeout path issues a best-effort leave...
    wait_until("cleanup leave", Duration::from_millis(200), || {
        h.room.leave_calls() == 1
    })
    .await;

    // ...and re-arms the join guard for an explicit retry.
    h.client.join().await.unwrap();
    assert_eq!(h.room.join_calls(), 2);
}

#[tokio::test]
async fn ui_fallback_clears_the_spinner_without_deciding_state() {
    let h = harness();
    h.client.join().await.unwrap();
    assert!(h.client.joining_indicator_visible());

    // Past the 120ms fallback but well before the 400ms timeout.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!h.client.joining_indicator_visible());
    assert_eq!(h.client.connection_state(), ConnectionState::Joining);

    // The fatal timeout still fires later.
    let result = h.client.wait_for_join().await;
    assert!(matches!(result, Err(ClientError::ConnectionTimeout { .. })));
}

#[tokio::test]
async fn no_timers_fire_after_resolution() {
    let h = harness();
    h.client.join().await.unwrap();
    h.room.set_connected(true);
    h.client.wait_for_join().await.unwrap();

    let mut events = h.client.subscribe();

    // Sleep past every configured timer; none of them may still be alive.
    tokio::time::sleep(Duration::from_millis(600)).await;
    loop {
        match events.try_recv() {
            Ok(SessionEvent::JoiningIndicatorCleared) => {
                panic!("UI fallback fired after the join resolved")
            }
            Ok(SessionEvent::ConnectionStateChanged { current, .. }) => {
                panic!("state changed after resolution: {:?}", current)
            }
            Ok(_) => continue,
            Err(_) => break,
        }
    }
    assert_eq!(h.client.connection_state(), ConnectionState::Joined);
}

#[tokio::test]
async fn handler_observes_the_joined_transition() {
    let h = harness();
    let handler = Arc::new(RecordingHandler::default());
    h.client.set_event_handler(handler.clone()).await;

    h.client.join().await.unwrap();
    h.room.add_remote_participant(Participant::attendee("Asha"));
    h.client.wait_for_join().await.unwrap();

    wait_until("handler call", Duration::from_millis(200), || {
        !handler.transitions.lock().is_empty()
    })
    .await;
    let transitions = handler.transitions.lock();
    assert!(transitions
        .iter()
        .any(|(_, current)| *current == ConnectionState::Joined));
}

// ===== IMPLICIT LEAVE ON DROP =====

#[tokio::test]
async fn dropping_an_active_client_issues_a_best_effort_leave() {
    let h = harness();
    h.client.join().await.unwrap();
    h.room.set_connected(true);
    h.client.wait_for_join().await.unwrap();

    let room = h.room.clone();
    drop(h);

    wait_until("leave on drop", Duration::from_millis(200), || {
        room.leave_calls() == 1
    })
    .await;
}

#[tokio::test]
async fn dropping_mid_join_still_leaves() {
    let h = harness();
    h.client.join().await.unwrap();

    let room = h.room.clone();
    drop(h); // join pending, no resolution yet

    wait_until("leave on drop", Duration::from_millis(200), || {
        room.leave_calls() == 1
    })
    .await;
}

// ===== TEARDOWN =====

#[tokio::test]
async fn non_host_teardown_still_completes_everything_else() {
    // Scenario D: the attendee cannot end the room for all.
    let h = harness();
    let handler = Arc::new(RecordingHandler::default());
    h.client.set_event_handler(handler.clone()).await;

    h.client.join().await.unwrap();
    h.room.set_connected(true);
    h.client.wait_for_join().await.unwrap();

    h.room
        .fail_end_room(RoomError::host_permission("end_room_for_all"));

    let report = h.client.end_session().await.unwrap();
    assert_eq!(report.failed_steps(), vec!["end_room_for_all"]);
    assert_eq!(h.attendance.calls(), 1);
    assert_eq!(h.attendance.last_call(), Some((SESSION, FACULTY)));
    assert_eq!(h.schedule.calls(), 1);
    assert_eq!(h.schedule.last_call(), Some(SESSION));
    assert_eq!(h.room.leave_calls(), 1);
    assert_eq!(handler.closed.lock().as_slice(), &[SESSION]);
}

#[tokio::test]
async fn all_notification_failures_still_leave_and_notify_caller() {
    let h = harness();
    let handler = Arc::new(RecordingHandler::default());
    h.client.set_event_handler(handler.clone()).await;

    h.client.join().await.unwrap();
    h.room.set_connected(true);
    h.client.wait_for_join().await.unwrap();

    h.room.fail_end_room(RoomError::host_permission("end_room_for_all"));
    h.attendance
        .fail_with(ClientError::backend("attendance", "HTTP 503"));
    h.schedule
        .fail_with(ClientError::backend("schedule", "HTTP 500"));

    let report = h.client.end_session().await.unwrap();
    assert_eq!(
        report.failed_steps(),
        vec!["end_room_for_all", "notify_attendance", "mark_session_complete"]
    );
    // Steps 4 and 5 ran regardless.
    assert!(report.step("leave_room").unwrap().succeeded());
    assert_eq!(h.room.leave_calls(), 1);
    assert_eq!(handler.closed.lock().as_slice(), &[SESSION]);
}

#[tokio::test]
async fn reentrant_leave_is_a_no_op() {
    let h = harness();
    h.client.join().await.unwrap();
    h.room.set_connected(true);
    h.client.wait_for_join().await.unwrap();

    h.client.end_session().await.unwrap();
    let second = h.client.end_session().await;
    assert!(matches!(second, Err(ClientError::AlreadyLeaving)));

    // No step ran twice.
    assert_eq!(h.room.leave_calls(), 1);
    assert_eq!(h.attendance.calls(), 1);
    assert_eq!(h.schedule.calls(), 1);
}

#[tokio::test]
async fn failed_local_leave_is_recorded_but_not_fatal() {
    let h = harness();
    h.client.join().await.unwrap();
    h.room.set_connected(true);
    h.client.wait_for_join().await.unwrap();

    h.room.fail_leave(RoomError::transport("socket reset"));

    let report = h.client.end_session().await.unwrap();
    assert!(!report.step("leave_room").unwrap().succeeded());
    assert!(report.step("notify_attendance").unwrap().succeeded());
}

#[tokio::test]
async fn join_after_teardown_is_rejected() {
    let h = harness();
    h.client.join().await.unwrap();
    h.room.set_connected(true);
    h.client.wait_for_join().await.unwrap();
    h.client.end_session().await.unwrap();

    let result = h.client.join().await;
    assert!(matches!(result, Err(ClientError::AlreadyLeaving)));
}
