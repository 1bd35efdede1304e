//! Scriptable in-memory room provider for tests
//!
//! `MockRoom` implements [`RoomProvider`] with fully scripted behavior: tests
//! control the connected flag, mutate the roster, and inject failures for
//! individual operations, then assert on recorded call counts. Nothing here
//! touches real media.
//!
//! Joining a mock room does *not* raise the connected flag by itself; tests
//! drive that explicitly via [`MockRoom::set_connected`] so the timing
//! ambiguity of real SDKs can be reproduced.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::broadcast;

use crate::error::{RoomError, RoomResult};
use crate::events::RoomEvent;
use crate::provider::RoomProvider;
use crate::types::{Participant, RoomCredential};

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Default)]
struct Scripted {
    join_error: Option<RoomError>,
    end_room_error: Option<RoomError>,
    screen_share_error: Option<RoomError>,
    leave_error: Option<RoomError>,
    join_latency: Option<Duration>,
}

/// Scriptable room provider for exercising the session state machine
pub struct MockRoom {
    connected: AtomicBool,
    microphone: AtomicBool,
    camera: AtomicBool,
    screen_share: AtomicBool,
    participants: Mutex<Vec<Participant>>,
    scripted: Mutex<Scripted>,
    join_calls: AtomicUsize,
    leave_calls: AtomicUsize,
    end_room_calls: AtomicUsize,
    screen_share_calls: AtomicUsize,
    joined_names: Mutex<Vec<String>>,
    events: broadcast::Sender<RoomEvent>,
}

impl MockRoom {
    /// Create a disconnected mock room with an empty roster
    pub fn new() -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            connected: AtomicBool::new(false),
            microphone: AtomicBool::new(false),
            camera: AtomicBool::new(false),
            screen_share: AtomicBool::new(false),
            participants: Mutex::new(Vec::new()),
            scripted: Mutex::new(Scripted::default()),
            join_calls: AtomicUsize::new(0),
            leave_calls: AtomicUsize::new(0),
            end_room_calls: AtomicUsize::new(0),
            screen_share_calls: AtomicUsize::new(0),
            joined_names: Mutex::new(Vec::new()),
            events,
        })
    }

    // ===== scripting =====

    /// Make the next `join` call fail with the given error
    pub fn fail_next_join(&self, error: RoomError) {
        self.scripted.lock().join_error = Some(error);
    }

    /// Make every `end_room_for_all` call fail with the given error
    pub fn fail_end_room(&self, error: RoomError) {
        self.scripted.lock().end_room_error = Some(error);
    }

    /// Make the next screen-share start/stop fail with the given error
    pub fn fail_next_screen_share(&self, error: RoomError) {
        self.scripted.lock().screen_share_error = Some(error);
    }

    /// Make every `leave` call fail with the given error
    pub fn fail_leave(&self, error: RoomError) {
        self.scripted.lock().leave_error = Some(error);
    }

    /// Delay `join` calls by the given duration before they resolve
    pub fn set_join_latency(&self, latency: Duration) {
        self.scripted.lock().join_latency = Some(latency);
    }

    /// Raise or lower the explicit connected flag, emitting the matching event
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
        let _ = self.events.send(RoomEvent::ConnectionChanged { connected });
    }

    /// Add a remote participant and emit `ParticipantJoined`
    pub fn add_remote_participant(&self, participant: Participant) {
        self.participants.lock().push(participant.clone());
        let _ = self.events.send(RoomEvent::ParticipantJoined { participant });
    }

    /// Remove a remote participant by name and emit `ParticipantLeft`
    pub fn remove_remote_participant(&self, display_name: &str) {
        self.participants
            .lock()
            .retain(|p| p.display_name != display_name);
        let _ = self.events.send(RoomEvent::ParticipantLeft {
            display_name: display_name.to_string(),
        });
    }

    /// Start or stop a remote participant's screen share
    ///
    /// Updates the roster snapshot and emits `ScreenShareStarted` or
    /// `ScreenShareStopped`, the way a real SDK surfaces auxiliary tracks.
    pub fn set_remote_screen_share(&self, display_name: &str, active: bool) {
        {
            let mut roster = self.participants.lock();
            if let Some(slot) = roster.iter_mut().find(|p| p.display_name == display_name) {
                if active {
                    *slot = slot.clone().with_screen_share();
                } else {
                    slot.aux_tracks.clear();
                }
            }
        }
        let event = if active {
            RoomEvent::ScreenShareStarted {
                display_name: display_name.to_string(),
            }
        } else {
            RoomEvent::ScreenShareStopped {
                display_name: display_name.to_string(),
            }
        };
        let _ = self.events.send(event);
    }

    /// Replace a participant snapshot and emit `ParticipantUpdated`
    pub fn update_remote_participant(&self, participant: Participant) {
        {
            let mut roster = self.participants.lock();
            if let Some(slot) = roster
                .iter_mut()
                .find(|p| p.display_name == participant.display_name)
            {
                *slot = participant.clone();
            } else {
                roster.push(participant.clone());
            }
        }
        let _ = self.events.send(RoomEvent::ParticipantUpdated { participant });
    }

    // ===== assertions =====

    /// Number of `join` calls observed
    pub fn join_calls(&self) -> usize {
        self.join_calls.load(Ordering::SeqCst)
    }

    /// Number of `leave` calls observed
    pub fn leave_calls(&self) -> usize {
        self.leave_calls.load(Ordering::SeqCst)
    }

    /// Number of `end_room_for_all` calls observed
    pub fn end_room_calls(&self) -> usize {
        self.end_room_calls.load(Ordering::SeqCst)
    }

    /// Number of `set_screen_share_enabled` calls observed
    pub fn screen_share_calls(&self) -> usize {
        self.screen_share_calls.load(Ordering::SeqCst)
    }

    /// Display names passed to successful `join` calls, in order
    pub fn joined_display_names(&self) -> Vec<String> {
        self.joined_names.lock().clone()
    }
}

#[async_trait]
impl RoomProvider for MockRoom {
    async fn join(&self, credential: &RoomCredential, display_name: &str) -> RoomResult<()> {
        self.join_calls.fetch_add(1, Ordering::SeqCst);

        if credential.is_empty() {
            return Err(RoomError::join_rejected("empty credential"));
        }

        let (latency, error) = {
            let mut scripted = self.scripted.lock();
            (scripted.join_latency, scripted.join_error.take())
        };
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if let Some(error) = error {
            return Err(error);
        }

        self.joined_names.lock().push(display_name.to_string());
        Ok(())
    }

    async fn leave(&self) -> RoomResult<()> {
        self.leave_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.scripted.lock().leave_error.clone() {
            return Err(error);
        }
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn end_room_for_all(&self, reason: &str, _block_rejoin: bool) -> RoomResult<()> {
        self.end_room_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.scripted.lock().end_room_error.clone() {
            return Err(error);
        }
        let _ = self.events.send(RoomEvent::RoomEnded {
            reason: reason.to_string(),
        });
        Ok(())
    }

    async fn set_microphone_enabled(&self, enabled: bool) -> RoomResult<()> {
        self.microphone.store(enabled, Ordering::SeqCst);
        Ok(())
    }

    async fn set_camera_enabled(&self, enabled: bool) -> RoomResult<()> {
        self.camera.store(enabled, Ordering::SeqCst);
        Ok(())
    }

    async fn set_screen_share_enabled(&self, enabled: bool) -> RoomResult<()> {
        self.screen_share_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.scripted.lock().screen_share_error.take() {
            return Err(error);
        }
        self.screen_share.store(enabled, Ordering::SeqCst);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn microphone_enabled(&self) -> bool {
        self.microphone.load(Ordering::SeqCst)
    }

    fn camera_enabled(&self) -> bool {
        self.camera.load(Ordering::SeqCst)
    }

    fn screen_share_enabled(&self) -> bool {
        self.screen_share.load(Ordering::SeqCst)
    }

    fn remote_participants(&self) -> Vec<Participant> {
        self.participants.lock().clone()
    }

    fn subscribe(&self) -> broadcast::Receiver<RoomEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn join_records_display_name() {
        let room = MockRoom::new();
        let credential = RoomCredential::new("token");

        room.join(&credential, "Batch A").await.unwrap();

        assert_eq!(room.join_calls(), 1);
        assert_eq!(room.joined_display_names(), vec!["Batch A".to_string()]);
    }

    #[tokio::test]
    async fn empty_credential_is_rejected() {
        let room = MockRoom::new();
        let result = room.join(&RoomCredential::new(""), "Batch A").await;
        assert!(matches!(result, Err(RoomError::JoinRejected { .. })));
    }

    #[tokio::test]
    async fn scripted_join_failure_fires_once() {
        let room = MockRoom::new();
        room.fail_next_join(RoomError::transport("signalling down"));

        let credential = RoomCredential::new("token");
        assert!(room.join(&credential, "Batch A").await.is_err());
        // The scripted error is consumed; a retry succeeds
        assert!(room.join(&credential, "Batch A").await.is_ok());
        assert_eq!(room.join_calls(), 2);
    }

    #[tokio::test]
    async fn roster_mutations_emit_events() {
        let room = MockRoom::new();
        let mut feed = room.subscribe();

        room.add_remote_participant(Participant::attendee("Asha"));
        room.remove_remote_participant("Asha");

        assert!(matches!(
            feed.recv().await.unwrap(),
            RoomEvent::ParticipantJoined { .. }
        ));
        assert!(matches!(
            feed.recv().await.unwrap(),
            RoomEvent::ParticipantLeft { .. }
        ));
        assert!(room.remote_participants().is_empty());
    }

    #[tokio::test]
    async fn remote_screen_share_updates_roster_and_emits_events() {
        let room = MockRoom::new();
        room.add_remote_participant(Participant::tutor("Ravi"));
        let mut feed = room.subscribe();

        room.set_remote_screen_share("Ravi", true);
        assert!(room.remote_participants()[0].is_screen_sharing());
        assert!(matches!(
            feed.recv().await.unwrap(),
            RoomEvent::ScreenShareStarted { display_name } if display_name == "Ravi"
        ));

        room.set_remote_screen_share("Ravi", false);
        assert!(!room.remote_participants()[0].is_screen_sharing());
        assert!(matches!(
            feed.recv().await.unwrap(),
            RoomEvent::ScreenShareStopped { display_name } if display_name == "Ravi"
        ));
    }

    #[tokio::test]
    async fn connected_flag_round_trip() {
        let room = MockRoom::new();
        assert!(!room.is_connected());

        room.set_connected(true);
        assert!(room.is_connected());

        room.leave().await.unwrap();
        assert!(!room.is_connected());
        assert_eq!(room.leave_calls(), 1);
    }
}
