//! The live-session client
//!
//! [`LiveSessionClient`] drives one live class instance end to end: a single
//! guarded join attempt, watchdog-resolved connection state, local media
//! controls, and the multi-backend teardown sequence. Collaborators (room
//! provider, permission probe, backends) are injected through traits, so the
//! whole lifecycle is testable with the mocks in `liveclass-room-core` and
//! `crate::backend::mock`.
//!
//! The client is a cheap cloneable handle. Dropping the last handle while the
//! session is still active performs an implicit leave: watchdog timers are
//! aborted and a best-effort local leave is issued in the background, without
//! the multi-backend notification sequence and without blocking drop.

pub mod builder;
pub mod media;
pub mod teardown;
pub(crate) mod watchdog;

#[cfg(test)]
mod tests;

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

use liveclass_room_core::{Participant, RoomProvider};

use crate::backend::{AttendanceBackend, ScheduleBackend};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::events::{ConnectionState, SessionEvent, SessionEventHandler};
use crate::permissions::{MediaPermissions, PermissionStatus};
use crate::session::SessionDescriptor;

pub use builder::LiveSessionClientBuilder;

pub(crate) const LIFECYCLE_ACTIVE: u8 = 0;
pub(crate) const LIFECYCLE_LEAVING: u8 = 1;
pub(crate) const LIFECYCLE_LEFT: u8 = 2;

const EVENT_CHANNEL_CAPACITY: usize = 128;

/// State shared between the client and its watchdog tasks
///
/// Deliberately separate from [`Inner`]: watchdog tasks hold only this, so
/// dropping the last client handle still runs [`Inner`]'s drop (and therefore
/// the implicit leave) even while a join attempt is pending.
pub(crate) struct Shared {
    pub(crate) session_id: crate::session::SessionId,
    pub(crate) room: Arc<dyn RoomProvider>,
    pub(crate) state: RwLock<ConnectionState>,
    /// Sticky latch: set once remote peers were ever observed, never reset
    pub(crate) peers_seen: AtomicBool,
    /// Whether the UI should show the joining indicator
    pub(crate) show_joining: AtomicBool,
    /// One-shot join guard; reset only on join failure to permit a retry
    pub(crate) join_attempted: AtomicBool,
    /// Set when the connection watchdog timed out (distinguishes error kinds)
    pub(crate) timed_out: AtomicBool,
    pub(crate) events: broadcast::Sender<SessionEvent>,
    pub(crate) handler: tokio::sync::RwLock<Option<Arc<dyn SessionEventHandler>>>,
}

impl Shared {
    /// Apply a connection state transition and fan it out
    ///
    /// `Joined` is terminal for a join attempt: nothing downgrades it. A
    /// failed attempt may go `Errored -> Joining` again on a retry.
    pub(crate) async fn transition(&self, next: ConnectionState, reason: Option<String>) {
        let previous = {
            let mut state = self.state.write();
            if *state == next || matches!(*state, ConnectionState::Joined) {
                return;
            }
            std::mem::replace(&mut *state, next.clone())
        };
        if next.is_resolved() {
            self.show_joining.store(false, Ordering::SeqCst);
        }
        let _ = self.events.send(SessionEvent::ConnectionStateChanged {
            previous: previous.clone(),
            current: next.clone(),
            reason,
        });
        if let Some(handler) = self.handler.read().await.clone() {
            handler.on_connection_state_changed(previous, next).await;
        }
    }
}

pub(crate) struct Inner {
    pub(crate) descriptor: SessionDescriptor,
    pub(crate) config: ClientConfig,
    pub(crate) instance_id: Uuid,
    pub(crate) permissions: Arc<dyn MediaPermissions>,
    pub(crate) attendance: Arc<dyn AttendanceBackend>,
    pub(crate) schedule: Arc<dyn ScheduleBackend>,
    pub(crate) shared: Arc<Shared>,
    pub(crate) lifecycle: AtomicU8,
    pub(crate) watchdog: Mutex<Option<watchdog::WatchdogHandle>>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(handle) = self.watchdog.get_mut().take() {
            handle.cancel();
        }
        // Implicit leave: never orphan a room connection, never block drop on
        // network calls.
        if self.lifecycle.load(Ordering::SeqCst) == LIFECYCLE_ACTIVE
            && self.shared.join_attempted.load(Ordering::SeqCst)
        {
            if let Ok(runtime) = tokio::runtime::Handle::try_current() {
                let room = self.shared.room.clone();
                let session_id = self.shared.session_id;
                debug!(%session_id, "client dropped while active; issuing best-effort leave");
                runtime.spawn(async move {
                    if let Err(error) = room.leave().await {
                        debug!(%session_id, %error, "best-effort leave on drop failed");
                    }
                });
            }
        }
    }
}

/// Client for one live class instance
///
/// Built with [`LiveSessionClientBuilder`]. Cloning yields another handle to
/// the same instance.
#[derive(Clone)]
pub struct LiveSessionClient {
    pub(crate) inner: Arc<Inner>,
}

impl LiveSessionClient {
    pub(crate) fn from_parts(
        descriptor: SessionDescriptor,
        config: ClientConfig,
        room: Arc<dyn RoomProvider>,
        permissions: Arc<dyn MediaPermissions>,
        attendance: Arc<dyn AttendanceBackend>,
        schedule: Arc<dyn ScheduleBackend>,
        handler: Option<Arc<dyn SessionEventHandler>>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let shared = Arc::new(Shared {
            session_id: descriptor.session_id,
            room,
            state: RwLock::new(ConnectionState::Joining),
            peers_seen: AtomicBool::new(false),
            show_joining: AtomicBool::new(false),
            join_attempted: AtomicBool::new(false),
            timed_out: AtomicBool::new(false),
            events,
            handler: tokio::sync::RwLock::new(handler),
        });
        Self {
            inner: Arc::new(Inner {
                descriptor,
                config,
                instance_id: Uuid::new_v4(),
                permissions,
                attendance,
                schedule,
                shared,
                lifecycle: AtomicU8::new(LIFECYCLE_ACTIVE),
                watchdog: Mutex::new(None),
            }),
        }
    }

    /// Attempt to join the session room
    ///
    /// At most one join is attempted per instance; concurrent or repeated
    /// calls return [`ClientError::AlreadyJoined`]. The call returns once the
    /// provider's join call completes - the definitive `joined`/`errored`
    /// resolution arrives asynchronously through the watchdog (observe it via
    /// [`subscribe`](Self::subscribe), [`connection_state`](Self::connection_state)
    /// or [`wait_for_join`](Self::wait_for_join)).
    ///
    /// A failed attempt (rejection or timeout) re-arms the guard so the
    /// caller may invoke `join` again.
    pub async fn join(&self) -> ClientResult<()> {
        let inner = &self.inner;
        if inner.lifecycle.load(Ordering::SeqCst) != LIFECYCLE_ACTIVE {
            return Err(ClientError::AlreadyLeaving);
        }
        if inner.shared.join_attempted.swap(true, Ordering::SeqCst) {
            return Err(ClientError::AlreadyJoined);
        }

        // Best-effort permission probe; only a definitive denial aborts.
        let status = inner.permissions.probe().await;
        debug!(%status, instance = %inner.instance_id, "media permission probe");
        if status == PermissionStatus::Denied {
            let message = "Camera or microphone access is blocked. \
                           Allow access in your browser settings and try again."
                .to_string();
            inner.shared.join_attempted.store(false, Ordering::SeqCst);
            inner
                .shared
                .transition(
                    ConnectionState::Errored {
                        message: message.clone(),
                    },
                    Some("permission denied".to_string()),
                )
                .await;
            return Err(ClientError::PermissionDenied { message });
        }

        let display_name = inner
            .descriptor
            .batch_name
            .clone()
            .unwrap_or_else(|| inner.config.default_display_name.clone());

        inner.shared.show_joining.store(true, Ordering::SeqCst);
        inner.shared.timed_out.store(false, Ordering::SeqCst);
        inner
            .shared
            .transition(ConnectionState::Joining, Some("join requested".to_string()))
            .await;

        // Timers run from the moment the join is requested, and the event
        // forwarder must be live before the join call so no signal is missed.
        let handle = watchdog::spawn(inner.shared.clone(), inner.config.watchdog.clone());
        let probe_tx = handle.signal_sender();
        if let Some(stale) = inner.watchdog.lock().replace(handle) {
            // Leftover from a previous failed attempt.
            stale.cancel();
        }

        info!(
            session_id = %inner.descriptor.session_id,
            %display_name,
            "joining live session room"
        );
        match inner
            .shared
            .room
            .join(&inner.descriptor.credential, &display_name)
            .await
        {
            Ok(()) => {
                // The provider may already report connected, or the roster
                // may already be populated; evaluate immediately.
                let _ = probe_tx.send(watchdog::Signal::Probe);
                Ok(())
            }
            Err(error) => {
                warn!(session_id = %inner.descriptor.session_id, %error, "join call failed");
                if let Some(handle) = inner.watchdog.lock().take() {
                    handle.cancel();
                }
                inner.shared.join_attempted.store(false, Ordering::SeqCst);
                let message = error.to_string();
                inner
                    .shared
                    .transition(
                        ConnectionState::Errored {
                            message: message.clone(),
                        },
                        Some("join call failed".to_string()),
                    )
                    .await;
                Err(ClientError::JoinFailed { message })
            }
        }
    }

    /// Wait until the pending join resolves
    ///
    /// Returns `Ok(())` on `Joined`; maps an `Errored` resolution back to the
    /// error that caused it. Resolution is bounded by the watchdog's
    /// connection timeout, so this never waits forever.
    pub async fn wait_for_join(&self) -> ClientResult<()> {
        let mut events = self.inner.shared.events.subscribe();
        loop {
            match self.connection_state() {
                ConnectionState::Joined => return Ok(()),
                ConnectionState::Errored { message } => {
                    if self.inner.shared.timed_out.load(Ordering::SeqCst) {
                        return Err(ClientError::ConnectionTimeout {
                            seconds: self.inner.config.watchdog.connect_timeout.as_secs(),
                        });
                    }
                    return Err(ClientError::JoinFailed { message });
                }
                ConnectionState::Joining => {}
            }
            match events.recv().await {
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => {
                    return Err(ClientError::internal("event channel closed"));
                }
            }
        }
    }

    /// Current derived connection state
    pub fn connection_state(&self) -> ConnectionState {
        self.inner.shared.state.read().clone()
    }

    /// Whether the UI should currently show the joining indicator
    ///
    /// Cleared on resolution or by the cosmetic UI fallback timer.
    pub fn joining_indicator_visible(&self) -> bool {
        self.inner.shared.show_joining.load(Ordering::SeqCst)
    }

    /// The descriptor this client was built for
    pub fn descriptor(&self) -> &SessionDescriptor {
        &self.inner.descriptor
    }

    /// Unique id of this client instance (used in logs)
    pub fn instance_id(&self) -> Uuid {
        self.inner.instance_id
    }

    /// Snapshot of the remote participant roster
    pub fn remote_participants(&self) -> Vec<Participant> {
        self.inner.shared.room.remote_participants()
    }

    /// Subscribe to session events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.shared.events.subscribe()
    }

    /// Register (or replace) the session event handler
    pub async fn set_event_handler(&self, handler: Arc<dyn SessionEventHandler>) {
        *self.inner.shared.handler.write().await = Some(handler);
    }
}
