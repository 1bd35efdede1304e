//! Connection watchdog - resolves "did we actually join?"
//!
//! Real room SDKs give no ordering guarantee between their explicit connected
//! flag and the moment remote participants become visible, so the watchdog
//! treats several independent signals as proof of connectivity and resolves
//! them through a single reducer instead of scattering conditionals across
//! callbacks.
//!
//! Each signal source posts one [`Signal`] onto an unbounded queue:
//!
//! - the room event forwarder (connected flag changes, roster changes),
//! - the absolute connection-timeout timer (fatal),
//! - the UI fallback timer (cosmetic - clears the joining indicator only),
//! - the bounded auxiliary poll (re-samples the provider, never decides alone).
//!
//! The reducer applies a fixed precedence on every evaluation: explicit
//! connected flag, then the sticky "peers were seen" latch, then current
//! roster presence, then the timeout. First match wins and ends the join
//! attempt. Only the timeout is fatal; every other timer fails open.
//!
//! Timer ownership: the reducer aborts the three timer tasks the moment the
//! state resolves; the [`WatchdogHandle`] held by the client aborts everything
//! (forwarder and reducer included) on leave or drop. Aborting an already
//! finished or already aborted task is a no-op, so cancellation is idempotent
//! from every path.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::task::AbortHandle;
use tokio::time::{sleep, MissedTickBehavior};
use tracing::{debug, info, warn};

use liveclass_room_core::RoomEvent;

use crate::client::media::derive_availability;
use crate::client::Shared;
use crate::config::WatchdogConfig;
use crate::events::{ConnectionState, SessionEvent};

/// Signals evaluated by the watchdog reducer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Signal {
    /// Re-sample every connectivity source (initial probe and poll ticks)
    Probe,
    /// The provider's explicit connected flag changed
    ConnectedFlag(bool),
    /// The remote roster changed; payload is its current size
    RosterSize(usize),
    /// Cosmetic fallback: clear the joining indicator
    UiFallback,
    /// Absolute connection timeout elapsed (fatal)
    ConnectTimeout,
}

/// Handle to a running watchdog
///
/// Cancelling is idempotent and never blocks.
pub(crate) struct WatchdogHandle {
    signal_tx: mpsc::UnboundedSender<Signal>,
    aborts: Vec<AbortHandle>,
}

impl WatchdogHandle {
    /// Sender used to inject the initial probe after the join call returns
    pub(crate) fn signal_sender(&self) -> mpsc::UnboundedSender<Signal> {
        self.signal_tx.clone()
    }

    /// Abort every watchdog task (timers, forwarder, reducer)
    pub(crate) fn cancel(&self) {
        for abort in &self.aborts {
            abort.abort();
        }
    }
}

/// Spawn the watchdog task set for one join attempt
pub(crate) fn spawn(shared: Arc<Shared>, config: WatchdogConfig) -> WatchdogHandle {
    let (signal_tx, signal_rx) = mpsc::unbounded_channel();

    let forwarder = tokio::spawn(forward_room_events(shared.clone(), signal_tx.clone()));

    let timeout_task = {
        let tx = signal_tx.clone();
        let after = config.connect_timeout;
        tokio::spawn(async move {
            sleep(after).await;
            let _ = tx.send(Signal::ConnectTimeout);
        })
    };

    let ui_task = {
        let tx = signal_tx.clone();
        let after = config.ui_fallback;
        tokio::spawn(async move {
            sleep(after).await;
            let _ = tx.send(Signal::UiFallback);
        })
    };

    let poll_task = {
        let tx = signal_tx.clone();
        let poll = config.clone();
        tokio::spawn(async move {
            // Bounded two ways: an iteration cap and an absolute abandon
            // deadline, whichever ends polling first.
            let _ = tokio::time::timeout(poll.poll_abandon_after, async {
                let mut ticker = tokio::time::interval(poll.poll_interval);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
                ticker.tick().await; // consume the immediate first tick
                for _ in 0..poll.poll_max_iterations {
                    ticker.tick().await;
                    if tx.send(Signal::Probe).is_err() {
                        break;
                    }
                }
            })
            .await;
        })
    };

    let timer_aborts = vec![
        timeout_task.abort_handle(),
        ui_task.abort_handle(),
        poll_task.abort_handle(),
    ];
    let reducer = tokio::spawn(reduce(shared, config, signal_rx, timer_aborts));

    let aborts = vec![
        forwarder.abort_handle(),
        timeout_task.abort_handle(),
        ui_task.abort_handle(),
        poll_task.abort_handle(),
        reducer.abort_handle(),
    ];

    WatchdogHandle { signal_tx, aborts }
}

/// Map room events to reducer signals and surface session-level events
///
/// Runs for the life of the session (not just the join attempt): screen-share
/// availability and room-ended notifications matter after `Joined` too.
async fn forward_room_events(shared: Arc<Shared>, tx: mpsc::UnboundedSender<Signal>) {
    let mut feed = shared.room.subscribe();
    loop {
        match feed.recv().await {
            Ok(RoomEvent::ConnectionChanged { connected }) => {
                let _ = tx.send(Signal::ConnectedFlag(connected));
            }
            Ok(RoomEvent::ParticipantJoined { .. })
            | Ok(RoomEvent::ParticipantLeft { .. })
            | Ok(RoomEvent::ParticipantUpdated { .. }) => {
                let _ = tx.send(Signal::RosterSize(shared.room.remote_participants().len()));
            }
            Ok(RoomEvent::ScreenShareStarted { .. }) | Ok(RoomEvent::ScreenShareStopped { .. }) => {
                let availability = derive_availability(&shared.room.remote_participants());
                let _ = shared
                    .events
                    .send(SessionEvent::ScreenShareAvailabilityChanged { availability });
                // A visible sharer also proves peers are present.
                let _ = tx.send(Signal::RosterSize(shared.room.remote_participants().len()));
            }
            Ok(RoomEvent::RoomEnded { reason }) => {
                info!(session_id = %shared.session_id, %reason, "room ended");
                let _ = shared.events.send(SessionEvent::RoomEnded { reason });
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "room event feed lagged; re-probing");
                let _ = tx.send(Signal::Probe);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Single reducer for the join attempt; first matching signal wins
async fn reduce(
    shared: Arc<Shared>,
    config: WatchdogConfig,
    mut rx: mpsc::UnboundedReceiver<Signal>,
    timer_aborts: Vec<AbortHandle>,
) {
    while let Some(signal) = rx.recv().await {
        match signal {
            Signal::Probe => {
                if let Some(reason) = probe_connectivity(&shared) {
                    resolve_joined(&shared, &timer_aborts, reason).await;
                    return;
                }
            }
            Signal::ConnectedFlag(true) => {
                resolve_joined(&shared, &timer_aborts, "connected flag").await;
                return;
            }
            Signal::ConnectedFlag(false) => {
                // The sticky latch outranks a lowered flag.
                if shared.peers_seen.load(Ordering::SeqCst) {
                    resolve_joined(&shared, &timer_aborts, "sticky latch").await;
                    return;
                }
            }
            Signal::RosterSize(size) => {
                if size > 0 {
                    shared.peers_seen.store(true, Ordering::SeqCst);
                    resolve_joined(&shared, &timer_aborts, "participants present").await;
                    return;
                }
                if shared.peers_seen.load(Ordering::SeqCst) {
                    resolve_joined(&shared, &timer_aborts, "sticky latch").await;
                    return;
                }
            }
            Signal::UiFallback => {
                if shared.show_joining.swap(false, Ordering::SeqCst) {
                    debug!(session_id = %shared.session_id, "joining indicator cleared by UI fallback");
                    let _ = shared.events.send(SessionEvent::JoiningIndicatorCleared);
                    if let Some(handler) = shared.handler.read().await.clone() {
                        handler.on_joining_indicator_cleared().await;
                    }
                }
                // Cosmetic only; keep reducing.
            }
            Signal::ConnectTimeout => {
                for abort in &timer_aborts {
                    abort.abort();
                }
                shared.timed_out.store(true, Ordering::SeqCst);
                // Permit a retry by a fresh join() call.
                shared.join_attempted.store(false, Ordering::SeqCst);
                let message = format!(
                    "Could not connect to the class within {} seconds. Check your network and try again.",
                    config.connect_timeout.as_secs()
                );
                warn!(session_id = %shared.session_id, "connection watchdog timed out");
                shared
                    .transition(
                        ConnectionState::Errored {
                            message: message.clone(),
                        },
                        Some("connection timeout".to_string()),
                    )
                    .await;
                // Clean up whatever partial connection the provider holds.
                if let Err(error) = shared.room.leave().await {
                    debug!(%error, "best-effort leave after timeout failed");
                }
                return;
            }
        }
    }
}

/// Re-sample every connectivity source, in precedence order
fn probe_connectivity(shared: &Shared) -> Option<&'static str> {
    if shared.room.is_connected() {
        return Some("connected flag");
    }
    if shared.peers_seen.load(Ordering::SeqCst) {
        return Some("sticky latch");
    }
    if !shared.room.remote_participants().is_empty() {
        shared.peers_seen.store(true, Ordering::SeqCst);
        return Some("participants present");
    }
    None
}

async fn resolve_joined(shared: &Shared, timer_aborts: &[AbortHandle], reason: &str) {
    for abort in timer_aborts {
        abort.abort();
    }
    info!(session_id = %shared.session_id, reason, "live session connected");
    shared
        .transition(ConnectionState::Joined, Some(reason.to_string()))
        .await;
}
