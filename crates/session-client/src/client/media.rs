//! Media control surface
//!
//! Toggles are plain request/response calls against the room provider; the
//! UI reads the provider's own reactive flags, so there is no optimistic
//! local state to get out of sync.
//!
//! Screen sharing has two quirks the rest of the controls lack: a start
//! request the user cancels or the platform denies is a silent no-op rather
//! than an error, and the control refuses to start a second concurrent share
//! while a remote participant's auxiliary track is active.

use tracing::{debug, warn};

use liveclass_room_core::{Participant, RoomError};

use crate::client::LiveSessionClient;
use crate::error::{ClientError, ClientResult};
use crate::events::SessionEvent;

/// Availability of the local screen-share control
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenShareAvailability {
    /// No remote share is active; the control may start one
    Available,
    /// A remote participant is already sharing; the control is disabled
    InUseBy {
        /// Display name of the current sharer, for the control's label
        display_name: String,
    },
}

impl ScreenShareAvailability {
    /// Whether a local share may be started
    pub fn is_available(&self) -> bool {
        matches!(self, ScreenShareAvailability::Available)
    }
}

/// Outcome of a local screen-share start request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
    /// The share started
    Started,
    /// Refused: a remote participant is already sharing
    Blocked {
        /// Display name of the current sharer
        display_name: String,
    },
    /// The user dismissed or denied the share picker; not an error
    Cancelled,
}

/// Derive share availability from a roster snapshot
pub(crate) fn derive_availability(roster: &[Participant]) -> ScreenShareAvailability {
    match roster.iter().find(|p| p.is_screen_sharing()) {
        Some(sharer) => ScreenShareAvailability::InUseBy {
            display_name: sharer.display_name.clone(),
        },
        None => ScreenShareAvailability::Available,
    }
}

/// Classify a screen-share failure as user cancellation
///
/// Platform pickers reject with `NotAllowedError` or `AbortError` when the
/// user dismisses or denies them; some SDKs only surface a message, so the
/// message text is matched for denied/permission/cancel as well.
pub(crate) fn is_share_cancellation(error: &RoomError) -> bool {
    match error {
        RoomError::MediaToggleFailed { name, message, .. } => {
            if let Some(name) = name {
                if name == "NotAllowedError" || name == "AbortError" {
                    return true;
                }
            }
            let lower = message.to_lowercase();
            lower.contains("denied") || lower.contains("permission") || lower.contains("cancel")
        }
        _ => false,
    }
}

impl LiveSessionClient {
    /// Enable or disable the local microphone
    pub async fn set_microphone_enabled(&self, enabled: bool) -> ClientResult<()> {
        self.inner
            .shared
            .room
            .set_microphone_enabled(enabled)
            .await
            .map_err(|e| ClientError::media("microphone", e.to_string()))
    }

    /// Enable or disable the local camera
    pub async fn set_camera_enabled(&self, enabled: bool) -> ClientResult<()> {
        self.inner
            .shared
            .room
            .set_camera_enabled(enabled)
            .await
            .map_err(|e| ClientError::media("camera", e.to_string()))
    }

    /// Whether the local microphone track is enabled (provider state)
    pub fn microphone_enabled(&self) -> bool {
        self.inner.shared.room.microphone_enabled()
    }

    /// Whether the local camera track is enabled (provider state)
    pub fn camera_enabled(&self) -> bool {
        self.inner.shared.room.camera_enabled()
    }

    /// Whether the local screen share is active (provider state)
    pub fn screen_share_enabled(&self) -> bool {
        self.inner.shared.room.screen_share_enabled()
    }

    /// Current availability of the screen-share control
    pub fn screen_share_availability(&self) -> ScreenShareAvailability {
        derive_availability(&self.inner.shared.room.remote_participants())
    }

    /// Request a local screen share
    ///
    /// Returns [`ShareOutcome::Blocked`] without touching the provider when a
    /// remote share is active, and [`ShareOutcome::Cancelled`] when the user
    /// dismisses or denies the share picker. Any other failure is surfaced as
    /// an error and also published as [`SessionEvent::ScreenShareFailed`].
    pub async fn start_screen_share(&self) -> ClientResult<ShareOutcome> {
        if let ScreenShareAvailability::InUseBy { display_name } = self.screen_share_availability()
        {
            debug!(sharer = %display_name, "screen share refused: remote share active");
            return Ok(ShareOutcome::Blocked { display_name });
        }

        match self.inner.shared.room.set_screen_share_enabled(true).await {
            Ok(()) => Ok(ShareOutcome::Started),
            Err(error) if is_share_cancellation(&error) => {
                debug!(%error, "screen share cancelled by user; suppressing");
                Ok(ShareOutcome::Cancelled)
            }
            Err(error) => {
                let message = format!("Could not start screen sharing: {}", error);
                warn!(%error, "screen share failed");
                let _ = self.inner.shared.events.send(SessionEvent::ScreenShareFailed {
                    message: message.clone(),
                });
                if let Some(handler) = self.inner.shared.handler.read().await.clone() {
                    handler.on_screen_share_failed(message.clone()).await;
                }
                Err(ClientError::media("screen_share", message))
            }
        }
    }

    /// Stop the local screen share
    ///
    /// Cancellation-shaped failures are suppressed the same way as on start.
    pub async fn stop_screen_share(&self) -> ClientResult<()> {
        match self.inner.shared.room.set_screen_share_enabled(false).await {
            Ok(()) => Ok(()),
            Err(error) if is_share_cancellation(&error) => {
                debug!(%error, "screen share stop classified as cancellation; suppressing");
                Ok(())
            }
            Err(error) => Err(ClientError::media("screen_share", error.to_string())),
        }
    }
}
