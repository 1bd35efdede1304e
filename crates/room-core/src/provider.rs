//! The `RoomProvider` trait - the seam between the session stack and the SDK
//!
//! Real deployments back this with a thin adapter over the vendor's media SDK.
//! Tests back it with [`crate::mock::MockRoom`]. The session client only ever
//! sees this trait, which is what makes the join/leave state machine
//! unit-testable without real media.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::error::RoomResult;
use crate::events::RoomEvent;
use crate::types::{Participant, RoomCredential};

/// Abstraction over a third-party real-time video room
///
/// Implementations own the single underlying room connection and the
/// participant roster. Consumers treat both as a singleton resource: one join
/// at a time, always leave before any new join.
#[async_trait]
pub trait RoomProvider: Send + Sync {
    /// Connect to the room using the given credential and display name
    async fn join(&self, credential: &RoomCredential, display_name: &str) -> RoomResult<()>;

    /// Disconnect the local participant from the room
    ///
    /// Must be safe to call when not connected (idempotent no-op).
    async fn leave(&self) -> RoomResult<()>;

    /// End the room for all participants (host action)
    ///
    /// `block_rejoin` asks the provider to prevent participants from
    /// immediately rejoining. Fails with
    /// [`crate::RoomError::HostPermissionRequired`] for non-host roles.
    async fn end_room_for_all(&self, reason: &str, block_rejoin: bool) -> RoomResult<()>;

    /// Enable or disable the local microphone track
    async fn set_microphone_enabled(&self, enabled: bool) -> RoomResult<()>;

    /// Enable or disable the local camera track
    async fn set_camera_enabled(&self, enabled: bool) -> RoomResult<()>;

    /// Start or stop the local screen-share (auxiliary) track
    async fn set_screen_share_enabled(&self, enabled: bool) -> RoomResult<()>;

    /// The provider's explicit connected flag
    ///
    /// Real SDKs do not guarantee this flag is raised before (or even near)
    /// the moment remote participants become visible; callers that need a
    /// timely "am I in?" answer combine this with the roster.
    fn is_connected(&self) -> bool;

    /// Whether the local microphone track is currently enabled
    fn microphone_enabled(&self) -> bool;

    /// Whether the local camera track is currently enabled
    fn camera_enabled(&self) -> bool;

    /// Whether the local screen-share track is currently active
    fn screen_share_enabled(&self) -> bool;

    /// Snapshot of the remote participant roster
    fn remote_participants(&self) -> Vec<Participant>;

    /// Subscribe to the room event feed
    fn subscribe(&self) -> broadcast::Receiver<RoomEvent>;
}
