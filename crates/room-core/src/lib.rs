//! # Room Core - Video-Room Provider Abstraction
//!
//! This crate defines the boundary between the LiveClass session stack and
//! whichever real-time video SDK actually carries the media. Everything the
//! session client needs from a room is expressed through the [`RoomProvider`]
//! trait: joining and leaving, host actions, local media toggles, the explicit
//! connected flag, the remote participant roster, and a broadcast feed of
//! [`RoomEvent`]s.
//!
//! Consumers never reach into SDK globals. They hold an `Arc<dyn RoomProvider>`
//! and subscribe to its event feed, which keeps the session state machine
//! testable against the scriptable [`mock::MockRoom`] shipped in this crate.
//!
//! ## Quick Start
//!
//! ```rust
//! use liveclass_room_core::{RoomCredential, RoomProvider};
//! use liveclass_room_core::mock::MockRoom;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let room = MockRoom::new();
//! let credential = RoomCredential::new("room-token");
//!
//! room.join(&credential, "Physics Batch A").await?;
//! assert_eq!(room.join_calls(), 1);
//!
//! room.leave().await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod events;
pub mod mock;
pub mod provider;
pub mod types;

pub use error::{RoomError, RoomResult};
pub use events::RoomEvent;
pub use provider::RoomProvider;
pub use types::{Participant, ParticipantRole, RoomCredential, TrackInfo, TrackKind};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
