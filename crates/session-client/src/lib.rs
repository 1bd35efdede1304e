//! # LiveClass Session Client
//!
//! Client-side lifecycle management for live class sessions: joining a
//! third-party video room, converging on a definitive connection state within
//! a bounded time, local media controls, and a fault-tolerant multi-backend
//! teardown sequence.
//!
//! The hardest part of this domain is deciding "did we actually join?". Room
//! SDKs surface an explicit connected flag, but its timing relative to the
//! participant roster is not guaranteed, so this crate resolves connectivity
//! through a watchdog reducer that weighs several independent signals (see
//! [`client::watchdog`]'s module docs) and falls back to a hard 30 second
//! timeout.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use liveclass_room_core::{mock::MockRoom, RoomCredential};
//! use liveclass_session_client::backend::mock::{MockAttendanceBackend, MockScheduleBackend};
//! use liveclass_session_client::client::LiveSessionClientBuilder;
//! use liveclass_session_client::session::{FacultyId, SessionDescriptor, SessionId};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let descriptor = SessionDescriptor::new(
//!         SessionId(42),
//!         FacultyId(7),
//!         RoomCredential::new("room-token"),
//!     )
//!     .with_batch_name("Physics Batch A");
//!
//!     let client = LiveSessionClientBuilder::new(descriptor)
//!         .room(MockRoom::new())
//!         .attendance_backend(Arc::new(MockAttendanceBackend::new()))
//!         .schedule_backend(Arc::new(MockScheduleBackend::new()))
//!         .build()?;
//!
//!     client.join().await?;
//!     client.wait_for_join().await?;
//!
//!     // ... class runs ...
//!
//!     let report = client.end_session().await?;
//!     println!("teardown clean: {}", report.fully_clean());
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod permissions;
pub mod session;

// Re-export main types
pub use client::media::{ScreenShareAvailability, ShareOutcome};
pub use client::teardown::{TeardownReport, TeardownStep};
pub use client::{LiveSessionClient, LiveSessionClientBuilder};
pub use config::{ClientConfig, WatchdogConfig};
pub use error::{ClientError, ClientResult};
pub use events::{ConnectionState, SessionEvent, SessionEventHandler};
pub use permissions::{MediaPermissions, PermissionStatus};
pub use session::{FacultyId, SessionDescriptor, SessionId};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
