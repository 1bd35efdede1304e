//! Builder for [`LiveSessionClient`]
//!
//! The room provider and both backends must be supplied; the permission probe
//! defaults to [`AlwaysGranted`] and the event handler is optional.
//!
//! ```rust
//! use std::sync::Arc;
//! use liveclass_room_core::{mock::MockRoom, RoomCredential};
//! use liveclass_session_client::backend::mock::{MockAttendanceBackend, MockScheduleBackend};
//! use liveclass_session_client::client::LiveSessionClientBuilder;
//! use liveclass_session_client::session::{FacultyId, SessionDescriptor, SessionId};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let descriptor = SessionDescriptor::new(
//!     SessionId(42),
//!     FacultyId(7),
//!     RoomCredential::new("token"),
//! )
//! .with_batch_name("Physics Batch A");
//!
//! let client = LiveSessionClientBuilder::new(descriptor)
//!     .room(MockRoom::new())
//!     .attendance_backend(Arc::new(MockAttendanceBackend::new()))
//!     .schedule_backend(Arc::new(MockScheduleBackend::new()))
//!     .build()?;
//! # let _ = client;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use liveclass_room_core::RoomProvider;

use crate::backend::{AttendanceBackend, ScheduleBackend};
use crate::client::LiveSessionClient;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::events::SessionEventHandler;
use crate::permissions::{AlwaysGranted, MediaPermissions};
use crate::session::SessionDescriptor;

/// Builder for a live-session client
pub struct LiveSessionClientBuilder {
    descriptor: SessionDescriptor,
    config: ClientConfig,
    room: Option<Arc<dyn RoomProvider>>,
    permissions: Arc<dyn MediaPermissions>,
    attendance: Option<Arc<dyn AttendanceBackend>>,
    schedule: Option<Arc<dyn ScheduleBackend>>,
    handler: Option<Arc<dyn SessionEventHandler>>,
}

impl LiveSessionClientBuilder {
    /// Start building a client for the given session
    pub fn new(descriptor: SessionDescriptor) -> Self {
        Self {
            descriptor,
            config: ClientConfig::default(),
            room: None,
            permissions: Arc::new(AlwaysGranted),
            attendance: None,
            schedule: None,
            handler: None,
        }
    }

    /// Override the client configuration
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the room provider (required)
    pub fn room(mut self, room: Arc<dyn RoomProvider>) -> Self {
        self.room = Some(room);
        self
    }

    /// Set the media permission probe (defaults to always granted)
    pub fn permissions(mut self, permissions: Arc<dyn MediaPermissions>) -> Self {
        self.permissions = permissions;
        self
    }

    /// Set the attendance backend (required)
    pub fn attendance_backend(mut self, backend: Arc<dyn AttendanceBackend>) -> Self {
        self.attendance = Some(backend);
        self
    }

    /// Set the scheduling backend (required)
    pub fn schedule_backend(mut self, backend: Arc<dyn ScheduleBackend>) -> Self {
        self.schedule = Some(backend);
        self
    }

    /// Register the session event handler up front
    pub fn event_handler(mut self, handler: Arc<dyn SessionEventHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Validate and build the client
    pub fn build(self) -> ClientResult<LiveSessionClient> {
        self.config.validate()?;
        if self.descriptor.credential.is_empty() {
            return Err(ClientError::config("session credential must not be empty"));
        }
        let room = self
            .room
            .ok_or_else(|| ClientError::config("a room provider is required"))?;
        let attendance = self
            .attendance
            .ok_or_else(|| ClientError::config("an attendance backend is required"))?;
        let schedule = self
            .schedule
            .ok_or_else(|| ClientError::config("a schedule backend is required"))?;

        Ok(LiveSessionClient::from_parts(
            self.descriptor,
            self.config,
            room,
            self.permissions,
            attendance,
            schedule,
            self.handler,
        ))
    }
}
