//! # Schedule Core - Session-Schedule Reconciliation
//!
//! Backend session records arrive as raw scheduling facts (a planned window,
//! start/end marks, a reschedule counter). What dashboards actually render is
//! a derived status: is the class live right now, moved, still upcoming, or
//! over? That derivation lives here as a pure function,
//! [`derive_status`], plus a polling [`feed::ScheduleFeed`] that re-derives on
//! an interval and broadcasts the changes.
//!
//! ```rust
//! use chrono::{Duration, Utc};
//! use liveclass_schedule_core::{derive_status, SessionRecord, SessionStatus};
//!
//! let record = SessionRecord::new(1, 7, Utc::now() - Duration::minutes(5), 60);
//! // The scheduled window contains "now" - the class is live by wall clock.
//! assert_eq!(derive_status(&record, Utc::now()), SessionStatus::Live);
//! ```

pub mod error;
pub mod feed;
pub mod record;

pub use error::{ScheduleError, ScheduleResult};
pub use feed::{ScheduleEvent, ScheduleFeed, ScheduleSource, SessionSnapshot};
pub use record::{derive_status, SessionRecord, SessionStatus};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
