//! Error types for schedule reconciliation

use thiserror::Error;

/// Result type for schedule operations
pub type ScheduleResult<T> = Result<T, ScheduleError>;

/// Errors that can occur while fetching or reconciling schedules
#[derive(Debug, Clone, Error)]
pub enum ScheduleError {
    /// The schedule source could not be reached or returned a failure
    #[error("Schedule source error: {message}")]
    Source { message: String },

    /// A session record failed validation
    #[error("Invalid session record {session_id}: {message}")]
    InvalidRecord { session_id: u64, message: String },
}

impl ScheduleError {
    /// Create a source error
    pub fn source(message: impl Into<String>) -> Self {
        Self::Source {
            message: message.into(),
        }
    }

    /// Create an invalid-record error
    pub fn invalid_record(session_id: u64, message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            session_id,
            message: message.into(),
        }
    }
}
