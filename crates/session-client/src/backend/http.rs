//! HTTP implementations of the backend collaborator traits
//!
//! Thin bearer-token-authenticated JSON clients. Failures are mapped into
//! [`ClientError::Backend`] with enough context for the teardown report;
//! callers decide whether a failure is fatal (during teardown it never is).

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::backend::{AttendanceBackend, ScheduleBackend};
use crate::error::{ClientError, ClientResult};
use crate::session::{FacultyId, SessionId};

#[derive(Serialize)]
struct EndSessionBody {
    faculty_id: u64,
}

/// Attendance backend reached over HTTP
pub struct HttpAttendanceBackend {
    client: reqwest::Client,
    base_url: String,
    bearer_token: String,
}

impl HttpAttendanceBackend {
    /// Create a client for the attendance backend at `base_url`
    pub fn new(base_url: impl Into<String>, bearer_token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: trim_trailing_slash(base_url.into()),
            bearer_token: bearer_token.into(),
        }
    }
}

#[async_trait]
impl AttendanceBackend for HttpAttendanceBackend {
    async fn end_session(&self, session_id: SessionId, faculty_id: FacultyId) -> ClientResult<()> {
        let url = format!("{}/live-sessions/{}/end", self.base_url, session_id);
        debug!(%session_id, %faculty_id, %url, "notifying attendance backend of session end");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.bearer_token)
            .json(&EndSessionBody {
                faculty_id: faculty_id.0,
            })
            .send()
            .await
            .map_err(|e| ClientError::backend("attendance", e.to_string()))?;

        check_status("attendance", response).await
    }
}

/// Scheduling backend reached over HTTP
pub struct HttpScheduleBackend {
    client: reqwest::Client,
    base_url: String,
    bearer_token: String,
}

impl HttpScheduleBackend {
    /// Create a client for the scheduling backend at `base_url`
    pub fn new(base_url: impl Into<String>, bearer_token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: trim_trailing_slash(base_url.into()),
            bearer_token: bearer_token.into(),
        }
    }
}

#[async_trait]
impl ScheduleBackend for HttpScheduleBackend {
    async fn mark_session_complete(&self, session_id: SessionId) -> ClientResult<()> {
        let url = format!("{}/sessions/{}/complete", self.base_url, session_id);
        debug!(%session_id, %url, "marking session complete in scheduling backend");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.bearer_token)
            .send()
            .await
            .map_err(|e| ClientError::backend("schedule", e.to_string()))?;

        check_status("schedule", response).await
    }
}

async fn check_status(service: &str, response: reqwest::Response) -> ClientResult<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::backend(
        service,
        format!("HTTP {}: {}", status, truncate(&body, 200)),
    ))
}

fn trim_trailing_slash(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
