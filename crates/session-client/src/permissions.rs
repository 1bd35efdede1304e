//! Media permission probing
//!
//! Browsers and desktop shells differ in whether a camera/microphone
//! permission state can be read without prompting, so the probe is
//! best-effort by design: `Unavailable` means "could not tell", and the join
//! proceeds. Only a definitive `Denied` fails the join fast, before the room
//! provider is ever touched.

use async_trait::async_trait;

/// Camera/microphone permission state reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    /// Access is granted
    Granted,
    /// Access is blocked; a join attempt would fail at media acquisition
    Denied,
    /// The user has not been asked yet; joining will prompt
    Prompt,
    /// The platform offers no way to query without prompting
    Unavailable,
}

impl std::fmt::Display for PermissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PermissionStatus::Granted => write!(f, "granted"),
            PermissionStatus::Denied => write!(f, "denied"),
            PermissionStatus::Prompt => write!(f, "prompt"),
            PermissionStatus::Unavailable => write!(f, "unavailable"),
        }
    }
}

/// Best-effort probe of camera/microphone permission state
#[async_trait]
pub trait MediaPermissions: Send + Sync {
    /// Query the current permission state without prompting
    async fn probe(&self) -> PermissionStatus;
}

/// Probe that always reports granted access
///
/// The default when the hosting application does not wire a platform probe.
pub struct AlwaysGranted;

#[async_trait]
impl MediaPermissions for AlwaysGranted {
    async fn probe(&self) -> PermissionStatus {
        PermissionStatus::Granted
    }
}

/// Probe returning a fixed status, for tests and manual overrides
pub struct StaticPermissions(pub PermissionStatus);

#[async_trait]
impl MediaPermissions for StaticPermissions {
    async fn probe(&self) -> PermissionStatus {
        self.0
    }
}
