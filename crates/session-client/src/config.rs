//! Client configuration
//!
//! The defaults here mirror production behavior: a 30 second absolute
//! connection timeout, a 12 second cosmetic spinner fallback, and a bounded
//! 2 second auxiliary poll. Tests shrink these to keep suites fast; the
//! watchdog logic is identical at any scale.

use std::time::Duration;

use crate::error::{ClientError, ClientResult};

/// Timer settings for the connection watchdog
///
/// Only `connect_timeout` is fatal when it fires. The UI fallback clears the
/// visible joining indicator without deciding connection state, and the poll
/// merely bounds how long auxiliary re-sampling runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchdogConfig {
    /// Absolute deadline for a definitive connection signal
    pub connect_timeout: Duration,
    /// Cosmetic deadline after which the joining indicator is cleared
    pub ui_fallback: Duration,
    /// Interval between auxiliary connection re-probes
    pub poll_interval: Duration,
    /// Maximum number of auxiliary probes
    pub poll_max_iterations: u32,
    /// Absolute deadline after which auxiliary polling is abandoned
    pub poll_abandon_after: Duration,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            ui_fallback: Duration::from_secs(12),
            poll_interval: Duration::from_secs(2),
            poll_max_iterations: 5,
            poll_abandon_after: Duration::from_secs(10),
        }
    }
}

impl WatchdogConfig {
    /// Validate timer settings
    pub fn validate(&self) -> ClientResult<()> {
        if self.connect_timeout.is_zero() {
            return Err(ClientError::config("connect_timeout must be non-zero"));
        }
        if self.ui_fallback.is_zero() {
            return Err(ClientError::config("ui_fallback must be non-zero"));
        }
        if self.poll_interval.is_zero() {
            return Err(ClientError::config("poll_interval must be non-zero"));
        }
        if self.poll_max_iterations == 0 {
            return Err(ClientError::config("poll_max_iterations must be non-zero"));
        }
        Ok(())
    }
}

/// Configuration for a live-session client instance
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Display name used when the descriptor has no batch name
    pub default_display_name: String,
    /// Reason string passed to the host end-room action during teardown
    pub end_room_reason: String,
    /// Whether ending the room should block participants from rejoining
    pub block_rejoin_on_end: bool,
    /// Watchdog timer settings
    pub watchdog: WatchdogConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            default_display_name: "Live Class".to_string(),
            end_room_reason: "Class ended".to_string(),
            block_rejoin_on_end: true,
            watchdog: WatchdogConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fallback display name
    pub fn with_default_display_name(mut self, name: impl Into<String>) -> Self {
        self.default_display_name = name.into();
        self
    }

    /// Set the watchdog timer settings
    pub fn with_watchdog(mut self, watchdog: WatchdogConfig) -> Self {
        self.watchdog = watchdog;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> ClientResult<()> {
        if self.default_display_name.trim().is_empty() {
            return Err(ClientError::config("default_display_name must not be blank"));
        }
        self.watchdog.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_production_timings() {
        let config = WatchdogConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(30));
        assert_eq!(config.ui_fallback, Duration::from_secs(12));
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.poll_max_iterations, 5);
        assert_eq!(config.poll_abandon_after, Duration::from_secs(10));
    }

    #[test]
    fn zero_timers_are_rejected() {
        let mut config = WatchdogConfig::default();
        config.connect_timeout = Duration::ZERO;
        assert!(config.validate().is_err());

        let mut config = WatchdogConfig::default();
        config.poll_max_iterations = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn blank_display_name_is_rejected() {
        let config = ClientConfig::new().with_default_display_name("  ");
        assert!(config.validate().is_err());
    }
}
