//! Registry configuration

use std::time::Duration;

/// Registry configuration options
///
/// Defaults mirror the fixed policy the overlay product ships with; inject
/// different values at construction for other deployments.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Maximum concurrently active sessions
    pub max_sessions: usize,

    /// Consecutive failed polls before a session gives up
    pub error_threshold: u32,

    /// Polling interval used when the upstream does not suggest one
    pub default_poll_interval: Duration,

    /// Backoff factor applied to the current interval after a failed poll
    pub backoff_multiplier: u32,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_sessions: 5,
            error_threshold: 5,
            default_poll_interval: Duration::from_secs(5),
            backoff_multiplier: 2,
        }
    }
}

impl RegistryConfig {
    /// Set the concurrency cap
    pub fn max_sessions(mut self, max: usize) -> Self {
        self.max_sessions = max;
        self
    }

    /// Set the consecutive-error threshold
    pub fn error_threshold(mut self, threshold: u32) -> Self {
        self.error_threshold = threshold;
        self
    }

    /// Set the fallback polling interval
    pub fn default_poll_interval(mut self, interval: Duration) -> Self {
        self.default_poll_interval = interval;
        self
    }

    /// Set the backoff multiplier
    pub fn backoff_multiplier(mut self, multiplier: u32) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }
}
