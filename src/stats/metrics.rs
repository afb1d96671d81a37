//! Statistics for chat ingestion sessions

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Point-in-time snapshot of one session
///
/// Produced from atomically-updated fields, so taking a snapshot never
/// blocks or interferes with the session's poll loop. A failed session is
/// distinguishable from an idle one by its error count and last-activity
/// instant while its entry is still visible.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStats {
    /// Owner id the session is scoped to
    pub owner: String,

    /// Broadcast being ingested
    pub broadcast_id: String,

    /// Whether the poll loop is running or about to run
    pub active: bool,

    /// Current polling interval
    pub poll_interval: Duration,

    /// Consecutive failed polls since the last success
    pub consecutive_errors: u32,

    /// Time since the session started
    pub uptime: Duration,

    /// When the session started
    pub started_at: DateTime<Utc>,

    /// Last successful poll, or the start instant before the first one
    pub last_activity: DateTime<Utc>,
}

/// Registry-wide aggregate
#[derive(Debug, Clone, Serialize)]
pub struct RegistryStats {
    /// Sessions currently in the table
    pub active_sessions: usize,

    /// Configured concurrency cap
    pub max_sessions: usize,
}

impl RegistryStats {
    /// Remaining admission slots
    pub fn available_slots(&self) -> usize {
        self.max_sessions.saturating_sub(self.active_sessions)
    }
}
