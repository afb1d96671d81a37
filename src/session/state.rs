//! Session state machine
//!
//! Tracks one ingestion session from admission to termination. The poll
//! loop is the single writer for cursor and cadence; the fields here are
//! the atomically-published mirror that stats reads and the registry's
//! bookkeeping use, so observing a session never touches its loop.

use std::sync::atomic::{AtomicI64, AtomicU32, AtomicU64, AtomicU8, Ordering};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::stats::SessionStats;

/// Session lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SessionPhase {
    /// Admitted, broadcast resolved, loop not yet polling
    Starting = 0,
    /// Poll loop is cycling
    Running = 1,
    /// Stop requested, loop draining toward exit
    Stopping = 2,
    /// Loop exited after a stop request
    Stopped = 3,
    /// Loop exited after hitting the consecutive-error threshold
    Failed = 4,
}

impl SessionPhase {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => SessionPhase::Starting,
            1 => SessionPhase::Running,
            2 => SessionPhase::Stopping,
            3 => SessionPhase::Stopped,
            _ => SessionPhase::Failed,
        }
    }

    /// Whether the loop is running or about to run
    pub fn is_active(self) -> bool {
        matches!(
            self,
            SessionPhase::Starting | SessionPhase::Running | SessionPhase::Stopping
        )
    }

    /// Terminal phases are never left; a new session is created instead
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionPhase::Stopped | SessionPhase::Failed)
    }
}

/// Shared state for one ingestion session
#[derive(Debug)]
pub struct SessionState {
    /// Owner id the session is scoped to
    pub owner: String,

    /// Broadcast being ingested
    pub broadcast_id: String,

    /// Live chat feed handle resolved at admission
    pub feed_handle: String,

    phase: AtomicU8,
    poll_interval_ms: AtomicU64,
    consecutive_errors: AtomicU32,
    last_activity_ms: AtomicI64,
    started_at: DateTime<Utc>,
    started_instant: Instant,
}

impl SessionState {
    /// Create state for a newly admitted session
    pub(crate) fn new(
        owner: &str,
        broadcast_id: &str,
        feed_handle: &str,
        initial_interval: Duration,
    ) -> Self {
        let started_at = Utc::now();

        Self {
            owner: owner.to_string(),
            broadcast_id: broadcast_id.to_string(),
            feed_handle: feed_handle.to_string(),
            phase: AtomicU8::new(SessionPhase::Starting as u8),
            poll_interval_ms: AtomicU64::new(initial_interval.as_millis() as u64),
            consecutive_errors: AtomicU32::new(0),
            last_activity_ms: AtomicI64::new(started_at.timestamp_millis()),
            started_at,
            started_instant: Instant::now(),
        }
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> SessionPhase {
        SessionPhase::from_u8(self.phase.load(Ordering::Acquire))
    }

    pub(crate) fn set_phase(&self, phase: SessionPhase) {
        self.phase.store(phase as u8, Ordering::Release);
    }

    /// Whether the poll loop is running or about to run
    pub fn is_active(&self) -> bool {
        self.phase().is_active()
    }

    /// Current polling interval
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.load(Ordering::Relaxed))
    }

    pub(crate) fn set_poll_interval(&self, interval: Duration) {
        self.poll_interval_ms
            .store(interval.as_millis() as u64, Ordering::Relaxed);
    }

    /// Consecutive failed polls since the last success
    pub fn consecutive_errors(&self) -> u32 {
        self.consecutive_errors.load(Ordering::Relaxed)
    }

    /// Record a failed poll, returning the new consecutive count
    pub(crate) fn record_failure(&self) -> u32 {
        self.consecutive_errors.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Record a successful poll: reset the error run, stamp activity
    pub(crate) fn record_success(&self) {
        self.consecutive_errors.store(0, Ordering::Relaxed);
        self.last_activity_ms
            .store(Utc::now().timestamp_millis(), Ordering::Relaxed);
    }

    /// Instant of the last successful poll
    pub fn last_activity(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.last_activity_ms.load(Ordering::Relaxed))
            .unwrap_or(self.started_at)
    }

    /// Time since the session started
    pub fn uptime(&self) -> Duration {
        self.started_instant.elapsed()
    }

    /// When the session started
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Take a point-in-time snapshot
    pub fn snapshot(&self) -> SessionStats {
        SessionStats {
            owner: self.owner.clone(),
            broadcast_id: self.broadcast_id.clone(),
            active: self.is_active(),
            poll_interval: self.poll_interval(),
            consecutive_errors: self.consecutive_errors(),
            uptime: self.uptime(),
            started_at: self.started_at,
            last_activity: self.last_activity(),
        }
    }
}
