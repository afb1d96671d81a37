//! Ingestion sessions
//!
//! One session is one long-lived unit of polling work bound to exactly one
//! (owner, broadcast) pair. The registry creates sessions; each session's
//! poll loop runs as its own tokio task and owns all of its polling state.

pub mod state;

pub(crate) mod poller;

pub use state::{SessionPhase, SessionState};
