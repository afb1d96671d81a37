//! Registry error types
//!
//! Admission errors returned synchronously from `start_session`. None of
//! these are retried internally: whether a broadcast is live yet, or
//! capacity is free yet, are conditions only the caller can wait on.

use thiserror::Error;

use crate::feed::FeedError;

/// Error type for session admission
#[derive(Debug, Error)]
pub enum StartError {
    /// A session already exists for this owner
    #[error("a session is already active for owner {owner}")]
    AlreadyActive {
        /// Owner id the duplicate start targeted
        owner: String,
    },

    /// The registry is at its concurrency cap
    #[error("session capacity reached ({limit} active)")]
    AtCapacity {
        /// Configured cap that was hit
        limit: usize,
    },

    /// The broadcast does not exist or has no active chat feed
    #[error("broadcast {broadcast_id} is not live")]
    BroadcastNotLive {
        /// Broadcast id that failed to resolve
        broadcast_id: String,
    },

    /// Broadcast resolution failed at the transport level
    #[error("broadcast resolution failed: {0}")]
    Feed(#[from] FeedError),
}
