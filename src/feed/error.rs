//! Feed client error types
//!
//! Classifies upstream failures so the session loop can apply a uniform
//! count-and-backoff policy without inspecting transport details.

use thiserror::Error;

/// Error type for feed client operations
#[derive(Debug, Clone, Error)]
pub enum FeedError {
    /// Credentials were rejected by the upstream platform
    #[error("credentials rejected by upstream")]
    Unauthorized,

    /// The upstream platform is throttling this caller
    #[error("upstream rate limit exceeded")]
    RateLimited,

    /// The feed handle has expired or the resource is gone
    #[error("feed not found or expired")]
    NotFound,

    /// Network failure, timeout, or upstream 5xx
    #[error("transient upstream failure: {0}")]
    Transient(String),

    /// The upstream response could not be interpreted
    #[error("unexpected upstream response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FeedError::Parse(err.to_string())
        } else {
            // Timeouts, connect errors and body errors all retry the same way.
            FeedError::Transient(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FeedError {
    fn from(err: serde_json::Error) -> Self {
        FeedError::Parse(err.to_string())
    }
}
