//! Feed client trait
//!
//! The seam between the session machinery and the upstream platform.
//! Production code uses [`YouTubeFeedClient`](super::YouTubeFeedClient);
//! tests script a mock against the same trait.

use async_trait::async_trait;

use super::error::FeedError;
use super::types::{BroadcastHandle, Credentials, FeedPage};

/// Stateless-per-call access to the upstream chat feed API
///
/// Implementations must not cache between calls or mutate the credentials;
/// each call stands alone so the session loop owns all polling state.
#[async_trait]
pub trait FeedClient: Send + Sync {
    /// Resolve a broadcast to its chat feed handle and metadata
    ///
    /// Returns `Ok(None)` when the broadcast does not exist or is not
    /// currently live. That is an expected outcome, not an error.
    async fn resolve_broadcast(
        &self,
        credentials: &Credentials,
        broadcast_id: &str,
    ) -> Result<Option<BroadcastHandle>, FeedError>;

    /// Fetch the next page of chat entries since `cursor`
    ///
    /// A `None` cursor reads from the current head of the feed. The returned
    /// page carries the continuation cursor and the upstream's suggested
    /// minimum delay before the next call, which callers must honor.
    async fn fetch_entries(
        &self,
        credentials: &Credentials,
        feed_handle: &str,
        cursor: Option<&str>,
    ) -> Result<FeedPage, FeedError>;
}
