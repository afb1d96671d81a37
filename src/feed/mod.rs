//! Upstream chat feed access
//!
//! A thin, stateless-per-call layer over the platform API: resolve a
//! broadcast to its live chat feed handle, then page through the feed with
//! a continuation cursor. The [`FeedClient`] trait is the seam the session
//! machinery polls through, so tests can script the upstream.

pub mod client;
pub mod error;
pub mod types;
pub mod youtube;

#[cfg(test)]
pub(crate) mod mock;

pub use client::FeedClient;
pub use error::FeedError;
pub use types::{BroadcastHandle, Credentials, FeedPage, RawChatItem};
pub use youtube::YouTubeFeedClient;
