//! Live chat ingestion for streaming overlays
//!
//! This library manages long-lived chat ingestion sessions against the
//! YouTube live chat API: it resolves an active broadcast to its chat
//! feed, polls the feed continuously at the cadence the platform asks
//! for, normalizes every entry, and relays it to a subscriber callback in
//! feed order. Sessions self-manage transient-error recovery and give up
//! after a bounded run of consecutive failures; a registry bounds how many
//! run concurrently.
//!
//! # Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use chrono::{TimeDelta, Utc};
//! use livechat_rs::{Credentials, SessionRegistry, YouTubeFeedClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(YouTubeFeedClient::new()?);
//! let registry = SessionRegistry::new(client);
//!
//! let credentials = Credentials::bearer("ya29.token", Utc::now() + TimeDelta::hours(1));
//! registry
//!     .start_session(
//!         "my-channel",
//!         "dQw4w9WgXcQ",
//!         credentials,
//!         Arc::new(|msg| println!("{}: {}", msg.author, msg.message)),
//!     )
//!     .await?;
//!
//! // ... later
//! registry.stop_session("my-channel").await;
//! # Ok(())
//! # }
//! ```

pub mod feed;
pub mod message;
pub mod registry;
pub mod session;
pub mod stats;

pub use feed::{BroadcastHandle, Credentials, FeedClient, FeedError, FeedPage, YouTubeFeedClient};
pub use message::{ChatMessage, MessageHandler, MessageMetadata, PLATFORM};
pub use registry::{RegistryConfig, SessionRegistry, StartError};
pub use session::SessionPhase;
pub use stats::{RegistryStats, SessionStats};
