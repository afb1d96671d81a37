//! Feed client value types
//!
//! Credentials and broadcast metadata exchanged with the upstream platform,
//! plus the raw page shape returned by a single poll.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OAuth2 bearer credentials for the upstream platform
///
/// Owned by the caller and passed by reference into each feed call. The
/// library never refreshes or persists these; a rejected token surfaces as
/// [`FeedError::Unauthorized`](super::FeedError::Unauthorized).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// Bearer access token
    pub access_token: String,

    /// Refresh token, if the caller obtained one
    pub refresh_token: Option<String>,

    /// When the access token expires
    pub expires_at: DateTime<Utc>,

    /// Granted OAuth scopes
    pub scopes: Vec<String>,
}

impl Credentials {
    /// Create credentials from a bare access token
    pub fn bearer(access_token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            expires_at,
            scopes: Vec::new(),
        }
    }

    /// Whether the token expiry has passed
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// Metadata for one live broadcast, resolved at session start
///
/// Immutable once resolved. `feed_handle` is the identifier needed to poll
/// the broadcast's chat feed and is distinct from the broadcast id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastHandle {
    /// Platform video/broadcast id
    pub broadcast_id: String,

    /// Live chat feed identifier
    pub feed_handle: String,

    /// Broadcast title
    pub title: String,

    /// Channel display name
    pub channel_name: String,

    /// Thumbnail URL, if the platform returned one
    pub thumbnail_url: Option<String>,

    /// Live viewer count snapshot at resolve time
    pub viewer_count: Option<u64>,
}

/// One raw chat item as returned by the platform, before normalization
#[derive(Debug, Clone)]
pub struct RawChatItem {
    /// Platform-assigned message id
    pub platform_id: String,

    /// Author display name
    pub author: String,

    /// Author channel id
    pub author_channel_id: String,

    /// Whether the author moderates this chat
    pub is_moderator: bool,

    /// Message text
    pub text: String,

    /// Publish instant reported by the platform
    pub published_at: DateTime<Utc>,
}

/// One page of feed entries from a single poll
#[derive(Debug, Clone, Default)]
pub struct FeedPage {
    /// Raw entries in feed order
    pub entries: Vec<RawChatItem>,

    /// Continuation cursor for the next poll
    pub next_cursor: Option<String>,

    /// Minimum delay the upstream asks for before the next poll
    pub suggested_interval: Option<Duration>,
}
