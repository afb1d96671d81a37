//! Normalized chat messages
//!
//! Raw feed items become [`ChatMessage`] values the moment they are polled:
//! stamped with the owning session's owner id, tagged with the source
//! platform, and handed straight to the relay callback. The library never
//! stores them.

use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::feed::RawChatItem;

/// Platform tag stamped on every message this library produces
pub const PLATFORM: &str = "youtube";

/// Overlay palette for per-author display colors
const AUTHOR_COLORS: &[&str] = &[
    "#e91e63", "#9c27b0", "#3f51b5", "#2196f3", "#00bcd4", "#009688",
    "#4caf50", "#ff9800", "#ff5722", "#795548",
];

/// Callback invoked once per normalized message, in feed order
pub type MessageHandler = Arc<dyn Fn(ChatMessage) + Send + Sync>;

/// One normalized chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Generated unique id
    pub id: String,

    /// Owner id of the session that produced this message
    pub owner: String,

    /// Author display name
    pub author: String,

    /// Message text
    pub message: String,

    /// Publish instant reported by the platform
    pub published_at: DateTime<Utc>,

    /// Source platform tag
    pub platform: String,

    /// Author metadata for overlay rendering
    pub metadata: MessageMetadata,
}

/// Author metadata carried alongside each message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageMetadata {
    /// Platform channel id of the author
    pub author_channel_id: String,

    /// Whether the author moderates this chat
    pub is_moderator: bool,

    /// Stable display color derived from the author id
    pub color: String,
}

/// Normalize one raw feed item into a relayable message
pub fn normalize(item: RawChatItem, owner: &str) -> ChatMessage {
    let color = author_color(&item.author_channel_id);

    ChatMessage {
        id: Uuid::new_v4().to_string(),
        owner: owner.to_string(),
        author: item.author,
        message: item.text,
        published_at: item.published_at,
        platform: PLATFORM.to_string(),
        metadata: MessageMetadata {
            author_channel_id: item.author_channel_id,
            is_moderator: item.is_moderator,
            color,
        },
    }
}

/// Pick a stable palette color for an author
fn author_color(author_channel_id: &str) -> String {
    let mut hasher = DefaultHasher::new();
    author_channel_id.hash(&mut hasher);
    let idx = (hasher.finish() % AUTHOR_COLORS.len() as u64) as usize;
    AUTHOR_COLORS[idx].to_string()
}
