//! YouTube Data API v3 feed client
//!
//! Wraps the two live-chat endpoints the session machinery needs:
//! `videos.list` to resolve a broadcast to its active live chat id, and
//! `liveChat/messages.list` to page through the chat feed. Both require an
//! OAuth2 bearer token supplied by the caller.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::Deserialize;

use super::client::FeedClient;
use super::error::FeedError;
use super::types::{BroadcastHandle, Credentials, FeedPage, RawChatItem};

const API_BASE: &str = "https://www.googleapis.com/youtube/v3";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// YouTube Data API v3 client
pub struct YouTubeFeedClient {
    http: reqwest::Client,
    api_base: String,
}

impl YouTubeFeedClient {
    /// Create a new client with a bounded per-request timeout
    pub fn new() -> Result<Self, FeedError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            api_base: API_BASE.to_string(),
        })
    }

    /// Override the API base URL
    ///
    /// Intended for pointing the client at a local stand-in server.
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    async fn get(
        &self,
        credentials: &Credentials,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<String, FeedError> {
        let url = format!("{}{}", self.api_base, path);

        let resp = self
            .http
            .get(&url)
            .bearer_auth(&credentials.access_token)
            .query(query)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(classify_status(status, &body));
        }

        Ok(body)
    }
}

#[async_trait]
impl FeedClient for YouTubeFeedClient {
    async fn resolve_broadcast(
        &self,
        credentials: &Credentials,
        broadcast_id: &str,
    ) -> Result<Option<BroadcastHandle>, FeedError> {
        let body = self
            .get(
                credentials,
                "/videos",
                &[
                    ("part", "snippet,liveStreamingDetails"),
                    ("id", broadcast_id),
                ],
            )
            .await?;

        let resp: VideoListResponse = serde_json::from_str(&body)?;
        Ok(handle_from_response(resp, broadcast_id))
    }

    async fn fetch_entries(
        &self,
        credentials: &Credentials,
        feed_handle: &str,
        cursor: Option<&str>,
    ) -> Result<FeedPage, FeedError> {
        let mut query = vec![
            ("liveChatId", feed_handle),
            ("part", "snippet,authorDetails"),
        ];
        if let Some(token) = cursor {
            query.push(("pageToken", token));
        }

        let body = self.get(credentials, "/liveChat/messages", &query).await?;

        let resp: ChatListResponse = serde_json::from_str(&body)?;
        Ok(page_from_response(resp))
    }
}

/// Map an unsuccessful HTTP status to the feed error taxonomy
///
/// YouTube reports quota exhaustion and an ended live chat both as 403, so
/// the body reason disambiguates those from a plain credential rejection.
fn classify_status(status: StatusCode, body: &str) -> FeedError {
    match status {
        StatusCode::UNAUTHORIZED => FeedError::Unauthorized,
        StatusCode::FORBIDDEN => {
            if body.contains("liveChatEnded") || body.contains("liveChatDisabled") {
                FeedError::NotFound
            } else if body.contains("quota") || body.contains("rateLimit") {
                FeedError::RateLimited
            } else {
                FeedError::Unauthorized
            }
        }
        StatusCode::NOT_FOUND => FeedError::NotFound,
        StatusCode::TOO_MANY_REQUESTS => FeedError::RateLimited,
        s if s.is_server_error() => FeedError::Transient(format!("upstream returned {s}")),
        s => FeedError::Transient(format!("unexpected status {s}")),
    }
}

fn handle_from_response(resp: VideoListResponse, broadcast_id: &str) -> Option<BroadcastHandle> {
    let video = resp.items.into_iter().next()?;
    let details = video.live_streaming_details?;
    let feed_handle = details.active_live_chat_id?;
    let snippet = video.snippet.unwrap_or_default();

    Some(BroadcastHandle {
        broadcast_id: broadcast_id.to_string(),
        feed_handle,
        title: snippet.title,
        channel_name: snippet.channel_title,
        thumbnail_url: snippet.thumbnails.and_then(|t| t.best()),
        viewer_count: details
            .concurrent_viewers
            .and_then(|v| v.parse::<u64>().ok()),
    })
}

fn page_from_response(resp: ChatListResponse) -> FeedPage {
    let entries = resp
        .items
        .into_iter()
        .map(|item| {
            let snippet = item.snippet.unwrap_or_default();
            let author = item.author_details.unwrap_or_default();

            RawChatItem {
                platform_id: item.id,
                author: author.display_name,
                author_channel_id: author.channel_id,
                is_moderator: author.is_chat_moderator,
                text: snippet.display_message,
                published_at: snippet
                    .published_at
                    .and_then(|ts| DateTime::parse_from_rfc3339(&ts).ok())
                    .map(|ts| ts.with_timezone(&Utc))
                    .unwrap_or_else(Utc::now),
            }
        })
        .collect();

    FeedPage {
        entries,
        next_cursor: resp.next_page_token,
        suggested_interval: resp.polling_interval_millis.map(Duration::from_millis),
    }
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoResource>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoResource {
    snippet: Option<VideoSnippet>,
    live_streaming_details: Option<LiveStreamingDetails>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    channel_title: String,
    thumbnails: Option<ThumbnailSet>,
}

#[derive(Debug, Deserialize)]
struct ThumbnailSet {
    #[serde(rename = "default")]
    base: Option<Thumbnail>,
    medium: Option<Thumbnail>,
    high: Option<Thumbnail>,
}

impl ThumbnailSet {
    fn best(self) -> Option<String> {
        self.high
            .or(self.medium)
            .or(self.base)
            .map(|t| t.url)
    }
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LiveStreamingDetails {
    active_live_chat_id: Option<String>,
    concurrent_viewers: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatListResponse {
    polling_interval_millis: Option<u64>,
    next_page_token: Option<String>,
    #[serde(default)]
    items: Vec<ChatMessageResource>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatMessageResource {
    #[serde(default)]
    id: String,
    snippet: Option<ChatSnippet>,
    author_details: Option<AuthorDetails>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatSnippet {
    #[serde(default)]
    display_message: String,
    published_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthorDetails {
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    channel_id: String,
    #[serde(default)]
    is_chat_moderator: bool,
}
