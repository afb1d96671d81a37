//! Scriptable feed client for tests
//!
//! Queue pages and errors, then assert on call counts. When the queue is
//! drained the mock returns empty pages, or keeps failing if
//! `fail_forever` was set.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use super::client::FeedClient;
use super::error::FeedError;
use super::types::{BroadcastHandle, Credentials, FeedPage, RawChatItem};

pub struct MockFeedClient {
    resolve: Mutex<Result<Option<BroadcastHandle>, FeedError>>,
    pages: Mutex<VecDeque<Result<FeedPage, FeedError>>>,
    fail_when_drained: AtomicBool,
    resolve_calls: AtomicU32,
    fetch_calls: AtomicU32,
    cursors: Mutex<Vec<Option<String>>>,
}

impl MockFeedClient {
    /// Mock that resolves every broadcast as live with the given feed handle
    pub fn live(feed_handle: &str) -> Self {
        Self {
            resolve: Mutex::new(Ok(Some(test_handle("mock-broadcast", feed_handle)))),
            pages: Mutex::new(VecDeque::new()),
            fail_when_drained: AtomicBool::new(false),
            resolve_calls: AtomicU32::new(0),
            fetch_calls: AtomicU32::new(0),
            cursors: Mutex::new(Vec::new()),
        }
    }

    /// Mock whose resolve reports the broadcast as not live
    pub fn not_live() -> Self {
        let mock = Self::live("unused");
        *mock.resolve.lock().unwrap() = Ok(None);
        mock
    }

    /// Mock whose resolve fails with the given error
    pub fn resolve_failure(err: FeedError) -> Self {
        let mock = Self::live("unused");
        *mock.resolve.lock().unwrap() = Err(err);
        mock
    }

    /// Queue a successful page for the next fetch
    pub fn push_page(&self, page: FeedPage) {
        self.pages.lock().unwrap().push_back(Ok(page));
    }

    /// Queue a fetch failure
    pub fn push_error(&self, err: FeedError) {
        self.pages.lock().unwrap().push_back(Err(err));
    }

    /// Fail every fetch once the queue is drained
    pub fn fail_forever(self) -> Self {
        self.fail_when_drained.store(true, Ordering::Relaxed);
        self
    }

    pub fn resolve_calls(&self) -> u32 {
        self.resolve_calls.load(Ordering::Relaxed)
    }

    pub fn fetch_calls(&self) -> u32 {
        self.fetch_calls.load(Ordering::Relaxed)
    }

    /// Cursor passed to each fetch, in call order
    pub fn cursors(&self) -> Vec<Option<String>> {
        self.cursors.lock().unwrap().clone()
    }
}

#[async_trait]
impl FeedClient for MockFeedClient {
    async fn resolve_broadcast(
        &self,
        _credentials: &Credentials,
        broadcast_id: &str,
    ) -> Result<Option<BroadcastHandle>, FeedError> {
        self.resolve_calls.fetch_add(1, Ordering::Relaxed);

        match &*self.resolve.lock().unwrap() {
            Ok(Some(handle)) => Ok(Some(BroadcastHandle {
                broadcast_id: broadcast_id.to_string(),
                ..handle.clone()
            })),
            Ok(None) => Ok(None),
            Err(err) => Err(err.clone()),
        }
    }

    async fn fetch_entries(
        &self,
        _credentials: &Credentials,
        _feed_handle: &str,
        cursor: Option<&str>,
    ) -> Result<FeedPage, FeedError> {
        self.fetch_calls.fetch_add(1, Ordering::Relaxed);
        self.cursors
            .lock()
            .unwrap()
            .push(cursor.map(str::to_string));

        if let Some(next) = self.pages.lock().unwrap().pop_front() {
            return next;
        }

        if self.fail_when_drained.load(Ordering::Relaxed) {
            Err(FeedError::Transient("mock upstream down".to_string()))
        } else {
            Ok(FeedPage::default())
        }
    }
}

/// Build a broadcast handle with placeholder metadata
pub fn test_handle(broadcast_id: &str, feed_handle: &str) -> BroadcastHandle {
    BroadcastHandle {
        broadcast_id: broadcast_id.to_string(),
        feed_handle: feed_handle.to_string(),
        title: "Test broadcast".to_string(),
        channel_name: "test_channel".to_string(),
        thumbnail_url: None,
        viewer_count: Some(1),
    }
}

/// Build a raw chat item with the given author and text
pub fn test_item(author: &str, text: &str) -> RawChatItem {
    RawChatItem {
        platform_id: format!("msg-{author}-{}", text.len()),
        author: author.to_string(),
        author_channel_id: format!("UC-{author}"),
        is_moderator: false,
        text: text.to_string(),
        published_at: Utc::now(),
    }
}

/// Build a page from items, a cursor, and a suggested interval
pub fn test_page(
    items: Vec<RawChatItem>,
    cursor: Option<&str>,
    interval_ms: Option<u64>,
) -> FeedPage {
    FeedPage {
        entries: items,
        next_cursor: cursor.map(str::to_string),
        suggested_interval: interval_ms.map(Duration::from_millis),
    }
}
