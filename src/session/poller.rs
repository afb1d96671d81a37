//! Session poll loop
//!
//! One `Poller` runs per admitted session, as its own tokio task. Each
//! cycle fetches a page, relays every entry in feed order, adopts the
//! upstream's suggested cadence, then sleeps. All per-cycle failures are
//! absorbed here: counted, logged, retried with backoff, and the loop
//! gives up only after the configured run of consecutive failures.
//!
//! The loop is the single writer for the continuation cursor and the
//! polling interval. Cancellation is cooperative: the token is checked at
//! the top of each cycle and raced against every sleep, so a stop request
//! waits for at most one in-flight fetch.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::feed::{Credentials, FeedClient};
use crate::message::{normalize, MessageHandler};
use crate::registry::RegistryConfig;
use crate::session::state::{SessionPhase, SessionState};

pub(crate) struct Poller {
    state: Arc<SessionState>,
    client: Arc<dyn FeedClient>,
    credentials: Credentials,
    on_message: MessageHandler,
    cancel: CancellationToken,
    config: RegistryConfig,
    cursor: Option<String>,
}

impl Poller {
    pub(crate) fn new(
        state: Arc<SessionState>,
        client: Arc<dyn FeedClient>,
        credentials: Credentials,
        on_message: MessageHandler,
        cancel: CancellationToken,
        config: RegistryConfig,
    ) -> Self {
        Self {
            state,
            client,
            credentials,
            on_message,
            cancel,
            config,
            cursor: None,
        }
    }

    /// Run the poll loop until stopped or failed
    pub(crate) async fn run(mut self) {
        self.state.set_phase(SessionPhase::Running);
        tracing::info!(
            owner = %self.state.owner,
            broadcast = %self.state.broadcast_id,
            "chat session started"
        );

        loop {
            if self.cancel.is_cancelled() {
                self.state.set_phase(SessionPhase::Stopping);
                break;
            }

            let delay = match self
                .client
                .fetch_entries(
                    &self.credentials,
                    &self.state.feed_handle,
                    self.cursor.as_deref(),
                )
                .await
            {
                Ok(page) => {
                    let count = page.entries.len();

                    for item in page.entries {
                        let message = normalize(item, &self.state.owner);
                        tracing::trace!(
                            owner = %self.state.owner,
                            author = %message.author,
                            "relaying chat message"
                        );
                        (self.on_message)(message);
                    }

                    self.cursor = page.next_cursor;
                    let interval = page
                        .suggested_interval
                        .unwrap_or(self.config.default_poll_interval);
                    self.state.set_poll_interval(interval);
                    self.state.record_success();

                    if count > 0 {
                        tracing::debug!(
                            owner = %self.state.owner,
                            messages = count,
                            "chat page relayed"
                        );
                    }

                    interval
                }
                Err(err) => {
                    let failures = self.state.record_failure();

                    if failures >= self.config.error_threshold {
                        tracing::error!(
                            owner = %self.state.owner,
                            broadcast = %self.state.broadcast_id,
                            error = %err,
                            failures = failures,
                            "chat session giving up after repeated failures"
                        );
                        self.state.set_phase(SessionPhase::Failed);
                        return;
                    }

                    tracing::warn!(
                        owner = %self.state.owner,
                        error = %err,
                        failures = failures,
                        "chat poll failed, backing off"
                    );

                    self.state.poll_interval() * self.config.backoff_multiplier
                }
            };

            tokio::select! {
                _ = self.cancel.cancelled() => {
                    self.state.set_phase(SessionPhase::Stopping);
                    break;
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }

        self.state.set_phase(SessionPhase::Stopped);
        tracing::info!(owner = %self.state.owner, "chat session stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    use chrono::{TimeDelta, Utc};
    use tokio::task::JoinHandle;

    use crate::feed::mock::{test_item, test_page, MockFeedClient};
    use crate::message::ChatMessage;

    struct Harness {
        state: Arc<SessionState>,
        cancel: CancellationToken,
        handle: JoinHandle<()>,
        messages: Arc<Mutex<Vec<ChatMessage>>>,
    }

    fn spawn_poller(client: Arc<MockFeedClient>, config: RegistryConfig) -> Harness {
        let state = Arc::new(SessionState::new(
            "chan1",
            "vid42",
            "chat42",
            config.default_poll_interval,
        ));
        let cancel = CancellationToken::new();
        let messages = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&messages);
        let poller = Poller::new(
            Arc::clone(&state),
            client,
            Credentials::bearer("token", Utc::now() + TimeDelta::hours(1)),
            Arc::new(move |msg| sink.lock().unwrap().push(msg)),
            cancel.clone(),
            config,
        );

        Harness {
            state,
            cancel: cancel.clone(),
            handle: tokio::spawn(poller.run()),
            messages,
        }
    }

    async fn wait_for(mut condition: impl FnMut() -> bool) {
        for _ in 0..10_000 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        panic!("condition not reached in time");
    }

    #[tokio::test(start_paused = true)]
    async fn test_relays_entries_in_feed_order() {
        let client = Arc::new(MockFeedClient::live("chat42"));
        client.push_page(test_page(
            vec![
                test_item("alice", "first"),
                test_item("bob", "second"),
                test_item("carol", "third"),
            ],
            Some("c1"),
            Some(50),
        ));

        let harness = spawn_poller(client, RegistryConfig::default());

        wait_for(|| harness.messages.lock().unwrap().len() >= 3).await;
        harness.cancel.cancel();
        harness.handle.await.unwrap();

        let relayed: Vec<String> = harness
            .messages
            .lock()
            .unwrap()
            .iter()
            .map(|m| m.message.clone())
            .collect();
        assert_eq!(relayed, vec!["first", "second", "third"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminates_at_error_threshold() {
        let client = Arc::new(MockFeedClient::live("chat42").fail_forever());
        let config = RegistryConfig::default().default_poll_interval(Duration::from_millis(20));

        let harness = spawn_poller(Arc::clone(&client), config);
        harness.handle.await.unwrap();

        assert_eq!(client.fetch_calls(), 5);
        assert_eq!(harness.state.phase(), SessionPhase::Failed);
        assert!(!harness.state.is_active());
        assert!(harness.messages.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_resets_error_run() {
        let client = Arc::new(MockFeedClient::live("chat42"));
        // Two failures, a success, two more failures: never three in a row.
        client.push_error(crate::feed::FeedError::Transient("down".into()));
        client.push_error(crate::feed::FeedError::Transient("down".into()));
        client.push_page(test_page(vec![], Some("c1"), Some(20)));
        client.push_error(crate::feed::FeedError::Transient("down".into()));
        client.push_error(crate::feed::FeedError::Transient("down".into()));

        let config = RegistryConfig::default()
            .error_threshold(3)
            .default_poll_interval(Duration::from_millis(20));
        let harness = spawn_poller(Arc::clone(&client), config);

        // Drained queue yields clean empty pages; a cumulative counter
        // would have killed the session at the fourth failure.
        wait_for(|| client.fetch_calls() >= 6).await;
        assert_eq!(harness.state.phase(), SessionPhase::Running);
        assert_eq!(harness.state.consecutive_errors(), 0);

        harness.cancel.cancel();
        harness.handle.await.unwrap();
        assert_eq!(harness.state.phase(), SessionPhase::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_adopts_suggested_interval() {
        let client = Arc::new(MockFeedClient::live("chat42"));
        client.push_page(test_page(vec![], Some("c1"), Some(750)));

        let started = tokio::time::Instant::now();
        let harness = spawn_poller(Arc::clone(&client), RegistryConfig::default());

        wait_for(|| client.fetch_calls() >= 1).await;
        assert_eq!(harness.state.poll_interval(), Duration::from_millis(750));

        wait_for(|| client.fetch_calls() >= 2).await;
        assert!(started.elapsed() >= Duration::from_millis(750));

        harness.cancel.cancel();
        harness.handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_doubles_current_interval() {
        let client = Arc::new(MockFeedClient::live("chat42"));
        client.push_page(test_page(vec![], Some("c1"), Some(100)));
        client.push_error(crate::feed::FeedError::RateLimited);
        client.push_error(crate::feed::FeedError::RateLimited);

        let started = tokio::time::Instant::now();
        let harness = spawn_poller(Arc::clone(&client), RegistryConfig::default());

        // Cycle 1 sleeps 100ms, cycle 2 fails and backs off 200ms more.
        wait_for(|| client.fetch_calls() >= 3).await;
        assert!(started.elapsed() >= Duration::from_millis(300));
        // The failure path never compounds the stored interval.
        assert_eq!(harness.state.poll_interval(), Duration::from_millis(100));

        harness.cancel.cancel();
        harness.handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_cooperative_stop_interrupts_sleep() {
        let client = Arc::new(MockFeedClient::live("chat42"));
        client.push_page(test_page(vec![], Some("c1"), Some(60_000)));

        let harness = spawn_poller(Arc::clone(&client), RegistryConfig::default());

        wait_for(|| client.fetch_calls() >= 1).await;
        harness.cancel.cancel();

        // Exit must not wait out the minute-long interval.
        tokio::time::timeout(Duration::from_secs(2), harness.handle)
            .await
            .expect("loop did not exit promptly")
            .unwrap();

        assert_eq!(client.fetch_calls(), 1);
        assert_eq!(harness.state.phase(), SessionPhase::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cursor_advances_between_cycles() {
        let client = Arc::new(MockFeedClient::live("chat42"));
        client.push_page(test_page(vec![test_item("alice", "hi")], Some("c1"), Some(20)));
        client.push_page(test_page(vec![], Some("c2"), Some(20)));

        let harness = spawn_poller(Arc::clone(&client), RegistryConfig::default());

        wait_for(|| client.fetch_calls() >= 3).await;
        harness.cancel.cancel();
        harness.handle.await.unwrap();

        let cursors = client.cursors();
        assert_eq!(cursors[0], None);
        assert_eq!(cursors[1].as_deref(), Some("c1"));
        assert_eq!(cursors[2].as_deref(), Some("c2"));
    }
}
