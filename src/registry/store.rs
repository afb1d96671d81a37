//! Session registry implementation
//!
//! The single authority over which ingestion sessions exist. Enforces the
//! one-session-per-owner rule and the global concurrency cap, and is the
//! only component that creates, looks up, or removes sessions.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::sync::Mutex as StdMutex;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::config::RegistryConfig;
use super::error::StartError;
use crate::feed::{Credentials, FeedClient};
use crate::message::MessageHandler;
use crate::session::poller::Poller;
use crate::session::state::SessionState;
use crate::stats::{RegistryStats, SessionStats};

type SessionTable = Arc<RwLock<HashMap<String, Arc<SessionEntry>>>>;

/// One registry table entry
///
/// The session id disambiguates generations: a stale task that outlives a
/// stop request can never remove a successor entry for the same owner.
struct SessionEntry {
    session_id: u64,
    state: Arc<SessionState>,
    cancel: CancellationToken,
    join: StdMutex<Option<JoinHandle<()>>>,
}

/// Central registry for all ingestion sessions
///
/// Thread-safe via `RwLock`; stats reads stay concurrent while admissions
/// are serialized through a dedicated lock so the capacity check and the
/// insert are atomic without holding the table across a network call.
pub struct SessionRegistry {
    sessions: SessionTable,
    admission: Mutex<()>,
    client: Arc<dyn FeedClient>,
    config: RegistryConfig,
    next_session_id: AtomicU64,
}

impl SessionRegistry {
    /// Create a registry with default configuration
    pub fn new(client: Arc<dyn FeedClient>) -> Self {
        Self::with_config(client, RegistryConfig::default())
    }

    /// Create a registry with custom configuration
    pub fn with_config(client: Arc<dyn FeedClient>, config: RegistryConfig) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            admission: Mutex::new(()),
            client,
            config,
            next_session_id: AtomicU64::new(1),
        }
    }

    /// Get the registry configuration
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Start an ingestion session for `owner` on `broadcast_id`
    ///
    /// Rejects a duplicate owner, rejects at the concurrency cap (hard
    /// admission control, nothing is queued), resolves the broadcast, then
    /// inserts the session and launches its poll loop as a tokio task.
    /// `on_message` is invoked once per normalized message, in feed order,
    /// for the session's lifetime.
    pub async fn start_session(
        &self,
        owner: &str,
        broadcast_id: &str,
        credentials: Credentials,
        on_message: MessageHandler,
    ) -> Result<(), StartError> {
        let _admit = self.admission.lock().await;

        {
            let sessions = self.sessions.read().await;

            if sessions.contains_key(owner) {
                return Err(StartError::AlreadyActive {
                    owner: owner.to_string(),
                });
            }

            if sessions.len() >= self.config.max_sessions {
                tracing::warn!(
                    owner = owner,
                    limit = self.config.max_sessions,
                    "session rejected: capacity reached"
                );
                return Err(StartError::AtCapacity {
                    limit: self.config.max_sessions,
                });
            }
        }

        let handle = self
            .client
            .resolve_broadcast(&credentials, broadcast_id)
            .await?
            .ok_or_else(|| {
                tracing::info!(
                    owner = owner,
                    broadcast = broadcast_id,
                    "session rejected: broadcast not live"
                );
                StartError::BroadcastNotLive {
                    broadcast_id: broadcast_id.to_string(),
                }
            })?;

        let session_id = self.next_session_id.fetch_add(1, Ordering::Relaxed);
        let state = Arc::new(SessionState::new(
            owner,
            broadcast_id,
            &handle.feed_handle,
            self.config.default_poll_interval,
        ));
        let cancel = CancellationToken::new();

        let entry = Arc::new(SessionEntry {
            session_id,
            state: Arc::clone(&state),
            cancel: cancel.clone(),
            join: StdMutex::new(None),
        });

        self.sessions
            .write()
            .await
            .insert(owner.to_string(), Arc::clone(&entry));

        tracing::info!(
            owner = owner,
            broadcast = broadcast_id,
            channel = %handle.channel_name,
            viewers = ?handle.viewer_count,
            session_id = session_id,
            "chat session admitted"
        );

        let poller = Poller::new(
            state,
            Arc::clone(&self.client),
            credentials,
            on_message,
            cancel,
            self.config.clone(),
        );

        let sessions = Arc::clone(&self.sessions);
        let owner_key = owner.to_string();
        let join = tokio::spawn(async move {
            poller.run().await;
            remove_entry(&sessions, &owner_key, session_id).await;
        });

        *entry.join.lock().unwrap() = Some(join);

        Ok(())
    }

    /// Stop the session for `owner`, if one exists
    ///
    /// Idempotent. Signals the loop to stop and waits for it to exit; only
    /// once the entry is gone can a new session claim the owner slot, so a
    /// start racing this stop sees `AlreadyActive` until the old loop has
    /// fully exited.
    pub async fn stop_session(&self, owner: &str) {
        let entry = {
            let sessions = self.sessions.read().await;
            sessions.get(owner).cloned()
        };

        let Some(entry) = entry else {
            return;
        };

        tracing::info!(
            owner = owner,
            session_id = entry.session_id,
            "stopping chat session"
        );

        entry.cancel.cancel();

        let join = entry.join.lock().unwrap().take();
        if let Some(join) = join {
            if let Err(err) = join.await {
                tracing::error!(owner = owner, error = %err, "chat session task aborted");
            }
        }
    }

    /// Get a point-in-time snapshot for `owner`
    ///
    /// Reads only atomically-updated fields; never blocks the poll loop.
    pub async fn get_stats(&self, owner: &str) -> Option<SessionStats> {
        let sessions = self.sessions.read().await;
        sessions.get(owner).map(|entry| entry.state.snapshot())
    }

    /// Snapshot all current sessions
    pub async fn list_all(&self) -> Vec<SessionStats> {
        let sessions = self.sessions.read().await;
        sessions
            .values()
            .map(|entry| entry.state.snapshot())
            .collect()
    }

    /// Registry-wide aggregate
    pub async fn stats(&self) -> RegistryStats {
        RegistryStats {
            active_sessions: self.sessions.read().await.len(),
            max_sessions: self.config.max_sessions,
        }
    }

    /// Number of sessions currently in the table
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Remove an entry once its loop has exited
///
/// Keyed by session id so only the generation that exited is removed.
async fn remove_entry(sessions: &SessionTable, owner: &str, session_id: u64) {
    let mut sessions = sessions.write().await;

    if sessions
        .get(owner)
        .is_some_and(|entry| entry.session_id == session_id)
    {
        sessions.remove(owner);
        tracing::debug!(
            owner = owner,
            session_id = session_id,
            "session entry removed"
        );
    }
}
