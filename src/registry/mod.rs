//! Session registry for chat ingestion
//!
//! The registry is the concurrency core: it maps each owner to at most one
//! active session, enforces the global cap on concurrently active
//! sessions, and is the only component that starts, stops, or observes
//! them.
//!
//! # Architecture
//!
//! ```text
//!                        SessionRegistry
//!                 ┌──────────────────────────┐
//!                 │ sessions: HashMap<Owner, │
//!                 │   SessionEntry {         │
//!                 │     state (atomics),     │
//!                 │     cancel token,        │
//!                 │   }                      │
//!                 │ >   cap: max_sessions    │
//!                 └────────────┬─────────────┘
//!                              │ one tokio task per session
//!          ┌───────────────────┼───────────────────┐
//!          ▼                   ▼                   ▼
//!     [Poll loop]         [Poll loop]         [Poll loop]
//!     fetch_entries()     fetch_entries()     fetch_entries()
//!          │                   │                   │
//!          └──► on_message(ChatMessage) ──► subscriber fan-out (caller)
//! ```
//!
//! Admissions are serialized so the capacity check and the table insert
//! are atomic; a start request can never race another past the cap. Each
//! poll loop owns its cursor and cadence outright and publishes observable
//! fields through atomics, so `get_stats`/`list_all` never contend with
//! polling.

pub mod config;
pub mod error;
pub mod store;

pub use config::RegistryConfig;
pub use error::StartError;
pub use store::SessionRegistry;
