//! Session and registry statistics

pub mod metrics;

pub use metrics::{RegistryStats, SessionStats};
