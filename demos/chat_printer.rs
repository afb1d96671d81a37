//! Minimal ingestion demo: start one session and print relayed messages.
//!
//! ```sh
//! YOUTUBE_ACCESS_TOKEN=ya29... YOUTUBE_BROADCAST_ID=dQw4w9WgXcQ \
//!     cargo run --example chat_printer
//! ```

use std::sync::Arc;

use chrono::{TimeDelta, Utc};
use livechat_rs::{Credentials, SessionRegistry, YouTubeFeedClient};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let token = std::env::var("YOUTUBE_ACCESS_TOKEN")?;
    let broadcast_id = std::env::var("YOUTUBE_BROADCAST_ID")?;

    let client = Arc::new(YouTubeFeedClient::new()?);
    let registry = SessionRegistry::new(client);

    let credentials = Credentials::bearer(token, Utc::now() + TimeDelta::hours(1));
    registry
        .start_session(
            "demo",
            &broadcast_id,
            credentials,
            Arc::new(|msg| {
                println!(
                    "[{}] {}{}: {}",
                    msg.published_at.format("%H:%M:%S"),
                    msg.author,
                    if msg.metadata.is_moderator { " (mod)" } else { "" },
                    msg.message
                );
            }),
        )
        .await?;

    println!("Relaying live chat for {broadcast_id}; ctrl-c to stop.");
    tokio::signal::ctrl_c().await?;

    registry.stop_session("demo").await;
    Ok(())
}
