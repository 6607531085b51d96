//! Realtime whiteboard room synchronization server.
//!
//! Run with:
//! ```not_rust
//! JWT_SECRET=secret cargo run --bin tegaki-server
//! cargo run --bin tegaki-server -- --host 0.0.0.0 --port 3000 --jwt-secret secret --seed-room demo
//! ```

use std::sync::Arc;

use clap::Parser;
use tegaki_server::{
    config::ServerConfig,
    infrastructure::{auth::JwtTokenVerifier, repository::InMemoryWhiteboardStore},
    ui::{AppState, Dependencies, Server},
};
use tegaki_shared::{logger::setup_logger, time::SystemClock};

#[tokio::main]
async fn main() {
    let config = ServerConfig::parse();

    // Initialize tracing
    setup_logger("tegaki_server", env!("CARGO_BIN_NAME"), &config.log_level);

    // Initialize dependencies in order:
    // 1. Token verifier
    // 2. Room / shape store
    // 3. AppState (registry, pusher, write queue, usecases)
    // 4. Server

    // 1. Token verifier
    let token_verifier = Arc::new(JwtTokenVerifier::new(&config.jwt_secret));

    // 2. Store (in-memory)
    let store = Arc::new(InMemoryWhiteboardStore::with_rooms(config.seed_rooms.clone()));
    for room_id in &config.seed_rooms {
        tracing::info!("Room {} seeded", room_id);
    }

    // 3. AppState
    let retry_policy = config.retry_policy();
    match retry_policy.max_attempts() {
        Some(max) => tracing::info!("Shape events are dead-lettered after {} failures", max),
        None => tracing::info!("Shape events are retried without limit"),
    }
    let state = AppState::init(Dependencies {
        token_verifier,
        rooms: store.clone(),
        shapes: store,
        clock: Arc::new(SystemClock),
        retry_policy,
    });

    // 4. Run the server
    if let Err(e) = Server::new(state).run(config.host, config.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
