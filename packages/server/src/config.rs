//! Server configuration.

use clap::Parser;

use crate::{domain::RoomId, usecase::RetryPolicy};

#[derive(Parser, Debug, Clone)]
#[command(name = "tegaki-server")]
#[command(about = "Realtime room synchronization server for a collaborative whiteboard", long_about = None)]
pub struct ServerConfig {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "TEGAKI_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "TEGAKI_PORT", default_value = "8080")]
    pub port: u16,

    /// HMAC secret used to verify bearer tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// Persistence attempts before a shape event is dead-lettered (0 = retry forever)
    #[arg(long, env = "TEGAKI_MAX_PERSIST_ATTEMPTS", default_value = "5")]
    pub max_persist_attempts: u32,

    /// Default log level (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Room id to create at startup (repeatable)
    #[arg(long = "seed-room", value_parser = parse_room_id)]
    pub seed_rooms: Vec<RoomId>,
}

impl ServerConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_persist_attempts)
    }
}

fn parse_room_id(raw: &str) -> Result<RoomId, String> {
    RoomId::new(raw.to_string()).map_err(|e| e.to_string())
}
