//! Server execution logic.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use super::{
    handler::{create_room, health_check, list_room_shapes, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Realtime whiteboard server
///
/// # Example
///
/// ```ignore
/// let state = AppState::init(dependencies);
/// Server::new(state).run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// ルーティングを組み立てる
    pub fn router(state: Arc<AppState>) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/", get(websocket_handler))
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/rooms", post(create_room))
            .route("/api/rooms/{room_id}/shapes", get(list_room_shapes))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Run the whiteboard server
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let app = Self::router(self.state.clone());

        // Bind the server to the host and port
        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        tracing::info!("Whiteboard server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/?token=<jwt>", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal(self.state))
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
