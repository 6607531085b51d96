//! UI 層
//!
//! axum のルーター、WebSocket / HTTP ハンドラー、アプリケーション状態を提供します。

pub mod handler;
pub mod server;
pub mod signal;
pub mod state;

pub use server::Server;
pub use state::{AppState, Dependencies};
