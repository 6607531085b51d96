//! Request handlers.

pub mod http;
pub mod websocket;

pub use http::{create_room, health_check, list_room_shapes};
pub use websocket::{dispatch_message, websocket_handler};
