//! Realtime room synchronization engine for a collaborative whiteboard.
//!
//! Authenticated clients join rooms over WebSocket, draw and delete shapes,
//! and see each other's changes immediately. Shape mutations are persisted
//! through a per-room ordered write queue behind the broadcast.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
