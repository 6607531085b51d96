//! WebSocket message DTOs.
//!
//! Inbound frames are decoded in two steps: first into the loose
//! [`InboundMessage`] envelope, then into a typed [`ClientRequest`] once the
//! `shapeData` payload has been checked against its declared `shapeType`.

use serde::{Deserialize, Serialize};

use crate::domain::{RoomId, Shape, ShapeKind};

/// Inbound message types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InboundMessageType {
    Join,
    Leave,
    Draw,
    Delete,
}

/// Raw inbound envelope (client → server)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundMessage {
    pub r#type: InboundMessageType,
    pub room_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape_type: Option<ShapeKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape_data: Option<serde_json::Value>,
}

/// A validated client request.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientRequest {
    Join {
        room_id: RoomId,
    },
    Leave {
        room_id: RoomId,
    },
    Draw {
        room_id: RoomId,
        shape: Shape,
        shape_data: serde_json::Value,
    },
    Delete {
        room_id: RoomId,
        shape: Shape,
        shape_data: serde_json::Value,
    },
}

/// Outbound message (server → client)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum OutboundMessage {
    Success {
        message: String,
        timestamp: String,
    },
    Error {
        message: String,
        timestamp: String,
    },
    Notification {
        message: String,
        user: String,
        room_id: String,
        timestamp: String,
    },
    Draw {
        user: String,
        room_id: String,
        shape_type: ShapeKind,
        shape_data: serde_json::Value,
        timestamp: String,
    },
    Delete {
        user: String,
        room_id: String,
        shape_type: ShapeKind,
        shape_data: serde_json::Value,
        timestamp: String,
    },
}
