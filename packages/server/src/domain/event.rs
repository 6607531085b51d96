//! Events that flow through the engine: inbound shape mutations and the
//! outbound events pushed to clients.

use super::{
    entity::Identity,
    shape::{Shape, ShapeKind},
    value_object::{DisplayName, RoomId, Timestamp, UserId},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeAction {
    Draw,
    Delete,
}

/// A draw or delete request accepted from a room member.
///
/// `shape` is the validated view used for persistence and matching;
/// `shape_data` is the payload exactly as the client sent it, echoed to peers.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeEvent {
    pub action: ShapeAction,
    pub user_id: UserId,
    pub room_id: RoomId,
    pub shape: Shape,
    pub shape_data: serde_json::Value,
    pub timestamp: Timestamp,
}

impl ShapeEvent {
    pub fn kind(&self) -> ShapeKind {
        self.shape.kind()
    }
}

/// クライアントへ送信されるイベント
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    Success {
        message: String,
        timestamp: Timestamp,
    },
    Error {
        message: String,
        timestamp: Timestamp,
    },
    Notification {
        message: String,
        user: DisplayName,
        room_id: RoomId,
        timestamp: Timestamp,
    },
    Shape(ShapeEvent),
}

impl ServerEvent {
    pub fn success(message: impl Into<String>, timestamp: Timestamp) -> Self {
        ServerEvent::Success {
            message: message.into(),
            timestamp,
        }
    }

    pub fn error(message: impl Into<String>, timestamp: Timestamp) -> Self {
        ServerEvent::Error {
            message: message.into(),
            timestamp,
        }
    }

    pub fn joined(identity: &Identity, room_id: &RoomId, timestamp: Timestamp) -> Self {
        ServerEvent::Notification {
            message: format!("{} has joined the room", identity.display_name),
            user: identity.display_name.clone(),
            room_id: room_id.clone(),
            timestamp,
        }
    }

    pub fn left(identity: &Identity, room_id: &RoomId, timestamp: Timestamp) -> Self {
        ServerEvent::Notification {
            message: format!("{} has left the room", identity.display_name),
            user: identity.display_name.clone(),
            room_id: room_id.clone(),
            timestamp,
        }
    }
}
