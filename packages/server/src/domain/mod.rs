//! ドメイン層
//!
//! 値オブジェクト、エンティティ、図形モデル、そしてユースケース層が依存する
//! ポート（trait）を定義します。具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

pub mod entity;
pub mod error;
pub mod event;
pub mod message_pusher;
pub mod registry;
pub mod repository;
pub mod shape;
pub mod token_verifier;
pub mod value_object;

pub use entity::{Connection, Identity, ShapeRecord};
pub use error::{
    AuthError, MessagePushError, RegistryError, RepositoryError, ValueObjectError,
};
pub use event::{ServerEvent, ShapeAction, ShapeEvent};
pub use message_pusher::{
    MessagePusher, PUSH_CHANNEL_CAPACITY, PushFrame, PusherChannel, push_channel,
};
pub use registry::{ConnectionRegistry, RegisteredConnection};
pub use repository::{RoomDirectory, ShapeRepository};
pub use shape::{
    DiamondData, EllipseData, LineData, PenData, Point, RectangleData, Shape, ShapeKind,
    StrokeStyle, TextData,
};
pub use token_verifier::TokenVerifier;

#[cfg(test)]
pub use repository::{MockRoomDirectory, MockShapeRepository};
#[cfg(test)]
pub use token_verifier::MockTokenVerifier;
pub use value_object::{ConnectionId, DisplayName, RoomId, ShapeRecordId, Timestamp, UserId};
