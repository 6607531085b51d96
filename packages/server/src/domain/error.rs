//! Domain error types.

use thiserror::Error;

/// 値オブジェクトの生成エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("{0} must not be empty")]
    Empty(&'static str),
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
}

/// Authentication failure.
///
/// Every variant is reported to the client the same way (close code 1008),
/// so the distinction only shows up in server logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("missing token")]
    MissingToken,
    #[error("invalid token: {0}")]
    InvalidToken(String),
}

/// 外部ストレージ（Room / Shape）へのアクセスエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("room not found: {0}")]
    RoomNotFound(String),
    #[error("shape not found: {0}")]
    ShapeNotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("storage error: {0}")]
    Storage(String),
}

/// Connection Registry の操作エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("connection not found: {0}")]
    NotConnected(String),
    #[error("already a member of room {0}")]
    AlreadyMember(String),
    #[error("not a member of room {0}")]
    NotMember(String),
}

/// メッセージ送信エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("client not found: {0}")]
    ClientNotFound(String),
    #[error("connection replaced: {0}")]
    ConnectionReplaced(String),
    #[error("push queue full: {0}")]
    QueueFull(String),
    #[error("push failed: {0}")]
    PushFailed(String),
}
