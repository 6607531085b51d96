//! UseCase 層のエラー定義
//!
//! `Display` の文字列はそのままクライアントへの error メッセージになる。

use thiserror::Error;

use crate::domain::{AuthError, RepositoryError};

/// 接続確立のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error("Authentication failed")]
    Unauthenticated(#[from] AuthError),
}

/// 切断処理のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisconnectError {
    #[error("connection '{0}' is not registered")]
    NotConnected(String),
}

/// ルーム参加のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinRoomError {
    #[error("Room not found")]
    RoomNotFound,
    #[error("Already joined this room")]
    AlreadyMember,
    #[error("Not connected")]
    NotConnected,
    #[error("Room lookup failed")]
    Lookup(RepositoryError),
}

/// ルーム離脱のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LeaveRoomError {
    #[error("Not joined in this room")]
    NotMember,
    #[error("Not connected")]
    NotConnected,
}

/// 描画・削除コマンドのエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeCommandError {
    #[error("Not authorized to draw in this room")]
    NotAuthorizedToDraw,
    #[error("Not authorized to delete in this room")]
    NotAuthorizedToDelete,
}

/// ルーム作成のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreateRoomError {
    #[error("Unauthorized")]
    Unauthenticated(#[from] AuthError),
    #[error("Room name is required")]
    InvalidName,
    #[error("Room already exists")]
    AlreadyExists,
    #[error("Failed to create room")]
    Storage(RepositoryError),
}

/// 図形一覧取得のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListShapesError {
    #[error("Room not found")]
    RoomNotFound,
    #[error("Failed to load shapes")]
    Storage(RepositoryError),
}

/// 受信メッセージの解釈エラー
///
/// 詳細はログ用で、クライアントには常に同じ文言を返す。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("Invalid message format")]
    Malformed(String),
    #[error("Invalid message format")]
    MissingField(&'static str),
    #[error("Invalid message format")]
    InvalidField(String),
}
