//! ConnectionRegistry trait 定義
//!
//! Identity → live connection のマップ。接続ごとの参加ルーム集合も保持する。

use async_trait::async_trait;

use super::{
    entity::Connection,
    error::RegistryError,
    message_pusher::PusherChannel,
    value_object::{ConnectionId, RoomId, UserId},
};

/// A connection together with its outbound channel.
#[derive(Debug, Clone)]
pub struct RegisteredConnection {
    pub connection: Connection,
    pub channel: PusherChannel,
}

/// Connection Registry
///
/// Invariant: at most one entry per identity at any instant.
#[async_trait]
pub trait ConnectionRegistry: Send + Sync {
    /// 接続を登録する。同じ identity の既存接続は置き換えられ、それを返す
    async fn register(
        &self,
        connection: Connection,
        channel: PusherChannel,
    ) -> Option<RegisteredConnection>;

    /// 接続を登録解除する
    ///
    /// Only removes the entry if it still belongs to `connection_id`, so a
    /// replaced connection closing late cannot evict its successor.
    async fn unregister(
        &self,
        user_id: &UserId,
        connection_id: &ConnectionId,
    ) -> Option<Connection>;

    /// identity に対する現在の接続
    async fn get(&self, user_id: &UserId) -> Option<Connection>;

    /// `connection_id` がまだ現在の接続である場合のみ返す
    async fn get_active(
        &self,
        user_id: &UserId,
        connection_id: &ConnectionId,
    ) -> Option<Connection>;

    async fn all_connections(&self) -> Vec<Connection>;

    /// 接続中のクライアント数
    async fn connection_count(&self) -> usize;

    /// 参加ルーム集合に追加する
    ///
    /// Fails with `NotConnected` once `connection_id` has been replaced.
    async fn join_room(
        &self,
        user_id: &UserId,
        connection_id: &ConnectionId,
        room_id: &RoomId,
    ) -> Result<(), RegistryError>;

    /// 参加ルーム集合から削除する
    async fn leave_room(
        &self,
        user_id: &UserId,
        connection_id: &ConnectionId,
        room_id: &RoomId,
    ) -> Result<(), RegistryError>;

    /// ルームに参加している全ユーザー
    async fn members_of(&self, room_id: &RoomId) -> Vec<UserId>;

    /// 全ての接続を取り出してレジストリを空にする（シャットダウン用）
    async fn drain(&self) -> Vec<RegisteredConnection>;
}
