//! Repository trait 定義
//!
//! ドメイン層が必要とする外部ストレージへのインターフェースを定義します。
//! Room の存在確認と Shape の永続化は外部のコラボレーターが担い、
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{
    entity::ShapeRecord,
    error::RepositoryError,
    shape::Shape,
    value_object::{RoomId, ShapeRecordId, UserId},
};

/// Room Directory trait
///
/// Room existence is authoritative here; the engine does not cache it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomDirectory: Send + Sync {
    /// Room が存在するか
    async fn room_exists(&self, room_id: &RoomId) -> Result<bool, RepositoryError>;

    /// Room を作成
    async fn create_room(&self, slug: &str, admin: &UserId) -> Result<RoomId, RepositoryError>;
}

/// Shape Repository trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShapeRepository: Send + Sync {
    /// 図形を保存
    async fn create_shape(
        &self,
        room_id: &RoomId,
        user_id: &UserId,
        shape: &Shape,
    ) -> Result<ShapeRecordId, RepositoryError>;

    /// Find the earliest stored shape in the room whose kind and geometry match exactly.
    async fn find_shape(
        &self,
        room_id: &RoomId,
        shape: &Shape,
    ) -> Result<Option<ShapeRecordId>, RepositoryError>;

    /// 図形を削除
    async fn delete_shape(&self, id: &ShapeRecordId) -> Result<(), RepositoryError>;

    /// ルームの図形を作成順に取得（初期ロード用）
    async fn list_shapes(&self, room_id: &RoomId) -> Result<Vec<ShapeRecord>, RepositoryError>;
}
