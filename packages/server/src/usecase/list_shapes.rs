//! UseCase: ルームの図形一覧（初期ロード）

use std::sync::Arc;

use crate::domain::{RoomDirectory, RoomId, ShapeRecord, ShapeRepository};

use super::error::ListShapesError;

/// 図形一覧取得のユースケース
pub struct ListShapesUseCase {
    rooms: Arc<dyn RoomDirectory>,
    shapes: Arc<dyn ShapeRepository>,
}

impl ListShapesUseCase {
    pub fn new(rooms: Arc<dyn RoomDirectory>, shapes: Arc<dyn ShapeRepository>) -> Self {
        Self { rooms, shapes }
    }

    /// 永続化済みの図形を作成順に返す
    pub async fn execute(&self, room_id: &RoomId) -> Result<Vec<ShapeRecord>, ListShapesError> {
        let exists = self
            .rooms
            .room_exists(room_id)
            .await
            .map_err(ListShapesError::Storage)?;
        if !exists {
            return Err(ListShapesError::RoomNotFound);
        }

        self.shapes
            .list_shapes(room_id)
            .await
            .map_err(ListShapesError::Storage)
    }
}
