//! UseCase: 図形の削除
//!
//! 削除は描画と違って即時には配信しない。書き込みキューが一致する図形を消せたときに
//! 初めて他のメンバーに配信される。

use std::sync::Arc;

use tegaki_shared::time::Clock;

use crate::domain::{
    Connection, ConnectionRegistry, RoomId, Shape, ShapeAction, ShapeEvent, Timestamp,
};

use super::{error::ShapeCommandError, write_queue::ShapeWriteQueue};

/// 図形削除のユースケース
pub struct DeleteShapeUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    write_queue: Arc<ShapeWriteQueue>,
    clock: Arc<dyn Clock>,
}

impl DeleteShapeUseCase {
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        write_queue: Arc<ShapeWriteQueue>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            write_queue,
            clock,
        }
    }

    /// 削除要求をキューに積む
    pub async fn execute(
        &self,
        connection: &Connection,
        room_id: RoomId,
        shape: Shape,
        shape_data: serde_json::Value,
    ) -> Result<(), ShapeCommandError> {
        let user_id = connection.user_id();
        // 置き換え済みの接続は非メンバーとして扱う
        let is_member = self
            .registry
            .get_active(user_id, &connection.id)
            .await
            .is_some_and(|current| current.is_member(&room_id));
        if !is_member {
            return Err(ShapeCommandError::NotAuthorizedToDelete);
        }

        let event = ShapeEvent {
            action: ShapeAction::Delete,
            user_id: user_id.clone(),
            room_id,
            shape,
            shape_data,
            timestamp: Timestamp::new(self.clock.now_millis()),
        };
        tracing::debug!(
            "'{}' requested delete of {} in room '{}'",
            user_id,
            event.kind(),
            event.room_id
        );
        self.write_queue.enqueue(event).await;
        Ok(())
    }
}
