//! UseCase: 図形の描画
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DrawShapeUseCase::execute() メソッド
//! - メンバー確認、他メンバーへの即時配信、書き込みキューへの投入
//!
//! ### なぜこのテストが必要か
//! - 配信は永続化を待たずに行われる（楽観的ブロードキャスト）ため、
//!   永続化が失敗しても配信済みであることを保証する
//! - 非メンバーの描画が配信も永続化もされないことを保証する

use std::sync::Arc;

use tegaki_shared::time::Clock;

use crate::domain::{
    Connection, ConnectionRegistry, RoomId, ServerEvent, Shape, ShapeAction, ShapeEvent, Timestamp,
};

use super::{broadcast::RoomBroadcaster, error::ShapeCommandError, write_queue::ShapeWriteQueue};

/// 図形描画のユースケース
pub struct DrawShapeUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    broadcaster: Arc<RoomBroadcaster>,
    write_queue: Arc<ShapeWriteQueue>,
    clock: Arc<dyn Clock>,
}

impl DrawShapeUseCase {
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        broadcaster: Arc<RoomBroadcaster>,
        write_queue: Arc<ShapeWriteQueue>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            broadcaster,
            write_queue,
            clock,
        }
    }

    /// 図形を他のメンバーに配信し、永続化のためにキューに積む
    ///
    /// # Arguments
    ///
    /// * `shape_data` - クライアントが送ったペイロード。そのまま他のメンバーに転送される
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
            return Err(ShapeCommandError::NotAuthorizedToDraw);
        }

        let event = ShapeEvent {
            action: ShapeAction::Draw,
            user_id: user_id.clone(),
            room_id,
            shape,
            shape_data,
            timestamp: Timestamp::new(self.clock.now_millis()),
        };
        tracing::debug!(
            "'{}' drew {} in room '{}'",
            user_id,
            event.kind(),
            event.room_id
        );

        self.broadcaster
            .broadcast(user_id, &event.room_id, &ServerEvent::Shape(event.clone()))
            .await;
        self.write_queue.enqueue(event).await;
        Ok(())
    }
}
