//! UseCase: 参加者切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectParticipantUseCase::execute() メソッド
//! - Registry からの登録解除と、参加していた全ルームへの離脱通知
//!
//! ### なぜこのテストが必要か
//! - 切断後もメンバーとして残ると、以降のブロードキャストが無駄に積まれ続ける
//! - 置き換え済みの古い接続の切断処理が新しい接続を消さないことを保証する
//!
//! ### どのような状況を想定しているか
//! - 正常系：複数ルームに参加した接続の切断
//! - エッジケース：置き換え済みの接続の切断（何もしない）

use std::sync::Arc;

use tegaki_shared::time::Clock;

use crate::domain::{ConnectionId, ConnectionRegistry, RoomId, ServerEvent, Timestamp, UserId};

use super::{broadcast::RoomBroadcaster, error::DisconnectError};

/// 参加者切断のユースケース
pub struct DisconnectParticipantUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    broadcaster: Arc<RoomBroadcaster>,
    clock: Arc<dyn Clock>,
}

impl DisconnectParticipantUseCase {
    /// 新しい DisconnectParticipantUseCase を作成
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        broadcaster: Arc<RoomBroadcaster>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            broadcaster,
            clock,
        }
    }

    /// 参加者切断を実行
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<RoomId>)` - 離脱を通知したルーム
    /// * `Err(DisconnectError)` - 接続が登録されていない（既に置き換えられた場合を含む）
    pub async fn execute(
        &self,
        user_id: &UserId,
        connection_id: &ConnectionId,
    ) -> Result<Vec<RoomId>, DisconnectError> {
        let connection = self
            .registry
            .unregister(user_id, connection_id)
            .await
            .ok_or_else(|| DisconnectError::NotConnected(connection_id.to_string()))?;

        let rooms: Vec<RoomId> = connection.rooms.iter().cloned().collect();
        for room_id in &rooms {
            let left = ServerEvent::left(
                &connection.identity,
                room_id,
                Timestamp::new(self.clock.now_millis()),
            );
            self.broadcaster.broadcast(user_id, room_id, &left).await;
        }

        tracing::info!(
            "'{}' disconnected (connection {}, {} room(s) notified)",
            user_id,
            connection_id,
            rooms.len()
        );
        Ok(rooms)
    }
}
