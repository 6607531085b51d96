//! Broadcast Engine
//!
//! ルームのメンバー（送信者を除く）にイベントを配信します。
//! 配信は at-most-once で、受信確認は行いません。

use std::sync::Arc;

use crate::domain::{ConnectionRegistry, MessagePusher, RoomId, ServerEvent, UserId};

/// ルーム単位のブロードキャスト
pub struct RoomBroadcaster {
    registry: Arc<dyn ConnectionRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl RoomBroadcaster {
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// `room_id` のメンバーのうち `sender` 以外にイベントを配信する
    ///
    /// # Returns
    ///
    /// 配信対象になったユーザー（送信に失敗した相手も含む）
    pub async fn broadcast(
        &self,
        sender: &UserId,
        room_id: &RoomId,
        event: &ServerEvent,
    ) -> Vec<UserId> {
        let targets: Vec<UserId> = self
            .registry
            .members_of(room_id)
            .await
            .into_iter()
            .filter(|user_id| user_id != sender)
            .collect();

        if targets.is_empty() {
            tracing::debug!("No peers in room '{}' to broadcast to", room_id);
            return targets;
        }

        if let Err(e) = self
            .message_pusher
            .broadcast(targets.clone(), event)
            .await
        {
            tracing::warn!("Broadcast to room '{}' failed: {}", room_id, e);
        }

        targets
    }
}
