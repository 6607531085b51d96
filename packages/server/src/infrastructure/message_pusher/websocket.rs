//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - ServerEvent をワイヤー形式（JSON）にシリアライズ
//! - 接続テーブルから送信キューを引いて `PushFrame::Text` を積む
//!
//! ## 設計ノート
//!
//! WebSocket の生成と送信ループは UI 層（`ui/handler/websocket.rs`）が持ちます。
//! ここでは bounded channel に `try_send` で積むだけなので、遅い受信者が他の受信者を待たせることはありません。
//! キューが満杯の受信者宛てのフレームは破棄してログに残します。

use async_trait::async_trait;
use tokio::sync::mpsc::error::TrySendError;

use crate::{
    domain::{
        ConnectionId, MessagePushError, MessagePusher, PushFrame, PusherChannel, ServerEvent,
        UserId,
    },
    infrastructure::{dto::websocket::OutboundMessage, registry::ConnectionTable},
};

/// WebSocket を使った MessagePusher 実装
///
/// ## 使用例
///
/// ```ignore
/// let table = new_connection_table();
/// let registry = InMemoryConnectionRegistry::new(table.clone());
/// let pusher = WebSocketMessagePusher::new(table);
/// ```
pub struct WebSocketMessagePusher {
    /// Registry と共有される接続テーブル
    connections: ConnectionTable,
}

impl WebSocketMessagePusher {
    pub fn new(connections: ConnectionTable) -> Self {
        Self { connections }
    }

    fn serialize(event: &ServerEvent) -> Result<String, MessagePushError> {
        serde_json::to_string(&OutboundMessage::from(event))
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))
    }
}

/// 送信キューにフレームを積む。満杯・クローズ済みならエラー
fn enqueue_frame(
    channel: &PusherChannel,
    user_id: &UserId,
    frame: PushFrame,
) -> Result<(), MessagePushError> {
    channel.try_send(frame).map_err(|e| match e {
        TrySendError::Full(_) => MessagePushError::QueueFull(user_id.to_string()),
        TrySendError::Closed(_) => {
            MessagePushError::PushFailed(format!("{} disconnected", user_id))
        }
    })
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn push_to(
        &self,
        user_id: &UserId,
        connection_id: &ConnectionId,
        event: &ServerEvent,
    ) -> Result<(), MessagePushError> {
        let payload = Self::serialize(event)?;
        let connections = self.connections.lock().await;

        let entry = connections
            .get(user_id)
            .ok_or_else(|| MessagePushError::ClientNotFound(user_id.to_string()))?;
        if entry.connection.id != *connection_id {
            return Err(MessagePushError::ConnectionReplaced(connection_id.to_string()));
        }
        enqueue_frame(&entry.channel, user_id, PushFrame::Text(payload))?;
        tracing::debug!("Pushed message to '{}'", user_id);
        Ok(())
    }

    async fn broadcast(
        &self,
        targets: Vec<UserId>,
        event: &ServerEvent,
    ) -> Result<(), MessagePushError> {
        // 1 回だけシリアライズして全員に配る
        let payload = Self::serialize(event)?;
        let connections = self.connections.lock().await;

        for target in targets {
            let Some(entry) = connections.get(&target) else {
                tracing::warn!("Client '{}' not found during broadcast, skipping", target);
                continue;
            };
            // ブロードキャストでは一部の送信失敗を許容
            let frame = PushFrame::Text(payload.clone());
            if let Err(e) = enqueue_frame(&entry.channel, &target, frame) {
                tracing::warn!("Failed to push message to '{}': {}", target, e);
            } else {
                tracing::debug!("Broadcasted message to '{}'", target);
            }
        }

        Ok(())
    }
}
