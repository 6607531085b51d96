//! UseCase テスト用の共通フィクスチャ

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::{
    domain::{
        Connection, ConnectionRegistry, DisplayName, Identity, PushFrame, RoomId, Timestamp,
        UserId, push_channel,
    },
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        registry::{InMemoryConnectionRegistry, new_connection_table},
    },
};

use super::broadcast::RoomBroadcaster;

pub(crate) const NOW: i64 = 1672531200000;

/// 接続テーブルを共有する Registry / Pusher / Broadcaster
pub(crate) struct Harness {
    pub registry: Arc<InMemoryConnectionRegistry>,
    pub pusher: Arc<WebSocketMessagePusher>,
    pub broadcaster: Arc<RoomBroadcaster>,
}

pub(crate) fn harness() -> Harness {
    let table = new_connection_table();
    let registry = Arc::new(InMemoryConnectionRegistry::new(table.clone()));
    let pusher = Arc::new(WebSocketMessagePusher::new(table));
    let broadcaster = Arc::new(RoomBroadcaster::new(registry.clone(), pusher.clone()));
    Harness {
        registry,
        pusher,
        broadcaster,
    }
}

pub(crate) fn identity(user_id: &str, name: &str) -> Identity {
    Identity::new(
        UserId::new(user_id.to_string()).unwrap(),
        DisplayName::new(name.to_string()).unwrap(),
    )
}

pub(crate) fn room(id: &str) -> RoomId {
    RoomId::new(id.to_string()).unwrap()
}

/// 接続を登録し、指定したルームに参加させる
pub(crate) async fn connect(
    registry: &InMemoryConnectionRegistry,
    identity: Identity,
    rooms: &[&str],
) -> (Connection, mpsc::Receiver<PushFrame>) {
    let (tx, rx) = push_channel();
    let connection = Connection::new(identity, Timestamp::new(NOW));
    registry.register(connection.clone(), tx).await;
    for id in rooms {
        registry
            .join_room(connection.user_id(), &connection.id, &room(id))
            .await
            .unwrap();
    }
    (connection, rx)
}

/// 受信済みの次のテキストフレームを JSON として取り出す
pub(crate) fn next_json(rx: &mut mpsc::Receiver<PushFrame>) -> Option<serde_json::Value> {
    match rx.try_recv().ok()? {
        PushFrame::Text(payload) => serde_json::from_str(&payload).ok(),
        PushFrame::Close { code, reason } => {
            Some(serde_json::json!({"close": code, "reason": reason}))
        }
    }
}
