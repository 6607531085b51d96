//! UseCase: ルーム参加
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//! - ルームの存在確認、参加ルーム集合への追加、他メンバーへの参加通知
//!
//! ### どのような状況を想定しているか
//! - 正常系：存在するルームへの参加
//! - 異常系：存在しないルーム、二重参加（冪等ではなくエラー）、ルーム確認の失敗

use std::sync::Arc;

use tegaki_shared::time::Clock;

use crate::domain::{
    Connection, ConnectionRegistry, RegistryError, RoomDirectory, RoomId, ServerEvent, Timestamp,
};

use super::{broadcast::RoomBroadcaster, error::JoinRoomError};

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    rooms: Arc<dyn RoomDirectory>,
    registry: Arc<dyn ConnectionRegistry>,
    broadcaster: Arc<RoomBroadcaster>,
    clock: Arc<dyn Clock>,
}

impl JoinRoomUseCase {
    pub fn new(
        rooms: Arc<dyn RoomDirectory>,
        registry: Arc<dyn ConnectionRegistry>,
        broadcaster: Arc<RoomBroadcaster>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            rooms,
            registry,
            broadcaster,
            clock,
        }
    }

    /// ルームに参加し、他のメンバーに参加を通知する
    ///
    /// `connection` がすでに新しい接続に置き換えられている場合は `NotConnected` になる。
    pub async fn execute(
        &self,
        connection: &Connection,
        room_id: &RoomId,
    ) -> Result<(), JoinRoomError> {
        let identity = &connection.identity;
        match self.rooms.room_exists(room_id).await {
            Ok(true) => {}
            Ok(false) => return Err(JoinRoomError::RoomNotFound),
            Err(e) => {
                tracing::error!("Failed to look up room '{}': {}", room_id, e);
                return Err(JoinRoomError::Lookup(e));
            }
        }

        self.registry
            .join_room(&identity.user_id, &connection.id, room_id)
            .await
            .map_err(|e| match e {
                RegistryError::AlreadyMember(_) => JoinRoomError::AlreadyMember,
                RegistryError::NotConnected(_) | RegistryError::NotMember(_) => {
                    JoinRoomError::NotConnected
                }
            })?;
        tracing::info!("'{}' joined room '{}'", identity.user_id, room_id);

        let now = Timestamp::new(self.clock.now_millis());
        let joined = ServerEvent::joined(identity, room_id, now);
        self.broadcaster
            .broadcast(&identity.user_id, room_id, &joined)
            .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{MockRoomDirectory, RepositoryError},
        infrastructure::repository::InMemoryWhiteboardStore,
        usecase::test_support::{Harness, NOW, connect, harness, identity, next_json, room},
    };
    use tegaki_shared::time::FixedClock;

    fn create_usecase(rooms: Arc<dyn RoomDirectory>, h: &Harness) -> JoinRoomUseCase {
        JoinRoomUseCase::new(
            rooms,
            h.registry.clone(),
            h.broadcaster.clone(),
            Arc::new(FixedClock::new(NOW)),
        )
    }

    #[tokio::test]
    async fn test_join_room_success_notifies_members() {
        // テスト項目: 参加すると参加ルーム集合に追加され、既存メンバーに通知される
        // given (前提条件):
        let h = harness();
        let store = Arc::new(InMemoryWhiteboardStore::with_rooms([room("abc")]));
        let (_bob, mut bob_rx) = connect(&h.registry, identity("u2", "Bob"), &["abc"]).await;
        let (alice, mut alice_rx) = connect(&h.registry, identity("u1", "Alice"), &[]).await;
        let usecase = create_usecase(store, &h);

        // when (操作):
        let result = usecase.execute(&alice, &room("abc")).await;

        // then (期待する結果):
        assert!(result.is_ok());
        let current = h.registry.get(alice.user_id()).await.unwrap();
        assert!(current.is_member(&room("abc")));
        let notification = next_json(&mut bob_rx).unwrap();
        assert_eq!(notification["type"], "notification");
        assert_eq!(notification["message"], "Alice has joined the room");
        assert_eq!(notification["user"], "Alice");
        assert_eq!(notification["timestamp"], "2023-01-01T00:00:00.000Z");
        assert!(next_json(&mut alice_rx).is_none());
    }

    #[tokio::test]
    async fn test_join_room_not_found() {
        // テスト項目: 存在しないルームへの参加は RoomNotFound になり、集合は変わらない
        // given (前提条件):
        let h = harness();
        let store = Arc::new(InMemoryWhiteboardStore::with_rooms([room("abc")]));
        let (alice, _rx) = connect(&h.registry, identity("u1", "Alice"), &[]).await;
        let usecase = create_usecase(store, &h);

        // when (操作):
        let result = usecase.execute(&alice, &room("nope")).await;

        // then (期待する結果):
        assert_eq!(result, Err(JoinRoomError::RoomNotFound));
        assert_eq!(result.unwrap_err().to_string(), "Room not found");
        let current = h.registry.get(alice.user_id()).await.unwrap();
        assert!(current.rooms.is_empty());
    }

    #[tokio::test]
    async fn test_join_room_twice_is_rejected() {
        // テスト項目: 二重参加は AlreadyMember になり、通知も発生しない
        // given (前提条件):
        let h = harness();
        let store = Arc::new(InMemoryWhiteboardStore::with_rooms([room("abc")]));
        let (alice, _alice_rx) = connect(&h.registry, identity("u1", "Alice"), &["abc"]).await;
        let (_bob, mut bob_rx) = connect(&h.registry, identity("u2", "Bob"), &["abc"]).await;
        let usecase = create_usecase(store, &h);

        // when (操作):
        let result = usecase.execute(&alice, &room("abc")).await;

        // then (期待する結果):
        assert_eq!(result, Err(JoinRoomError::AlreadyMember));
        assert_eq!(result.unwrap_err().to_string(), "Already joined this room");
        assert!(next_json(&mut bob_rx).is_none());
    }

    #[tokio::test]
    async fn test_join_room_from_replaced_connection_is_rejected() {
        // テスト項目: 置き換え済みの古い接続からの参加は NotConnected になり、新しい接続には影響しない
        // given (前提条件):
        let h = harness();
        let store = Arc::new(InMemoryWhiteboardStore::with_rooms([room("abc")]));
        let (old, _old_rx) = connect(&h.registry, identity("u1", "Alice"), &[]).await;
        let (new, _new_rx) = connect(&h.registry, identity("u1", "Alice"), &[]).await;
        let (_bob, mut bob_rx) = connect(&h.registry, identity("u2", "Bob"), &["abc"]).await;
        let usecase = create_usecase(store, &h);

        // when (操作):
        let result = usecase.execute(&old, &room("abc")).await;

        // then (期待する結果):
        assert_eq!(result, Err(JoinRoomError::NotConnected));
        let current = h.registry.get(new.user_id()).await.unwrap();
        assert_eq!(current.id, new.id);
        assert!(current.rooms.is_empty());
        assert!(next_json(&mut bob_rx).is_none());
    }

    #[tokio::test]
    async fn test_join_room_lookup_failure() {
        // テスト項目: ルームの存在確認に失敗した場合は Lookup エラーになる
        // given (前提条件):
        let h = harness();
        let mut rooms = MockRoomDirectory::new();
        rooms
            .expect_room_exists()
            .returning(|_| Err(RepositoryError::Storage("timeout".to_string())));
        let (alice, _rx) = connect(&h.registry, identity("u1", "Alice"), &[]).await;
        let usecase = create_usecase(Arc::new(rooms), &h);

        // when (操作):
        let result = usecase.execute(&alice, &room("abc")).await;

        // then (期待する結果):
        assert!(matches!(result, Err(JoinRoomError::Lookup(_))));
        assert_eq!(result.unwrap_err().to_string(), "Room lookup failed");
    }
}
