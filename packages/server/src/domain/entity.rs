//! エンティティ

use std::collections::HashSet;

use super::{
    error::RegistryError,
    shape::Shape,
    value_object::{ConnectionId, DisplayName, RoomId, ShapeRecordId, Timestamp, UserId},
};

/// 認証済みのユーザー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub display_name: DisplayName,
}

impl Identity {
    pub fn new(user_id: UserId, display_name: DisplayName) -> Self {
        Self {
            user_id,
            display_name,
        }
    }
}

/// A live, authenticated connection and the rooms it has joined.
///
/// Room membership only exists here; "who is in room R" is answered by
/// scanning connections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub id: ConnectionId,
    pub identity: Identity,
    pub connected_at: Timestamp,
    pub rooms: HashSet<RoomId>,
}

impl Connection {
    /// 新しい接続を作成（参加ルームなし）
    pub fn new(identity: Identity, connected_at: Timestamp) -> Self {
        Self {
            id: ConnectionId::generate(),
            identity,
            connected_at,
            rooms: HashSet::new(),
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.identity.user_id
    }

    pub fn is_member(&self, room_id: &RoomId) -> bool {
        self.rooms.contains(room_id)
    }

    /// ルームに参加する。既に参加済みの場合はエラー（冪等ではない）
    pub fn join(&mut self, room_id: RoomId) -> Result<(), RegistryError> {
        if self.rooms.contains(&room_id) {
            return Err(RegistryError::AlreadyMember(room_id.into_string()));
        }
        self.rooms.insert(room_id);
        Ok(())
    }

    /// ルームから退出する。参加していない場合はエラー
    pub fn leave(&mut self, room_id: &RoomId) -> Result<(), RegistryError> {
        if !self.rooms.remove(room_id) {
            return Err(RegistryError::NotMember(room_id.as_str().to_string()));
        }
        Ok(())
    }
}

/// 永続化された図形
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeRecord {
    pub id: ShapeRecordId,
    pub room_id: RoomId,
    pub user_id: UserId,
    pub shape: Shape,
    pub created_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_connection() -> Connection {
        Connection::new(
            Identity::new(
                UserId::new("u1".to_string()).unwrap(),
                DisplayName::new("Alice".to_string()).unwrap(),
            ),
            Timestamp::new(1000),
        )
    }

    #[test]
    fn test_join_adds_room() {
        // テスト項目: ルームに参加すると参加ルーム集合に追加される
        // given (前提条件):
        let mut connection = create_test_connection();
        let room_id = RoomId::new("abc".to_string()).unwrap();

        // when (操作):
        let result = connection.join(room_id.clone());

        // then (期待する結果):
        assert!(result.is_ok());
        assert!(connection.is_member(&room_id));
    }

    #[test]
    fn test_join_twice_is_rejected() {
        // テスト項目: 同じルームへの二重参加はエラーになり、集合は変わらない
        // given (前提条件):
        let mut connection = create_test_connection();
        let room_id = RoomId::new("abc".to_string()).unwrap();
        connection.join(room_id.clone()).unwrap();

        // when (操作):
        let result = connection.join(room_id.clone());

        // then (期待する結果):
        assert_eq!(result, Err(RegistryError::AlreadyMember("abc".to_string())));
        assert_eq!(connection.rooms.len(), 1);
    }

    #[test]
    fn test_leave_without_membership_is_rejected() {
        // テスト項目: 参加していないルームからの退出はエラー
        // given (前提条件):
        let mut connection = create_test_connection();
        let room_id = RoomId::new("abc".to_string()).unwrap();

        // when (操作):
        let result = connection.leave(&room_id);

        // then (期待する結果):
        assert_eq!(result, Err(RegistryError::NotMember("abc".to_string())));
    }
}
