//! InMemory ConnectionRegistry 実装
//!
//! HashMap<UserId, RegisteredConnection> をインメモリのテーブルとして使用します。
//! 1 つの Mutex で全体を守るので、登録・参加・離脱の各操作は互いにアトミックです。

use std::collections::HashMap;

use async_trait::async_trait;

use super::ConnectionTable;
use crate::domain::{
    Connection, ConnectionId, ConnectionRegistry, PusherChannel, RegisteredConnection,
    RegistryError, RoomId, UserId,
};

pub struct InMemoryConnectionRegistry {
    connections: ConnectionTable,
}

impl InMemoryConnectionRegistry {
    pub fn new(connections: ConnectionTable) -> Self {
        Self { connections }
    }
}

/// `connection_id` が現在の接続であるエントリだけを返す
fn active_entry<'a>(
    connections: &'a mut HashMap<UserId, RegisteredConnection>,
    user_id: &UserId,
    connection_id: &ConnectionId,
) -> Result<&'a mut RegisteredConnection, RegistryError> {
    connections
        .get_mut(user_id)
        .filter(|entry| entry.connection.id == *connection_id)
        .ok_or_else(|| RegistryError::NotConnected(user_id.to_string()))
}

#[async_trait]
impl ConnectionRegistry for InMemoryConnectionRegistry {
    async fn register(
        &self,
        connection: Connection,
        channel: PusherChannel,
    ) -> Option<RegisteredConnection> {
        let user_id = connection.user_id().clone();
        let mut connections = self.connections.lock().await;
        let replaced = connections.insert(
            user_id.clone(),
            RegisteredConnection {
                connection,
                channel,
            },
        );
        tracing::debug!(
            "Connection for '{}' registered (replaced: {})",
            user_id,
            replaced.is_some()
        );
        replaced
    }

    async fn unregister(
        &self,
        user_id: &UserId,
        connection_id: &ConnectionId,
    ) -> Option<Connection> {
        let mut connections = self.connections.lock().await;
        match connections.get(user_id) {
            Some(entry) if entry.connection.id == *connection_id => {}
            Some(_) => {
                tracing::debug!(
                    "Connection {} of '{}' was already replaced, skipping unregister",
                    connection_id,
                    user_id
                );
                return None;
            }
            None => return None,
        }
        connections.remove(user_id).map(|entry| entry.connection)
    }

    async fn get(&self, user_id: &UserId) -> Option<Connection> {
        let connections = self.connections.lock().await;
        connections.get(user_id).map(|entry| entry.connection.clone())
    }

    async fn get_active(
        &self,
        user_id: &UserId,
        connection_id: &ConnectionId,
    ) -> Option<Connection> {
        let connections = self.connections.lock().await;
        connections
            .get(user_id)
            .filter(|entry| entry.connection.id == *connection_id)
            .map(|entry| entry.connection.clone())
    }

    async fn all_connections(&self) -> Vec<Connection> {
        let connections = self.connections.lock().await;
        connections
            .values()
            .map(|entry| entry.connection.clone())
            .collect()
    }

    async fn connection_count(&self) -> usize {
        self.connections.lock().await.len()
    }

    async fn join_room(
        &self,
        user_id: &UserId,
        connection_id: &ConnectionId,
        room_id: &RoomId,
    ) -> Result<(), RegistryError> {
        let mut connections = self.connections.lock().await;
        let entry = active_entry(&mut connections, user_id, connection_id)?;
        entry.connection.join(room_id.clone())
    }

    async fn leave_room(
        &self,
        user_id: &UserId,
        connection_id: &ConnectionId,
        room_id: &RoomId,
    ) -> Result<(), RegistryError> {
        let mut connections = self.connections.lock().await;
        let entry = active_entry(&mut connections, user_id, connection_id)?;
        entry.connection.leave(room_id)
    }

    async fn members_of(&self, room_id: &RoomId) -> Vec<UserId> {
        let connections = self.connections.lock().await;
        connections
            .values()
            .filter(|entry| entry.connection.is_member(room_id))
            .map(|entry| entry.connection.user_id().clone())
            .collect()
    }

    async fn drain(&self) -> Vec<RegisteredConnection> {
        let mut connections = self.connections.lock().await;
        connections.drain().map(|(_, entry)| entry).collect()
    }
}
