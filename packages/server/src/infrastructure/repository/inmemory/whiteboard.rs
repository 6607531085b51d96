//! InMemory Whiteboard Store 実装
//!
//! ドメイン層が定義する RoomDirectory / ShapeRepository trait の具体的な実装。
//! ルームと図形を HashMap / Vec に保持します。
//!
//! 図形は挿入順に保持されるので、`find_shape` は最も古い一致を返します。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tegaki_shared::time::{Clock, SystemClock};
use tokio::sync::Mutex;

use crate::domain::{
    RepositoryError, RoomDirectory, RoomId, Shape, ShapeRecord, ShapeRecordId, ShapeRepository,
    Timestamp, UserId,
};

/// ルーム情報
#[derive(Debug, Clone)]
struct RoomEntry {
    slug: String,
    admin: Option<UserId>,
}

/// インメモリの Room / Shape ストア
pub struct InMemoryWhiteboardStore {
    rooms: Mutex<HashMap<RoomId, RoomEntry>>,
    shapes: Mutex<Vec<ShapeRecord>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryWhiteboardStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            shapes: Mutex::new(Vec::new()),
            clock,
        }
    }

    /// 既知のルーム ID を登録済みの状態で作成（起動時のシード用）
    pub fn with_rooms(rooms: impl IntoIterator<Item = RoomId>) -> Self {
        let rooms = rooms
            .into_iter()
            .map(|room_id| {
                let entry = RoomEntry {
                    slug: room_id.to_string(),
                    admin: None,
                };
                (room_id, entry)
            })
            .collect();
        Self {
            rooms: Mutex::new(rooms),
            shapes: Mutex::new(Vec::new()),
            clock: Arc::new(SystemClock),
        }
    }

    /// ルームの作成者（シードされたルームは None）
    pub async fn room_admin(&self, room_id: &RoomId) -> Option<UserId> {
        let rooms = self.rooms.lock().await;
        rooms.get(room_id).and_then(|entry| entry.admin.clone())
    }

    /// 保持している図形の総数
    pub async fn shape_count(&self) -> usize {
        self.shapes.lock().await.len()
    }
}

#[async_trait]
impl RoomDirectory for InMemoryWhiteboardStore {
    async fn room_exists(&self, room_id: &RoomId) -> Result<bool, RepositoryError> {
        Ok(self.rooms.lock().await.contains_key(room_id))
    }

    async fn create_room(&self, slug: &str, admin: &UserId) -> Result<RoomId, RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        if rooms.values().any(|entry| entry.slug == slug) {
            return Err(RepositoryError::Conflict(slug.to_string()));
        }

        let room_id = RoomId::generate();
        rooms.insert(
            room_id.clone(),
            RoomEntry {
                slug: slug.to_string(),
                admin: Some(admin.clone()),
            },
        );
        tracing::info!("Room '{}' ({}) created by '{}'", slug, room_id, admin);
        Ok(room_id)
    }
}

#[async_trait]
impl ShapeRepository for InMemoryWhiteboardStore {
    async fn create_shape(
        &self,
        room_id: &RoomId,
        user_id: &UserId,
        shape: &Shape,
    ) -> Result<ShapeRecordId, RepositoryError> {
        if !self.room_exists(room_id).await? {
            return Err(RepositoryError::RoomNotFound(room_id.to_string()));
        }

        let record = ShapeRecord {
            id: ShapeRecordId::generate(),
            room_id: room_id.clone(),
            user_id: user_id.clone(),
            shape: shape.clone(),
            created_at: Timestamp::new(self.clock.now_millis()),
        };
        let id = record.id;
        self.shapes.lock().await.push(record);
        Ok(id)
    }

    async fn find_shape(
        &self,
        room_id: &RoomId,
        shape: &Shape,
    ) -> Result<Option<ShapeRecordId>, RepositoryError> {
        let shapes = self.shapes.lock().await;
        Ok(shapes
            .iter()
            .find(|record| record.room_id == *room_id && record.shape.matches_geometry(shape))
            .map(|record| record.id))
    }

    async fn delete_shape(&self, id: &ShapeRecordId) -> Result<(), RepositoryError> {
        let mut shapes = self.shapes.lock().await;
        let position = shapes
            .iter()
            .position(|record| record.id == *id)
            .ok_or_else(|| RepositoryError::ShapeNotFound(id.to_string()))?;
        shapes.remove(position);
        Ok(())
    }

    async fn list_shapes(&self, room_id: &RoomId) -> Result<Vec<ShapeRecord>, RepositoryError> {
        let shapes = self.shapes.lock().await;
        Ok(shapes
            .iter()
            .filter(|record| record.room_id == *room_id)
            .cloned()
            .collect())
    }
}
