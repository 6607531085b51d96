//! Per-Room Durable Write Queue
//!
//! 図形イベントをルームごとの FIFO に積み、ルームごとに 1 つのタスクで順番に永続化します。
//!
//! - 同じルームのイベントは受け付け順に永続化される。ルームをまたぐ順序は保証しない
//! - 永続化に失敗したイベントは末尾に戻され、そのルームの drain は止まる。
//!   次の enqueue で drain が再開する
//! - 失敗回数が `RetryPolicy` の上限に達したイベントは dead letter に移され、drain は続行する
//! - delete は一致する図形を探してから削除し、削除できたときだけルームに配信する
//!
//! キューはプロセス内のメモリにしかないので、クラッシュ時には未永続化のイベントは失われる。

use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
};

use tokio::sync::Mutex;

use crate::domain::{
    RepositoryError, RoomId, ServerEvent, ShapeAction, ShapeEvent, ShapeRepository,
};

use super::broadcast::RoomBroadcaster;

/// 永続化のリトライ方針
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// None なら無制限にリトライする
    max_attempts: Option<u32>,
}

impl RetryPolicy {
    /// `max_attempts` 回失敗したら dead letter にする。0 は無制限
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: (max_attempts > 0).then_some(max_attempts),
        }
    }

    pub fn unbounded() -> Self {
        Self { max_attempts: None }
    }

    pub fn max_attempts(&self) -> Option<u32> {
        self.max_attempts
    }

    fn is_exhausted(&self, attempts: u32) -> bool {
        self.max_attempts.is_some_and(|max| attempts >= max)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(5)
    }
}

/// キュー上のイベントと失敗回数
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedShapeEvent {
    pub event: ShapeEvent,
    pub attempts: u32,
}

#[derive(Debug, Default)]
struct RoomQueue {
    pending: VecDeque<QueuedShapeEvent>,
    draining: bool,
    dead_letters: Vec<QueuedShapeEvent>,
}

/// ルームごとの書き込みキュー
pub struct ShapeWriteQueue {
    shapes: Arc<dyn ShapeRepository>,
    broadcaster: Arc<RoomBroadcaster>,
    policy: RetryPolicy,
    queues: Mutex<HashMap<RoomId, RoomQueue>>,
}

impl ShapeWriteQueue {
    pub fn new(
        shapes: Arc<dyn ShapeRepository>,
        broadcaster: Arc<RoomBroadcaster>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            shapes,
            broadcaster,
            policy,
            queues: Mutex::new(HashMap::new()),
        }
    }

    /// イベントをルームのキュー末尾に積み、drain 中でなければ drain タスクを起動する
    pub async fn enqueue(self: &Arc<Self>, event: ShapeEvent) {
        let room_id = event.room_id.clone();
        let start_drain = {
            let mut queues = self.queues.lock().await;
            let queue = queues.entry(room_id.clone()).or_default();
            queue.pending.push_back(QueuedShapeEvent { event, attempts: 0 });
            !std::mem::replace(&mut queue.draining, true)
        };

        if start_drain {
            tracing::debug!("Start draining write queue of room '{}'", room_id);
            let queue = Arc::clone(self);
            tokio::spawn(async move { queue.drain(room_id).await });
        }
    }

    /// キューが空になるか、永続化に失敗するまで先頭から処理する
    async fn drain(&self, room_id: RoomId) {
        while let Some(mut entry) = self.next_entry(&room_id).await {
            let Err(e) = self.persist(&entry.event).await else {
                continue;
            };

            entry.attempts += 1;
            let mut queues = self.queues.lock().await;
            let queue = queues.entry(room_id.clone()).or_default();

            if self.policy.is_exhausted(entry.attempts) {
                tracing::error!(
                    "Dropping {:?} {} event in room '{}' after {} failed attempts: {}",
                    entry.event.action,
                    entry.event.kind(),
                    room_id,
                    entry.attempts,
                    e
                );
                queue.dead_letters.push(entry);
                continue;
            }

            tracing::error!(
                "Failed to persist {:?} {} event in room '{}' (attempt {}): {}",
                entry.event.action,
                entry.event.kind(),
                room_id,
                entry.attempts,
                e
            );
            queue.pending.push_back(entry);
            queue.draining = false;
            return;
        }
    }

    /// 先頭のイベントを取り出す。空なら drain を終了する
    async fn next_entry(&self, room_id: &RoomId) -> Option<QueuedShapeEvent> {
        let mut queues = self.queues.lock().await;
        let queue = queues.get_mut(room_id)?;
        if let Some(entry) = queue.pending.pop_front() {
            return Some(entry);
        }

        queue.draining = false;
        if queue.dead_letters.is_empty() {
            queues.remove(room_id);
        }
        tracing::debug!("Write queue of room '{}' drained", room_id);
        None
    }

    async fn persist(&self, event: &ShapeEvent) -> Result<(), RepositoryError> {
        match event.action {
            ShapeAction::Draw => {
                let id = self
                    .shapes
                    .create_shape(&event.room_id, &event.user_id, &event.shape)
                    .await?;
                tracing::debug!(
                    "Persisted {} shape {} in room '{}'",
                    event.kind(),
                    id,
                    event.room_id
                );
            }
            ShapeAction::Delete => {
                let Some(id) = self.shapes.find_shape(&event.room_id, &event.shape).await? else {
                    tracing::debug!(
                        "No {} shape matched delete in room '{}'",
                        event.kind(),
                        event.room_id
                    );
                    return Ok(());
                };
                match self.shapes.delete_shape(&id).await {
                    Ok(()) => {}
                    // 他の delete と競合した場合は一致なしと同じ扱い
                    Err(RepositoryError::ShapeNotFound(_)) => return Ok(()),
                    Err(e) => return Err(e),
                }
                tracing::debug!(
                    "Deleted {} shape {} in room '{}'",
                    event.kind(),
                    id,
                    event.room_id
                );
                self.broadcaster
                    .broadcast(
                        &event.user_id,
                        &event.room_id,
                        &ServerEvent::Shape(event.clone()),
                    )
                    .await;
            }
        }
        Ok(())
    }

    /// ルームのキューに残っているイベント数（dead letter を除く）
    pub async fn pending_len(&self, room_id: &RoomId) -> usize {
        let queues = self.queues.lock().await;
        queues.get(room_id).map_or(0, |queue| queue.pending.len())
    }

    /// ルームの drain タスクが動いているか
    pub async fn is_draining(&self, room_id: &RoomId) -> bool {
        let queues = self.queues.lock().await;
        queues.get(room_id).is_some_and(|queue| queue.draining)
    }

    /// リトライ上限に達して破棄されたイベント
    pub async fn dead_letters(&self, room_id: &RoomId) -> Vec<QueuedShapeEvent> {
        let queues = self.queues.lock().await;
        queues
            .get(room_id)
            .map(|queue| queue.dead_letters.clone())
            .unwrap_or_default()
    }

    /// 未永続化のイベントが残っているルームとその件数
    pub async fn pending_rooms(&self) -> Vec<(RoomId, usize)> {
        let queues = self.queues.lock().await;
        queues
            .iter()
            .filter(|(_, queue)| !queue.pending.is_empty())
            .map(|(room_id, queue)| (room_id.clone(), queue.pending.len()))
            .collect()
    }
}
