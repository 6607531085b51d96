//! Server state and lifecycle.

use std::sync::Arc;

use axum::extract::ws::close_code;
use tegaki_shared::time::Clock;

use crate::{
    domain::{
        ConnectionRegistry, MessagePusher, PushFrame, RoomDirectory, ShapeRepository, Timestamp,
        TokenVerifier,
    },
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        registry::{InMemoryConnectionRegistry, new_connection_table},
    },
    usecase::{
        ConnectParticipantUseCase, CreateRoomUseCase, DeleteShapeUseCase,
        DisconnectParticipantUseCase, DrawShapeUseCase, JoinRoomUseCase, LeaveRoomUseCase,
        ListShapesUseCase, RetryPolicy, RoomBroadcaster, ShapeWriteQueue,
    },
};

pub const SHUTDOWN_CLOSE_REASON: &str = "Server shutting down";

/// 外部コラボレーター
pub struct Dependencies {
    pub token_verifier: Arc<dyn TokenVerifier>,
    pub rooms: Arc<dyn RoomDirectory>,
    pub shapes: Arc<dyn ShapeRepository>,
    pub clock: Arc<dyn Clock>,
    pub retry_policy: RetryPolicy,
}

/// Shared application state
///
/// Registry と write queue はプロセスに 1 つだけ存在し、`init` で明示的に構築される。
pub struct AppState {
    pub connect_participant_usecase: Arc<ConnectParticipantUseCase>,
    pub disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    pub leave_room_usecase: Arc<LeaveRoomUseCase>,
    pub draw_shape_usecase: Arc<DrawShapeUseCase>,
    pub delete_shape_usecase: Arc<DeleteShapeUseCase>,
    pub create_room_usecase: Arc<CreateRoomUseCase>,
    pub list_shapes_usecase: Arc<ListShapesUseCase>,
    /// Registry（接続と参加ルームの管理）
    pub registry: Arc<dyn ConnectionRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    pub message_pusher: Arc<dyn MessagePusher>,
    pub write_queue: Arc<ShapeWriteQueue>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// 依存関係を組み立てる
    pub fn init(deps: Dependencies) -> Arc<Self> {
        let Dependencies {
            token_verifier,
            rooms,
            shapes,
            clock,
            retry_policy,
        } = deps;

        let connections = new_connection_table();
        let registry: Arc<dyn ConnectionRegistry> =
            Arc::new(InMemoryConnectionRegistry::new(connections.clone()));
        let message_pusher: Arc<dyn MessagePusher> =
            Arc::new(WebSocketMessagePusher::new(connections));
        let broadcaster = Arc::new(RoomBroadcaster::new(
            registry.clone(),
            message_pusher.clone(),
        ));
        let write_queue = Arc::new(ShapeWriteQueue::new(
            shapes.clone(),
            broadcaster.clone(),
            retry_policy,
        ));

        Arc::new(Self {
            connect_participant_usecase: Arc::new(ConnectParticipantUseCase::new(
                token_verifier.clone(),
                registry.clone(),
                message_pusher.clone(),
                broadcaster.clone(),
                clock.clone(),
            )),
            disconnect_participant_usecase: Arc::new(DisconnectParticipantUseCase::new(
                registry.clone(),
                broadcaster.clone(),
                clock.clone(),
            )),
            join_room_usecase: Arc::new(JoinRoomUseCase::new(
                rooms.clone(),
                registry.clone(),
                broadcaster.clone(),
                clock.clone(),
            )),
            leave_room_usecase: Arc::new(LeaveRoomUseCase::new(
                registry.clone(),
                broadcaster.clone(),
                clock.clone(),
            )),
            draw_shape_usecase: Arc::new(DrawShapeUseCase::new(
                registry.clone(),
                broadcaster,
                write_queue.clone(),
                clock.clone(),
            )),
            delete_shape_usecase: Arc::new(DeleteShapeUseCase::new(
                registry.clone(),
                write_queue.clone(),
                clock.clone(),
            )),
            create_room_usecase: Arc::new(CreateRoomUseCase::new(token_verifier, rooms.clone())),
            list_shapes_usecase: Arc::new(ListShapesUseCase::new(rooms, shapes)),
            registry,
            message_pusher,
            write_queue,
            clock,
        })
    }

    pub fn now(&self) -> Timestamp {
        Timestamp::new(self.clock.now_millis())
    }

    /// 全ての接続をクローズし、未永続化のイベントを報告する
    pub async fn shutdown(&self) {
        let connections = self.registry.drain().await;
        tracing::info!("Closing {} connection(s)", connections.len());
        for entry in connections {
            let close = PushFrame::Close {
                code: close_code::AWAY,
                reason: SHUTDOWN_CLOSE_REASON.to_string(),
            };
            if let Err(e) = entry.channel.try_send(close) {
                tracing::debug!(
                    "Close frame for connection {} dropped: {}",
                    entry.connection.id,
                    e
                );
            }
        }

        for (room_id, pending) in self.write_queue.pending_rooms().await {
            tracing::warn!(
                "{} shape event(s) of room '{}' were not persisted before shutdown",
                pending,
                room_id
            );
        }
    }
}
