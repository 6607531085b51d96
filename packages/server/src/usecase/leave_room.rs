//! UseCase: ルーム離脱

use std::sync::Arc;

use tegaki_shared::time::Clock;

use crate::domain::{Connection, ConnectionRegistry, RegistryError, RoomId, ServerEvent, Timestamp};

use super::{broadcast::RoomBroadcaster, error::LeaveRoomError};

/// ルーム離脱のユースケース
pub struct LeaveRoomUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    broadcaster: Arc<RoomBroadcaster>,
    clock: Arc<dyn Clock>,
}

impl LeaveRoomUseCase {
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

    /// ルームから離脱し、残りのメンバーに通知する
    pub async fn execute(
        &self,
        connection: &Connection,
        room_id: &RoomId,
    ) -> Result<(), LeaveRoomError> {
        let identity = &connection.identity;
        self.registry
            .leave_room(&identity.user_id, &connection.id, room_id)
            .await
            .map_err(|e| match e {
                RegistryError::NotMember(_) | RegistryError::AlreadyMember(_) => {
                    LeaveRoomError::NotMember
                }
                RegistryError::NotConnected(_) => LeaveRoomError::NotConnected,
            })?;
        tracing::info!("'{}' left room '{}'", identity.user_id, room_id);

        let now = Timestamp::new(self.clock.now_millis());
        let left = ServerEvent::left(identity, room_id, now);
        self.broadcaster
            .broadcast(&identity.user_id, room_id, &left)
            .await;
        Ok(())
    }
}
