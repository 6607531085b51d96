//! UseCase 層
//!
//! 1 つの操作につき 1 つの構造体を置き、ドメイン層の trait だけに依存します。
//! ルーム単位の配信（`RoomBroadcaster`）と永続化キュー（`ShapeWriteQueue`）もここに置きます。

pub mod broadcast;
pub mod connect_participant;
pub mod create_room;
pub mod delete_shape;
pub mod disconnect_participant;
pub mod draw_shape;
pub mod error;
pub mod join_room;
pub mod leave_room;
pub mod list_shapes;
pub mod write_queue;

#[cfg(test)]
pub(crate) mod test_support;

pub use broadcast::RoomBroadcaster;
pub use connect_participant::{
    ConnectParticipantUseCase, REPLACED_CLOSE_CODE, REPLACED_CLOSE_REASON,
};
pub use create_room::CreateRoomUseCase;
pub use delete_shape::DeleteShapeUseCase;
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use draw_shape::DrawShapeUseCase;
pub use error::{
    ConnectError, CreateRoomError, DisconnectError, JoinRoomError, LeaveRoomError,
    ListShapesError, ProtocolError, ShapeCommandError,
};
pub use join_room::JoinRoomUseCase;
pub use leave_room::LeaveRoomUseCase;
pub use list_shapes::ListShapesUseCase;
pub use write_queue::{QueuedShapeEvent, RetryPolicy, ShapeWriteQueue};
