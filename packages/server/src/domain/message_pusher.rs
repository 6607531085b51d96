//! MessagePusher trait 定義
//!
//! クライアントへのメッセージ送信（通知）のインターフェース。
//! 具体的な実装（WebSocket など）は Infrastructure 層が提供します。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{
    error::MessagePushError,
    event::ServerEvent,
    value_object::{ConnectionId, UserId},
};

/// 接続ごとの送信キューに積まれるフレーム
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushFrame {
    /// シリアライズ済みのメッセージ
    Text(String),
    /// トランスポートをクローズする
    Close { code: u16, reason: String },
}

/// 1 接続あたりの送信キューに積めるフレーム数
pub const PUSH_CHANNEL_CAPACITY: usize = 256;

/// クライアントへのメッセージ送信用チャンネル
///
/// 送信側は `try_send` で積むだけでブロックしない。キューが満杯の受信者宛てのフレームは破棄される。
pub type PusherChannel = mpsc::Sender<PushFrame>;

/// 接続ごとの送信キューを作る
pub fn push_channel() -> (PusherChannel, mpsc::Receiver<PushFrame>) {
    mpsc::channel(PUSH_CHANNEL_CAPACITY)
}

/// MessagePusher trait
///
/// Sends are fire-and-forget: a failed push to one recipient never stops
/// delivery to the others.
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 特定の接続にイベントを送信
    ///
    /// `connection_id` がすでに置き換えられている場合は送信しない。
    async fn push_to(
        &self,
        user_id: &UserId,
        connection_id: &ConnectionId,
        event: &ServerEvent,
    ) -> Result<(), MessagePushError>;

    /// 複数のクライアントにイベントをブロードキャスト（部分失敗は許容）
    async fn broadcast(
        &self,
        targets: Vec<UserId>,
        event: &ServerEvent,
    ) -> Result<(), MessagePushError>;
}
