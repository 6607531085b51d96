//! UseCase: 参加者接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectParticipantUseCase::execute() メソッド
//! - トークン検証、Registry への登録、接続確立の通知
//!
//! ### なぜこのテストが必要か
//! - 認証は接続確立時に 1 度だけ行われるため、ここで不正な接続を確実に止める必要がある
//! - 同じ identity の再接続で古い接続が置き換えられ、参加していたルームに離脱が通知されることを保証する
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規接続
//! - 異常系：トークンなし、不正なトークン
//! - エッジケース：同じ identity での再接続（置き換え）

use std::sync::Arc;

use tegaki_shared::time::Clock;

use crate::domain::{
    AuthError, Connection, ConnectionRegistry, MessagePusher, PushFrame, PusherChannel,
    RegisteredConnection, ServerEvent, Timestamp, TokenVerifier,
};

use super::{broadcast::RoomBroadcaster, error::ConnectError};

/// 置き換えられた接続に送るクローズコード
pub const REPLACED_CLOSE_CODE: u16 = 4000;
pub const REPLACED_CLOSE_REASON: &str = "Replaced by a newer connection";

/// 参加者接続のユースケース
pub struct ConnectParticipantUseCase {
    token_verifier: Arc<dyn TokenVerifier>,
    registry: Arc<dyn ConnectionRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
    broadcaster: Arc<RoomBroadcaster>,
    clock: Arc<dyn Clock>,
}

impl ConnectParticipantUseCase {
    /// 新しい ConnectParticipantUseCase を作成
    pub fn new(
        token_verifier: Arc<dyn TokenVerifier>,
        registry: Arc<dyn ConnectionRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        broadcaster: Arc<RoomBroadcaster>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            token_verifier,
            registry,
            message_pusher,
            broadcaster,
            clock,
        }
    }

    /// 参加者接続を実行
    ///
    /// # Arguments
    ///
    /// * `raw_token` - 接続時のクエリパラメータで渡されたトークン
    /// * `channel` - クライアントへのメッセージ送信用チャンネル
    ///
    /// # Returns
    ///
    /// * `Ok(Connection)` - 認証済みの接続
    /// * `Err(ConnectError)` - 認証失敗（トランスポートはクローズされるべき）
    pub async fn execute(
        &self,
        raw_token: Option<&str>,
        channel: PusherChannel,
    ) -> Result<Connection, ConnectError> {
        // 1. トークン検証
        let raw_token = raw_token.ok_or(AuthError::MissingToken)?;
        let identity = self.token_verifier.verify(raw_token)?;

        // 2. Registry に登録（同じ identity の古い接続は置き換えられる）
        let connection = Connection::new(identity, Timestamp::new(self.clock.now_millis()));
        if let Some(replaced) = self.registry.register(connection.clone(), channel).await {
            self.retire(replaced).await;
        }
        tracing::info!(
            "'{}' connected (connection {})",
            connection.user_id(),
            connection.id
        );

        // 3. 接続確立を通知
        let established = ServerEvent::success("Connection established", self.now());
        if let Err(e) = self
            .message_pusher
            .push_to(connection.user_id(), &connection.id, &established)
            .await
        {
            tracing::warn!("Failed to acknowledge connection: {}", e);
        }

        Ok(connection)
    }

    /// 置き換えられた接続をクローズし、参加していたルームに離脱を通知する
    async fn retire(&self, replaced: RegisteredConnection) {
        let RegisteredConnection {
            connection,
            channel,
        } = replaced;
        tracing::info!(
            "Connection {} of '{}' replaced by a newer connection",
            connection.id,
            connection.user_id()
        );

        let close = PushFrame::Close {
            code: REPLACED_CLOSE_CODE,
            reason: REPLACED_CLOSE_REASON.to_string(),
        };
        // 満杯でも送信側がここで drop されるので、送信ループはキューを吐き出した後に終了する
        if let Err(e) = channel.try_send(close) {
            tracing::debug!(
                "Close frame for replaced connection {} dropped: {}",
                connection.id,
                e
            );
        }

        for room_id in &connection.rooms {
            let left = ServerEvent::left(&connection.identity, room_id, self.now());
            self.broadcaster
                .broadcast(connection.user_id(), room_id, &left)
                .await;
        }
    }

    fn now(&self) -> Timestamp {
        Timestamp::new(self.clock.now_millis())
    }
}
