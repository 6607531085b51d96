//! WebSocket connection handlers.
//!
//! 接続ごとの状態遷移: `Connecting → Authenticated → Closed`
//!
//! - 接続確立時にトークンを 1 度だけ検証する。失敗したら 1008 でクローズする
//! - 受信したメッセージは `dispatch_message` で種類ごとに振り分ける
//! - トランスポートが閉じたら Registry から外し、参加していたルームに離脱を通知する

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade, close_code},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::{
    domain::{Connection, PushFrame, ServerEvent, push_channel},
    infrastructure::dto::websocket::ClientRequest,
    ui::state::AppState,
    usecase::ProtocolError,
};

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub token: Option<String>,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, query.token))
}

/// Spawns a task that forwards frames from the connection's push channel to the WebSocket.
///
/// A `PushFrame::Close` sends a close frame and ends the task.
fn pusher_loop(
    mut rx: mpsc::Receiver<PushFrame>,
    mut sender: SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            match frame {
                PushFrame::Text(payload) => {
                    if sender.send(Message::Text(payload.into())).await.is_err() {
                        break;
                    }
                }
                PushFrame::Close { code, reason } => {
                    let frame = CloseFrame {
                        code,
                        reason: reason.into(),
                    };
                    if let Err(e) = sender.send(Message::Close(Some(frame))).await {
                        tracing::debug!("Failed to send close frame: {}", e);
                    }
                    break;
                }
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, token: Option<String>) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, rx) = push_channel();

    // Connecting → Authenticated
    let connection = match state
        .connect_participant_usecase
        .execute(token.as_deref(), tx)
        .await
    {
        Ok(connection) => connection,
        Err(e) => {
            tracing::warn!("Rejecting connection: {:?}", e);
            let frame = CloseFrame {
                code: close_code::POLICY,
                reason: e.to_string().into(),
            };
            if let Err(e) = sender.send(Message::Close(Some(frame))).await {
                tracing::debug!("Failed to send close frame: {}", e);
            }
            return;
        }
    };
    let mut send_task = pusher_loop(rx, sender);

    let recv_state = state.clone();
    let recv_connection = connection.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error from '{}': {}", recv_connection.user_id(), e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    if let Some(reply) =
                        dispatch_message(&recv_state, &recv_connection, text.as_str()).await
                    {
                        send_reply(&recv_state, &recv_connection, &reply).await;
                    }
                }
                Message::Binary(_) => {
                    let error = ProtocolError::Malformed("binary frame".to_string());
                    let reply = ServerEvent::error(error.to_string(), recv_state.now());
                    send_reply(&recv_state, &recv_connection, &reply).await;
                }
                Message::Close(_) => {
                    tracing::info!("'{}' requested close", recv_connection.user_id());
                    break;
                }
                // Ping/pong is handled automatically by the WebSocket protocol
                _ => {}
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    // Authenticated → Closed
    if let Err(e) = state
        .disconnect_participant_usecase
        .execute(connection.user_id(), &connection.id)
        .await
    {
        tracing::debug!("Skipping disconnect cleanup: {}", e);
    }
}

/// 返信は送信元の接続にだけ届ける。置き換え済みの接続への返信は破棄される
async fn send_reply(state: &AppState, connection: &Connection, reply: &ServerEvent) {
    if let Err(e) = state
        .message_pusher
        .push_to(connection.user_id(), &connection.id, reply)
        .await
    {
        tracing::warn!("Failed to reply to '{}': {}", connection.user_id(), e);
    }
}

/// 受信したテキストメッセージを処理し、送信者への返信を返す
///
/// `draw` / `delete` が受け付けられた場合は返信しない（他のメンバーへの配信が応答になる）。
pub async fn dispatch_message(
    state: &AppState,
    connection: &Connection,
    text: &str,
) -> Option<ServerEvent> {
    let user_id = connection.user_id();
    let request = match ClientRequest::parse(text) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!("Invalid message from '{}': {:?}", user_id, e);
            return Some(ServerEvent::error(e.to_string(), state.now()));
        }
    };

    let result = match request {
        ClientRequest::Join { room_id } => state
            .join_room_usecase
            .execute(connection, &room_id)
            .await
            .map(|()| Some(format!("Joined room {}", room_id)))
            .map_err(|e| e.to_string()),
        ClientRequest::Leave { room_id } => state
            .leave_room_usecase
            .execute(connection, &room_id)
            .await
            .map(|()| Some(format!("Left room {}", room_id)))
            .map_err(|e| e.to_string()),
        ClientRequest::Draw {
            room_id,
            shape,
            shape_data,
        } => state
            .draw_shape_usecase
            .execute(connection, room_id, shape, shape_data)
            .await
            .map(|()| None)
            .map_err(|e| e.to_string()),
        ClientRequest::Delete {
            room_id,
            shape,
            shape_data,
        } => state
            .delete_shape_usecase
            .execute(connection, room_id, shape, shape_data)
            .await
            .map(|()| None)
            .map_err(|e| e.to_string()),
    };

    match result {
        Ok(success) => success.map(|message| ServerEvent::success(message, state.now())),
        Err(message) => {
            tracing::warn!("Rejected request from '{}': {}", user_id, message);
            Some(ServerEvent::error(message, state.now()))
        }
    }
}
