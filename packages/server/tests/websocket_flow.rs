//! End-to-end tests: a real axum server on an ephemeral port driven by
//! WebSocket clients.

use std::{sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value, json};
use tegaki_server::{
    domain::{RoomId, ShapeRepository},
    infrastructure::{
        auth::{Claims, JwtTokenVerifier},
        repository::InMemoryWhiteboardStore,
    },
    ui::{AppState, Dependencies, Server},
    usecase::RetryPolicy,
};
use tegaki_shared::time::SystemClock;
use tokio::net::TcpStream;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{Message, protocol::frame::coding::CloseCode},
};

const SECRET: &str = "integration-secret";

type Ws = WebSocketStream<MaybeTlsStream<TcpStream>>;

struct TestServer {
    addr: std::net::SocketAddr,
    store: Arc<InMemoryWhiteboardStore>,
    state: Arc<AppState>,
}

async fn start_server() -> TestServer {
    let store = Arc::new(InMemoryWhiteboardStore::with_rooms([
        RoomId::new("abc".to_string()).unwrap(),
        RoomId::new("def".to_string()).unwrap(),
    ]));
    let state = AppState::init(Dependencies {
        token_verifier: Arc::new(JwtTokenVerifier::new(SECRET)),
        rooms: store.clone(),
        shapes: store.clone(),
        clock: Arc::new(SystemClock),
        retry_policy: RetryPolicy::default(),
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Server::router(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer { addr, store, state }
}

fn token(user_id: &str, name: &str) -> String {
    let claims = Claims {
        user_id: user_id.to_string(),
        name: Some(name.to_string()),
        exp: None,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

async fn open(server: &TestServer, query: &str) -> Ws {
    let url = format!("ws://{}/?{}", server.addr, query);
    let (ws, _response) = connect_async(url).await.unwrap();
    ws
}

/// 接続して "Connection established" を受け取る
async fn connect(server: &TestServer, user_id: &str, name: &str) -> Ws {
    let mut ws = open(server, &format!("token={}", token(user_id, name))).await;
    let ack = recv_json(&mut ws).await;
    assert_eq!(ack["type"], "success");
    assert_eq!(ack["message"], "Connection established");
    ws
}

async fn next_message(ws: &mut Ws, wait: Duration) -> Option<Message> {
    loop {
        let msg = tokio::time::timeout(wait, ws.next()).await.ok()??.ok()?;
        match msg {
            Message::Ping(_) | Message::Pong(_) => continue,
            other => return Some(other),
        }
    }
}

async fn recv_json(ws: &mut Ws) -> Value {
    match next_message(ws, Duration::from_secs(2)).await {
        Some(Message::Text(text)) => serde_json::from_str(text.as_str()).unwrap(),
        other => panic!("expected a text message, got {:?}", other),
    }
}

async fn assert_silent(ws: &mut Ws) {
    if let Some(msg) = next_message(ws, Duration::from_millis(200)).await {
        panic!("expected no message, got {:?}", msg);
    }
}

async fn send(ws: &mut Ws, value: Value) {
    ws.send(Message::Text(value.to_string().into())).await.unwrap();
}

async fn join(ws: &mut Ws, room: &str) -> Value {
    send(ws, json!({"type": "join", "roomId": room})).await;
    recv_json(ws).await
}

async fn expect_close(ws: &mut Ws) -> (u16, String) {
    match next_message(ws, Duration::from_secs(2)).await {
        Some(Message::Close(Some(frame))) => (u16::from(frame.code), frame.reason.as_str().to_string()),
        other => panic!("expected a close frame, got {:?}", other),
    }
}

async fn wait_for_shape_count(store: &InMemoryWhiteboardStore, expected: usize) {
    for _ in 0..200 {
        if store.shape_count().await == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!(
        "expected {} shapes, found {}",
        expected,
        store.shape_count().await
    );
}

fn rectangle() -> Value {
    json!({
        "x": 10, "y": 10, "width": 50, "height": 30,
        "color": "#fff", "strokeWidth": 2, "strokeStyle": "SOLID"
    })
}

#[tokio::test]
async fn test_draw_reaches_peer_with_identical_payload() {
    // テスト項目: U1 の描画が同じ shapeData のまま U2 に届き、U1 自身には届かない
    // given (前提条件):
    let server = start_server().await;
    let mut u2 = connect(&server, "U2", "Bob").await;
    assert_eq!(join(&mut u2, "abc").await["message"], "Joined room abc");
    let mut u1 = connect(&server, "U1", "Alice").await;
    assert_eq!(join(&mut u1, "abc").await["message"], "Joined room abc");
    let joined = recv_json(&mut u2).await;
    assert_eq!(joined["type"], "notification");
    assert_eq!(joined["message"], "Alice has joined the room");
    assert_eq!(joined["roomId"], "abc");

    // when (操作):
    send(
        &mut u1,
        json!({"type": "draw", "roomId": "abc", "shapeType": "RECTANGLE", "shapeData": rectangle()}),
    )
    .await;

    // then (期待する結果):
    let draw = recv_json(&mut u2).await;
    assert_eq!(draw["type"], "draw");
    assert_eq!(draw["user"], "U1");
    assert_eq!(draw["roomId"], "abc");
    assert_eq!(draw["shapeType"], "RECTANGLE");
    assert_eq!(draw["shapeData"], rectangle());
    assert!(draw["timestamp"].as_str().unwrap().ends_with('Z'));
    assert_silent(&mut u1).await;
    wait_for_shape_count(&server.store, 1).await;
}

#[tokio::test]
async fn test_invalid_or_missing_token_closes_connection() {
    // テスト項目: 不正なトークン・トークンなしの接続は 1008 でクローズされ、登録されない
    // given (前提条件):
    let server = start_server().await;
    let forged = encode(
        &Header::default(),
        &json!({"userId": "U1"}),
        &EncodingKey::from_secret(b"wrong-secret"),
    )
    .unwrap();

    // when (操作):
    let mut with_forged = open(&server, &format!("token={}", forged)).await;
    let mut without_token = open(&server, "").await;

    // then (期待する結果):
    let expected = (u16::from(CloseCode::Policy), "Authentication failed".to_string());
    assert_eq!(expect_close(&mut with_forged).await, expected);
    assert_eq!(expect_close(&mut without_token).await, expected);
    assert_eq!(server.state.registry.connection_count().await, 0);
}

#[tokio::test]
async fn test_membership_errors_keep_connection_open() {
    // テスト項目: 存在しないルーム・二重参加・未参加の離脱・不正なメッセージはエラーが返り、接続は維持される
    // given (前提条件):
    let server = start_server().await;
    let mut u1 = connect(&server, "U1", "Alice").await;

    // when (操作):
    let missing = join(&mut u1, "nope").await;
    let first = join(&mut u1, "abc").await;
    let twice = join(&mut u1, "abc").await;
    send(&mut u1, json!({"type": "leave", "roomId": "def"})).await;
    let not_member = recv_json(&mut u1).await;
    u1.send(Message::Text("garbage".into())).await.unwrap();
    let malformed = recv_json(&mut u1).await;
    send(&mut u1, json!({"type": "leave", "roomId": "abc"})).await;
    let left = recv_json(&mut u1).await;

    // then (期待する結果):
    assert_eq!(missing["type"], "error");
    assert_eq!(missing["message"], "Room not found");
    assert_eq!(first["message"], "Joined room abc");
    assert_eq!(twice["type"], "error");
    assert_eq!(twice["message"], "Already joined this room");
    assert_eq!(not_member["message"], "Not joined in this room");
    assert_eq!(malformed["message"], "Invalid message format");
    assert_eq!(left["type"], "success");
    assert_eq!(left["message"], "Left room abc");
}

#[tokio::test]
async fn test_non_member_draw_is_rejected() {
    // テスト項目: 参加していないルームへの描画はエラーになり、メンバーにも届かず永続化もされない
    // given (前提条件):
    let server = start_server().await;
    let mut member = connect(&server, "U2", "Bob").await;
    join(&mut member, "abc").await;
    let mut outsider = connect(&server, "U1", "Alice").await;

    // when (操作):
    send(
        &mut outsider,
        json!({"type": "draw", "roomId": "abc", "shapeType": "RECTANGLE", "shapeData": rectangle()}),
    )
    .await;

    // then (期待する結果):
    let reply = recv_json(&mut outsider).await;
    assert_eq!(reply["type"], "error");
    assert_eq!(reply["message"], "Not authorized to draw in this room");
    assert_silent(&mut member).await;
    assert_eq!(server.store.shape_count().await, 0);
}

#[tokio::test]
async fn test_delete_removes_persisted_shape_and_notifies_peers() {
    // テスト項目: 永続化済みの図形を削除すると、他のメンバーに delete が届く
    // given (前提条件):
    let server = start_server().await;
    let mut u1 = connect(&server, "U1", "Alice").await;
    join(&mut u1, "abc").await;
    let mut u2 = connect(&server, "U2", "Bob").await;
    join(&mut u2, "abc").await;
    recv_json(&mut u1).await; // Bob has joined
    send(
        &mut u1,
        json!({"type": "draw", "roomId": "abc", "shapeType": "RECTANGLE", "shapeData": rectangle()}),
    )
    .await;
    recv_json(&mut u2).await; // draw
    wait_for_shape_count(&server.store, 1).await;

    // when (操作):
    let mut restyled = rectangle();
    restyled["color"] = json!("#123456");
    send(
        &mut u1,
        json!({"type": "delete", "roomId": "abc", "shapeType": "RECTANGLE", "shapeData": restyled}),
    )
    .await;

    // then (期待する結果):
    let delete = recv_json(&mut u2).await;
    assert_eq!(delete["type"], "delete");
    assert_eq!(delete["user"], "U1");
    assert_eq!(delete["shapeData"], restyled);
    wait_for_shape_count(&server.store, 0).await;
    assert_silent(&mut u1).await;
}

#[tokio::test]
async fn test_disconnect_notifies_rooms() {
    // テスト項目: 切断すると参加していたルームのメンバーに離脱が通知される
    // given (前提条件):
    let server = start_server().await;
    let mut u2 = connect(&server, "U2", "Bob").await;
    join(&mut u2, "abc").await;
    let mut u1 = connect(&server, "U1", "Alice").await;
    join(&mut u1, "abc").await;
    recv_json(&mut u2).await; // Alice has joined

    // when (操作):
    u1.close(None).await.unwrap();

    // then (期待する結果):
    let left = recv_json(&mut u2).await;
    assert_eq!(left["type"], "notification");
    assert_eq!(left["message"], "Alice has left the room");
    assert_eq!(left["user"], "Alice");
    let members = server
        .state
        .registry
        .members_of(&RoomId::new("abc".to_string()).unwrap())
        .await;
    assert_eq!(members.len(), 1);
}

#[tokio::test]
async fn test_reconnect_replaces_previous_connection() {
    // テスト項目: 同じユーザーが再接続すると古い接続が 4000 でクローズされ、新しい接続は使い続けられる
    // given (前提条件):
    let server = start_server().await;
    let mut old = connect(&server, "U1", "Alice").await;
    join(&mut old, "abc").await;
    let mut peer = connect(&server, "U2", "Bob").await;
    join(&mut peer, "abc").await;
    recv_json(&mut old).await; // Bob has joined

    // when (操作):
    let mut new = connect(&server, "U1", "Alice").await;

    // then (期待する結果):
    let (code, reason) = expect_close(&mut old).await;
    assert_eq!(code, 4000);
    assert_eq!(reason, "Replaced by a newer connection");
    assert_eq!(recv_json(&mut peer).await["message"], "Alice has left the room");
    assert_eq!(join(&mut new, "abc").await["message"], "Joined room abc");
    assert_eq!(server.state.registry.connection_count().await, 2);
}

#[tokio::test]
async fn test_shapes_are_persisted_in_order() {
    // テスト項目: 同じルームへの連続した描画は受け付け順に永続化される
    // given (前提条件):
    let server = start_server().await;
    let mut u1 = connect(&server, "U1", "Alice").await;
    join(&mut u1, "abc").await;

    // when (操作):
    for x in 0..20 {
        let mut data = rectangle();
        data["x"] = json!(x);
        send(
            &mut u1,
            json!({"type": "draw", "roomId": "abc", "shapeType": "RECTANGLE", "shapeData": data}),
        )
        .await;
    }

    // then (期待する結果):
    wait_for_shape_count(&server.store, 20).await;
    let records = server
        .store
        .list_shapes(&RoomId::new("abc".to_string()).unwrap())
        .await
        .unwrap();
    let xs: Vec<Value> = records
        .iter()
        .map(|record| record.shape.to_payload()["x"].clone())
        .collect();
    let expected: Vec<Value> = (0..20).map(|x| json!(x as f64)).collect();
    assert_eq!(xs, expected);
}
