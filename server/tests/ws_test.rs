//! Integration tests for WebSocket connection lifecycle: upgrade,
//! ping/pong, silent disconnect cleanup, and the health endpoint.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

use agrismart_server::chat::presence::RoomRegistry;
use agrismart_server::chat::router::ChatRouter;
use agrismart_server::chat::store::MessageStore;
use agrismart_server::db::DbPool;
use agrismart_server::directory::UserDirectory;
use agrismart_server::state::AppState;

/// Start the server on a random port and return (db_handle, addr).
async fn start_test_server() -> (DbPool, SocketAddr) {
    let tmp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let data_dir = tmp_dir.path().to_str().unwrap().to_string();

    let db = agrismart_server::db::init_db(&data_dir).expect("Failed to init DB");

    let router = Arc::new(ChatRouter::new(
        RoomRegistry::new(),
        MessageStore::new(db.clone()),
        UserDirectory::new(db.clone()),
    ));
    let state = AppState { router };

    let app = agrismart_server::routes::build_router(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
        let _keep = tmp_dir;
    });

    (db, addr)
}

#[tokio::test]
async fn health_endpoint_reports_healthy() {
    let (_db, addr) = start_test_server().await;

    let resp = reqwest::get(format!("http://{}/api/health", addr))
        .await
        .expect("Health request failed");
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "AgriSmart Chat API");
}

#[tokio::test]
async fn connection_stays_open_without_events() {
    let (_db, addr) = start_test_server().await;

    let ws_url = format!("ws://{}/ws", addr);
    let (ws_stream, _) = tokio_tungstenite::connect_async(&ws_url)
        .await
        .expect("Failed to connect to WebSocket");

    let (mut _write, mut read) = ws_stream.split();

    // The server sends nothing unsolicited
    let result = tokio::time::timeout(Duration::from_millis(500), read.next()).await;
    assert!(result.is_err(), "Expected no unsolicited frames");
}

#[tokio::test]
async fn client_ping_gets_pong() {
    let (_db, addr) = start_test_server().await;

    let ws_url = format!("ws://{}/ws", addr);
    let (ws_stream, _) = tokio_tungstenite::connect_async(&ws_url)
        .await
        .expect("Failed to connect");

    let (mut write, mut read) = ws_stream.split();

    write
        .send(Message::Ping(vec![42, 43, 44].into()))
        .await
        .expect("Failed to send ping");

    let msg = tokio::time::timeout(Duration::from_secs(2), read.next())
        .await
        .expect("Expected pong within timeout");

    match msg {
        Some(Ok(Message::Pong(data))) => {
            assert_eq!(data.as_ref(), &[42, 43, 44], "Pong data should match ping");
        }
        other => panic!("Expected Pong message, got: {:?}", other),
    }
}

#[tokio::test]
async fn disconnect_is_silent_and_room_keeps_working() {
    let (db, addr) = start_test_server().await;
    let user_id = {
        let conn = db.lock().unwrap();
        conn.execute(
            "INSERT INTO users (name, email) VALUES ('Meera', 'meera@example.com')",
            [],
        )
        .unwrap();
        conn.last_insert_rowid()
    };

    let ws_url = format!("ws://{}/ws", addr);

    // A joins, then drops without leaving
    {
        let (ws_stream_a, _) = tokio_tungstenite::connect_async(&ws_url)
            .await
            .expect("Failed to connect");
        let (mut write_a, mut read_a) = ws_stream_a.split();
        write_a
            .send(Message::Text(
                json!({ "event": "join", "data": { "room": "general" } })
                    .to_string()
                    .into(),
            ))
            .await
            .unwrap();
        // Own join notice
        let _ = tokio::time::timeout(Duration::from_secs(2), read_a.next())
            .await
            .expect("Expected join notice");
        write_a.send(Message::Close(None)).await.unwrap();
    }

    // B joins after A is gone
    let (ws_stream_b, _) = tokio_tungstenite::connect_async(&ws_url)
        .await
        .expect("Failed to connect");
    let (mut write_b, mut read_b) = ws_stream_b.split();
    write_b
        .send(Message::Text(
            json!({ "event": "join", "data": { "room": "general" } })
                .to_string()
                .into(),
        ))
        .await
        .unwrap();

    // B's own join notice arrives; no user_left for A's abrupt exit
    let msg = tokio::time::timeout(Duration::from_secs(2), read_b.next())
        .await
        .expect("Expected join notice")
        .unwrap()
        .unwrap();
    let event: serde_json::Value = match msg {
        Message::Text(text) => serde_json::from_str(text.as_str()).unwrap(),
        other => panic!("Expected text frame, got: {:?}", other),
    };
    assert_eq!(event["event"], "user_joined");

    // The room still delivers messages; A's dead connection is gone
    write_b
        .send(Message::Text(
            json!({
                "event": "send_message",
                "data": { "room": "general", "message": "anyone here?", "user_id": user_id }
            })
            .to_string()
            .into(),
        ))
        .await
        .unwrap();

    let msg = tokio::time::timeout(Duration::from_secs(2), read_b.next())
        .await
        .expect("Expected new_message")
        .unwrap()
        .unwrap();
    let event: serde_json::Value = match msg {
        Message::Text(text) => serde_json::from_str(text.as_str()).unwrap(),
        other => panic!("Expected text frame, got: {:?}", other),
    };
    assert_eq!(event["event"], "new_message");
    assert_eq!(event["data"]["username"], "Meera");
}
