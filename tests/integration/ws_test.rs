//! WebSocket handshake and delivery integration tests.

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::{Value, json};

use crate::helpers::{ORPHAN_SUBJECT, TestApp, WsClient};

const QUIET: Duration = Duration::from_millis(300);

fn content_of(event: &Value) -> &str {
    assert_eq!(event["event"], "notification", "unexpected event: {event}");
    event["data"]["notification_content"].as_str().unwrap()
}

async fn wait_for_connections(app: &TestApp, expected: usize) {
    for _ in 0..100 {
        if app.state.realtime.connections.connection_count() == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("connection count never reached {expected}");
}

#[tokio::test]
async fn test_offline_submission_delivered_once_on_authenticate() {
    let app = TestApp::new().await;
    let addr = app.serve().await;

    let res = app.submit("u1", "Your issue was resolved").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(app.durable_record("u1").unwrap().len(), 1);

    let mut client = WsClient::connect(addr).await;
    client.login("user_alice", "u1").await;

    let event = client.next_event().await;
    assert_eq!(content_of(&event), "Your issue was resolved");
    assert_eq!(event["data"]["user_id"], "u1");
    assert!(client.next_event_within(QUIET).await.is_none());

    app.wait_for_empty_durable("u1").await;
    assert_eq!(app.state.realtime.memory.total(), 0);

    client.close().await;
}

#[tokio::test]
async fn test_live_user_receives_push_without_queueing() {
    let app = TestApp::new().await;
    let addr = app.serve().await;

    let mut client = WsClient::connect(addr).await;
    client.login("user_bob", "u2").await;
    assert!(client.next_event_within(QUIET).await.is_none());

    let res = app.submit("u2", "Appointment confirmed").await;
    assert_eq!(res.status, StatusCode::OK);

    let event = client.next_event().await;
    assert_eq!(content_of(&event), "Appointment confirmed");
    assert_eq!(event["data"]["read"], false);

    assert!(!app.durable_path("u2").exists());
    assert_eq!(app.state.realtime.memory.total(), 0);

    client.close().await;
}

#[tokio::test]
async fn test_identity_without_local_user_is_rejected() {
    let app = TestApp::new().await;
    let addr = app.serve().await;

    let mut client = WsClient::connect(addr).await;
    client.authenticate(ORPHAN_SUBJECT).await;

    let event = client.next_event().await;
    assert_eq!(
        event,
        json!({
            "event": "authentication_error",
            "data": {"success": false, "message": "User not found in database"}
        })
    );
    assert_eq!(app.state.realtime.registry.user_count(), 0);

    // The channel stays open and can still authenticate.
    client.login("user_alice", "u1").await;
    assert_eq!(app.state.realtime.registry.user_count(), 1);

    client.close().await;
}

#[tokio::test]
async fn test_handshake_failure_reasons() {
    let app = TestApp::new().await;
    let addr = app.serve().await;
    let mut client = WsClient::connect(addr).await;

    client
        .send_raw(r#"{"event":"authenticate","data":{}}"#)
        .await;
    assert_eq!(client.next_event().await["data"]["message"], "No token provided");

    client
        .send_raw(r#"{"event":"authenticate","data":{"token":"Bearer not-a-token"}}"#)
        .await;
    assert_eq!(client.next_event().await["data"]["message"], "Invalid token");

    // `e30` is `{}`: decodable claims without a subject.
    client
        .send_raw(r#"{"event":"authenticate","data":{"token":"e30.e30.sig"}}"#)
        .await;
    assert_eq!(client.next_event().await["data"]["message"], "Invalid token format");

    client.authenticate("user_mallory").await;
    assert_eq!(
        client.next_event().await["data"]["message"],
        "User not found in identity provider"
    );

    assert_eq!(app.state.realtime.registry.user_count(), 0);
    client.close().await;
}

#[tokio::test]
async fn test_invalid_frame_gets_error_event() {
    let app = TestApp::new().await;
    let addr = app.serve().await;
    let mut client = WsClient::connect(addr).await;

    client.send_raw("definitely not json").await;
    let event = client.next_event().await;
    assert_eq!(event["event"], "error");
    assert_eq!(event["data"]["code"], "INVALID_MESSAGE");

    // Connection survives the protocol error.
    client.login("user_alice", "u1").await;
    client.close().await;
}

#[tokio::test]
async fn test_second_channel_replaces_first() {
    let app = TestApp::new().await;
    let addr = app.serve().await;

    let mut first = WsClient::connect(addr).await;
    first.login("user_alice", "u1").await;
    let mut second = WsClient::connect(addr).await;
    second.login("user_alice", "u1").await;

    app.submit("u1", "to the newest channel").await;
    assert_eq!(content_of(&second.next_event().await), "to the newest channel");
    assert!(first.next_event_within(QUIET).await.is_none());

    // The superseded channel's disconnect must not evict the live one.
    first.close().await;
    wait_for_connections(&app, 1).await;
    assert_eq!(app.state.realtime.registry.user_count(), 1);

    app.submit("u1", "still delivered").await;
    assert_eq!(content_of(&second.next_event().await), "still delivered");
    assert!(!app.durable_path("u1").exists());

    second.close().await;
}

#[tokio::test]
async fn test_pending_notifications_drain_in_fifo_order() {
    let app = TestApp::new().await;
    let addr = app.serve().await;

    for content in ["one", "two", "three"] {
        assert_eq!(app.submit("u3", content).await.status, StatusCode::OK);
    }

    let mut client = WsClient::connect(addr).await;
    client.login("user_carol", "u3").await;

    let mut received = Vec::new();
    for _ in 0..3 {
        received.push(content_of(&client.next_event().await).to_string());
    }
    assert_eq!(received, vec!["one", "two", "three"]);
    assert!(client.next_event_within(QUIET).await.is_none());

    app.wait_for_empty_durable("u3").await;
    client.close().await;
}

#[tokio::test]
async fn test_disconnect_then_reconnect_drains_again() {
    let app = TestApp::new().await;
    let addr = app.serve().await;

    let mut client = WsClient::connect(addr).await;
    client.login("user_bob", "u2").await;
    client.close().await;
    wait_for_connections(&app, 0).await;
    assert_eq!(app.state.realtime.registry.user_count(), 0);

    app.submit("u2", "while away").await;
    assert_eq!(app.durable_record("u2").unwrap().len(), 1);

    let mut client = WsClient::connect(addr).await;
    client.login("user_bob", "u2").await;
    assert_eq!(content_of(&client.next_event().await), "while away");

    // Nothing left for a third session.
    client.close().await;
    wait_for_connections(&app, 0).await;
    let mut client = WsClient::connect(addr).await;
    client.login("user_bob", "u2").await;
    assert!(client.next_event_within(QUIET).await.is_none());
    client.close().await;
}
