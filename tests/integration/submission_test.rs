//! Submission endpoint and health integration tests.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;

use crate::helpers::{SUBMIT_PATH, TestApp};

const REQUIRED: &str = "user_id, notification_type, and notification_content are required";

#[tokio::test]
async fn test_submit_acknowledges_without_delivery_detail() {
    let app = TestApp::new().await;

    let res = app.submit("u1", "Your issue was resolved").await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(
        res.body,
        json!({"success": true, "data": {"message": "Notification successfully submitted"}})
    );
}

#[tokio::test]
async fn test_submit_offline_user_persists_durable_record() {
    let app = TestApp::new().await;

    let res = app.submit("u1", "Your issue was resolved").await;
    assert_eq!(res.status, StatusCode::OK);

    let record = app.durable_record("u1").expect("durable record missing");
    assert_eq!(record.len(), 1);
    let stored = &record[0];
    assert_eq!(stored["user_id"], "u1");
    assert_eq!(stored["notification_type"], "issue_update");
    assert_eq!(stored["notification_content"], "Your issue was resolved");
    assert_eq!(stored["read"], false);
    assert_eq!(stored["issue_id"], serde_json::Value::Null);
    assert!(stored["id"].as_str().unwrap().starts_with("notif_"));
    assert!(stored["timestamp"].as_str().is_some());

    assert_eq!(app.state.realtime.memory.len(&"u1".into()), 1);
}

#[tokio::test]
async fn test_submit_appends_in_order() {
    let app = TestApp::new().await;

    for content in ["first", "second", "third"] {
        assert_eq!(app.submit("u2", content).await.status, StatusCode::OK);
    }

    let contents: Vec<String> = app
        .durable_record("u2")
        .unwrap()
        .iter()
        .map(|n| n["notification_content"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(contents, vec!["first", "second", "third"]);
}

#[tokio::test]
async fn test_submit_missing_fields_is_rejected() {
    let app = TestApp::new().await;

    let bodies = [
        json!({"notification_type": "t", "notification_content": "c"}),
        json!({"user_id": "u1", "notification_content": "c"}),
        json!({"user_id": "u1", "notification_type": "t"}),
        json!({"user_id": "", "notification_type": "t", "notification_content": "c"}),
    ];

    for body in bodies {
        let res = app.request("POST", SUBMIT_PATH, Some(body.clone())).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(res.body["error"], "VALIDATION_ERROR");
        assert_eq!(res.body["message"], REQUIRED);
    }

    assert!(app.durable_record("u1").is_none());
    assert_eq!(app.state.realtime.memory.total(), 0);
}

#[tokio::test]
async fn test_submit_numeric_user_id() {
    let app = TestApp::new().await;

    let res = app
        .request(
            "POST",
            SUBMIT_PATH,
            Some(json!({
                "user_id": 42,
                "notification_type": "appointment",
                "notification_content": "Tomorrow at 10",
                "appointment_id": 7,
                "authority_id": null,
            })),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);

    // Stored under the decimal key, echoed back as a number.
    let record = app.durable_record("42").unwrap();
    assert_eq!(record[0]["user_id"], 42);
    assert_eq!(record[0]["appointment_id"], 7);
    assert_eq!(record[0]["authority_id"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_submit_invalid_json() {
    let app = TestApp::new().await;

    let req = Request::builder()
        .method("POST")
        .uri(SUBMIT_PATH)
        .header("Content-Type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let res = app.send(req).await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_health_reports_engine_stats() {
    let app = TestApp::new().await;
    app.submit("u3", "queued").await;

    let res = app.request("GET", "/api/health", None).await;

    assert_eq!(res.status, StatusCode::OK);
    let data = &res.body["data"];
    assert_eq!(data["status"], "ok");
    assert_eq!(data["database"], "in_memory");
    assert_eq!(data["realtime"]["connections"], 0);
    assert_eq!(data["realtime"]["pending_in_memory"], 1);
    assert_eq!(data["realtime"]["counters"]["notifications_queued"], 1);
}
