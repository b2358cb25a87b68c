//! Shared test helpers for integration tests.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tower::ServiceExt;

use civic_api::AppState;
use civic_core::config::{AppConfig, DirectoryProviderKind, IdentityProviderKind};

/// Identity subject → local user id known to every test app.
pub const USERS: &[(&str, &str)] = &[("user_alice", "u1"), ("user_bob", "u2"), ("user_carol", "u3")];

/// Subject known to the identity provider but absent from the local store.
pub const ORPHAN_SUBJECT: &str = "user_orphan";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state, for inspecting the engine
    pub state: AppState,
    /// Durable store directory
    pub storage_dir: PathBuf,
    _tmp: tempfile::TempDir,
}

impl TestApp {
    /// Create a new test application with in-memory collaborators.
    pub async fn new() -> Self {
        let tmp = tempfile::tempdir().expect("Failed to create temp dir");
        let storage_dir = tmp.path().join("notifications");

        let mut config = AppConfig::default();
        config.auth.identity.provider = IdentityProviderKind::Memory;
        config.auth.identity.known_subjects = USERS
            .iter()
            .map(|(subject, _)| subject.to_string())
            .chain(std::iter::once(ORPHAN_SUBJECT.to_string()))
            .collect();
        config.database.provider = DirectoryProviderKind::Memory;
        config.database.users = USERS
            .iter()
            .map(|(subject, user)| (subject.to_string(), user.to_string()))
            .collect::<HashMap<_, _>>();
        config.realtime.notifications.storage_dir = storage_dir.display().to_string();

        let state = civic_api::build_state(config)
            .await
            .expect("Failed to build state");
        let router = civic_api::build_app(state.clone());

        Self {
            router,
            state,
            storage_dir,
            _tmp: tmp,
        }
    }

    /// Path of the durable record for a user id made of safe characters.
    pub fn durable_path(&self, user_id: &str) -> PathBuf {
        self.storage_dir.join(format!("{user_id}.json"))
    }

    /// Parsed durable record, or `None` if the file does not exist.
    pub fn durable_record(&self, user_id: &str) -> Option<Vec<Value>> {
        let raw = std::fs::read_to_string(self.durable_path(user_id)).ok()?;
        Some(serde_json::from_str(&raw).expect("Durable record is not a JSON array"))
    }

    /// Waits until the durable record for `user_id` is empty or absent.
    pub async fn wait_for_empty_durable(&self, user_id: &str) {
        for _ in 0..100 {
            if self.durable_record(user_id).is_none_or(|items| items.is_empty()) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("durable record for {user_id} was never cleared");
    }

    /// Make an HTTP request to the test app
    pub async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body_str))
            .expect("Failed to build request");

        self.send(req).await
    }

    /// Send a prepared request to the test app
    pub async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// Submit a notification through the HTTP endpoint.
    pub async fn submit(&self, user_id: &str, content: &str) -> TestResponse {
        self.request(
            "POST",
            SUBMIT_PATH,
            Some(json!({
                "user_id": user_id,
                "notification_type": "issue_update",
                "notification_content": content,
            })),
        )
        .await
    }

    /// Serve the app on an ephemeral port and return its address.
    pub async fn serve(&self) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("No local addr");
        let router = self.router.clone();
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server failed");
        });
        addr
    }
}

/// Submission endpoint path.
pub const SUBMIT_PATH: &str = "/api/v2/live-notifications/submit-notification";

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

/// Unsigned session token whose claims name `subject`.
pub fn token_for(subject: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256","typ":"JWT"}"#);
    let claims = URL_SAFE_NO_PAD.encode(json!({ "sub": subject, "sid": "sess_test" }).to_string());
    format!("{header}.{claims}.signature")
}

/// WebSocket test client.
pub struct WsClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsClient {
    /// Connect to `/ws` on the served app.
    pub async fn connect(addr: SocketAddr) -> Self {
        let (stream, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws"))
            .await
            .expect("WebSocket connect failed");
        Self { stream }
    }

    /// Send a raw text frame.
    pub async fn send_raw(&mut self, text: &str) {
        self.stream
            .send(Message::Text(text.to_string().into()))
            .await
            .expect("WebSocket send failed");
    }

    /// Send an `authenticate` event with a bearer token for `subject`.
    pub async fn authenticate(&mut self, subject: &str) {
        let frame = json!({
            "event": "authenticate",
            "data": { "token": format!("Bearer {}", token_for(subject)) }
        });
        self.send_raw(&frame.to_string()).await;
    }

    /// Next event within `wait`, or `None` on timeout.
    pub async fn next_event_within(&mut self, wait: Duration) -> Option<Value> {
        loop {
            let frame = tokio::time::timeout(wait, self.stream.next()).await.ok()??;
            match frame.expect("WebSocket error") {
                Message::Text(text) => {
                    return Some(serde_json::from_str(text.as_str()).expect("Event is not JSON"));
                }
                Message::Close(_) => return None,
                _ => continue,
            }
        }
    }

    /// Next event, failing the test after two seconds.
    pub async fn next_event(&mut self) -> Value {
        self.next_event_within(Duration::from_secs(2))
            .await
            .expect("Timed out waiting for event")
    }

    /// Authenticate and assert the `authenticated` acknowledgement.
    pub async fn login(&mut self, subject: &str, expected_user: &str) {
        self.authenticate(subject).await;
        let event = self.next_event().await;
        assert_eq!(
            event,
            json!({"event": "authenticated", "data": {"success": true, "userId": expected_user}})
        );
    }

    /// Close the socket.
    pub async fn close(mut self) {
        let _ = self.stream.close(None).await;
    }
}
