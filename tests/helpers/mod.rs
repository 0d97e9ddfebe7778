//! Shared test helpers for integration tests.

// Each test binary uses a different subset of these helpers.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use futures::{SinkExt, StreamExt};
use http::{Request, StatusCode};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tower::ServiceExt;

use zingram_api::{AppState, build_app, build_state};
use zingram_core::config::AppConfig;
use zingram_core::types::UserId;

/// How long to wait for an expected WebSocket event.
const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// How long to wait before concluding no event is coming.
const SILENCE_WINDOW: Duration = Duration::from_millis(300);

fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = "integration-test-secret".to_string();
    config
}

/// Test application context for in-process HTTP requests
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared application state
    pub state: AppState,
}

impl TestApp {
    /// Create a new test application
    pub fn new() -> Self {
        let state = build_state(test_config());
        let router = build_app(state.clone());
        Self { router, state }
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

    /// Register an account over HTTP and return the response body
    pub async fn register(&self, name: &str, username: &str, phone: &str) -> Value {
        let response = self
            .request(
                "POST",
                "/api/register",
                Some(json!({
                    "name": name,
                    "username": username,
                    "phone": phone,
                    "password": "password123",
                })),
            )
            .await;

        assert_eq!(
            response.status,
            StatusCode::OK,
            "Registration failed: {:?}",
            response.body
        );

        response.body
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

/// A server bound to an ephemeral port for real WebSocket clients
pub struct LiveApp {
    /// The bound address
    pub addr: SocketAddr,
    /// Shared application state
    pub state: AppState,
}

/// Start a server on an ephemeral local port
pub async fn spawn_app() -> LiveApp {
    let state = build_state(test_config());
    let app = build_app(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("No local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Test server error");
    });

    LiveApp { addr, state }
}

impl LiveApp {
    /// Register a user directly against the store and issue a token for them
    pub fn seed_user(&self, name: &str, username: &str, phone: &str) -> (UserId, String) {
        let hash = self
            .state
            .password_hasher
            .hash_password("password123")
            .expect("Failed to hash password");
        let user = self
            .state
            .users
            .register(name, username, phone, hash)
            .expect("Failed to register user");
        let token = self
            .state
            .tokens
            .issue(user.id)
            .expect("Failed to issue token");
        (user.id, token)
    }
}

/// A real WebSocket client connected to a [`LiveApp`]
pub struct WsClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsClient {
    /// Connect to the app's `/ws` endpoint
    pub async fn connect(addr: SocketAddr) -> Self {
        let url = format!("ws://{}/ws", addr);
        let (stream, _) = connect_async(url).await.expect("WebSocket connect failed");
        Self { stream }
    }

    /// Send one JSON frame
    pub async fn send(&mut self, value: Value) {
        self.stream
            .send(Message::Text(value.to_string()))
            .await
            .expect("WebSocket send failed");
    }

    /// Receive the next JSON event, failing the test on timeout
    pub async fn recv(&mut self) -> Value {
        loop {
            let msg = tokio::time::timeout(RECV_TIMEOUT, self.stream.next())
                .await
                .expect("Timed out waiting for event")
                .expect("WebSocket stream ended")
                .expect("WebSocket error");

            if let Message::Text(text) = msg {
                return serde_json::from_str(&text).expect("Server sent invalid JSON");
            }
        }
    }

    /// Receive events until one with the given `type` tag arrives
    pub async fn recv_type(&mut self, event_type: &str) -> Value {
        loop {
            let event = self.recv().await;
            if event["type"] == event_type {
                return event;
            }
        }
    }

    /// Assert that no event arrives within a short window
    pub async fn assert_silent(&mut self) {
        let result = tokio::time::timeout(SILENCE_WINDOW, self.stream.next()).await;
        assert!(result.is_err(), "Expected no event, got {:?}", result);
    }

    /// Authenticate and wait for the confirmation event
    pub async fn authenticate(&mut self, token: &str) -> Value {
        self.send(json!({ "type": "authenticate", "token": token }))
            .await;
        self.recv_type("authenticated").await
    }

    /// Close the connection
    pub async fn close(mut self) {
        let _ = self.stream.close(None).await;
    }
}
