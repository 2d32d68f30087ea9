//! Mock backend for transport integration tests.
//!
//! Serves every path with a configurable behavior and records each request
//! it receives.

use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Json, Response};
use axum::Router;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex};

/// How the mock answers a path.
#[derive(Debug, Clone)]
pub enum Behavior {
    /// 200 with this JSON body.
    Json(Value),
    /// Empty body with this status.
    Status(u16),
    /// Sleep, then 200 with this JSON body.
    Delay(Duration, Value),
    /// 200 with a body that is not JSON.
    NotJson,
}

/// A request seen by the mock.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

#[derive(Clone, Default)]
struct MockState {
    behaviors: Arc<Mutex<HashMap<String, Behavior>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// A mock HTTP backend bound to an ephemeral local port.
pub struct MockBackend {
    addr: SocketAddr,
    state: MockState,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockBackend {
    /// Start a backend where every path answers `{"success": true}`.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = MockState::default();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let router = Router::new().fallback(handle).with_state(state.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await;
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Set the behavior for a path (e.g. "/api/analysis").
    pub async fn set(&self, path: &str, behavior: Behavior) {
        self.state
            .behaviors
            .lock()
            .await
            .insert(path.to_string(), behavior);
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().await.clone()
    }

    pub async fn request_count(&self) -> usize {
        self.state.requests.lock().await.len()
    }

    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn handle(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: axum::http::HeaderMap,
    body: String,
) -> Response {
    let path = uri.path().to_string();
    state.requests.lock().await.push(RecordedRequest {
        method: method.to_string(),
        path: path.clone(),
        query: uri.query().map(str::to_string),
        content_type: headers
            .get(axum::http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });

    let behavior = state
        .behaviors
        .lock()
        .await
        .get(&path)
        .cloned()
        .unwrap_or_else(|| Behavior::Json(json!({ "success": true })));

    match behavior {
        Behavior::Json(value) => Json(value).into_response(),
        Behavior::Status(code) => StatusCode::from_u16(code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            .into_response(),
        Behavior::Delay(delay, value) => {
            tokio::time::sleep(delay).await;
            Json(value).into_response()
        }
        Behavior::NotJson => "definitely not json".into_response(),
    }
}
