//! HTTP routes of the companion endpoint.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::{get, post},
};
use bytes::Bytes;
use futures::Stream;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use bite_protocols::{ContentPayload, Inbound, LogLevel};

use crate::error::ServerError;
use crate::outline::{OutlineSink, render_outline};
use crate::queue::CommandQueue;

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;

/// Latest payload received on each snapshot route.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub content: Option<Value>,
    pub slice: Option<Value>,
    pub progress: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct LogBody {
    msg: String,
    #[serde(default = "default_level")]
    level: LogLevel,
}

fn default_level() -> LogLevel {
    LogLevel::Info
}

/// State shared by every handler.
pub struct ServerState {
    pub queue: CommandQueue,
    outline: OutlineSink,
    outline_keys: Vec<String>,
    snapshot: Mutex<Snapshot>,
    /// Cancelled when the server stops; parent of every stream token.
    shutdown: Mutex<CancellationToken>,
    stream: Mutex<Option<CancellationToken>>,
}

impl ServerState {
    pub fn new(outline: OutlineSink, outline_keys: Vec<String>) -> Self {
        Self {
            queue: CommandQueue::new(),
            outline,
            outline_keys,
            snapshot: Mutex::new(Snapshot::default()),
            shutdown: Mutex::new(CancellationToken::new()),
            stream: Mutex::new(None),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.lock().clone()
    }

    /// Validate and queue one push message. A bare command object is
    /// wrapped as `[command]`.
    pub fn enqueue(&self, message: Value) -> Result<usize, ServerError> {
        Inbound::from_value(message.clone())?;
        let message = match message {
            object @ Value::Object(_) => Value::Array(vec![object]),
            other => other,
        };
        Ok(self.queue.push(message))
    }

    /// Whether a push stream is attached.
    pub fn is_streaming(&self) -> bool {
        self.stream
            .lock()
            .as_ref()
            .is_some_and(|token| !token.is_cancelled())
    }

    /// End the attached push stream. Returns false when none was attached.
    pub fn close_stream(&self) -> bool {
        match self.stream.lock().take() {
            Some(token) => {
                let live = !token.is_cancelled();
                token.cancel();
                live
            }
            None => false,
        }
    }

    /// Arm a fresh shutdown token for a new run of the server.
    pub(crate) fn reset_shutdown(&self) -> CancellationToken {
        let token = CancellationToken::new();
        *self.shutdown.lock() = token.clone();
        token
    }

    /// Token for a new stream. The previous stream, if any, is ended.
    fn attach_stream(&self) -> CancellationToken {
        let token = self.shutdown.lock().child_token();
        if let Some(previous) = self.stream.lock().replace(token.clone()) {
            if !previous.is_cancelled() {
                info!("New push subscriber replaces the attached one");
            }
            previous.cancel();
        }
        token
    }
}

/// Build the router with permissive CORS and request tracing.
pub fn create_router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/", post(receive_content))
        .route("/fetch_content", post(receive_content))
        .route("/fetch_slice", post(receive_slice))
        .route("/fetch_progress", post(receive_progress))
        .route("/log", post(receive_log))
        .route("/close_sse", post(close_stream))
        .route("/close-sse", post(close_stream))
        .route("/commands", post(enqueue_command))
        .route("/sse", get(push_stream))
        .route("/state", get(current_state))
        .route("/health", get(health_check))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn ok(msg: &str) -> Response {
    Json(json!({"status": "ok", "msg": msg})).into_response()
}

fn bad_request(msg: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"status": "error", "msg": msg})),
    )
        .into_response()
}

fn parse_json(body: &Bytes) -> Result<Value, Response> {
    serde_json::from_slice(body).map_err(|e| {
        warn!("Rejected request body: {}", e);
        bad_request(format!("Invalid JSON: {}", e))
    })
}

async fn receive_content(State(state): State<Arc<ServerState>>, body: Bytes) -> Response {
    let value = match parse_json(&body) {
        Ok(value) => value,
        Err(response) => return response,
    };
    let payload: ContentPayload = match serde_json::from_value(value.clone()) {
        Ok(payload) => payload,
        Err(e) => return bad_request(format!("Invalid content: {}", e)),
    };
    info!(
        "Received content: {} section(s), callback {:?}",
        payload.entries.len(),
        payload.callback
    );
    state.snapshot.lock().content = Some(value);

    let outline = render_outline(&payload, &state.outline_keys);
    if let Err(e) = state.outline.write(&outline).await {
        error!("Failed to write outline: {}", e);
    }
    ok("content received")
}

async fn receive_slice(State(state): State<Arc<ServerState>>, body: Bytes) -> Response {
    match parse_json(&body) {
        Ok(value) => {
            debug!("Received slice: {}", value);
            state.snapshot.lock().slice = Some(value);
            ok("slice received")
        }
        Err(response) => response,
    }
}

async fn receive_progress(State(state): State<Arc<ServerState>>, body: Bytes) -> Response {
    match parse_json(&body) {
        Ok(value) => {
            debug!("Received progress: {}", value);
            state.snapshot.lock().progress = Some(value);
            ok("progress received")
        }
        Err(response) => response,
    }
}

async fn receive_log(body: Bytes) -> Response {
    let entry: LogBody = match serde_json::from_slice(&body) {
        Ok(entry) => entry,
        Err(e) => return bad_request(format!("Invalid log entry: {}", e)),
    };
    match entry.level {
        LogLevel::Info => info!(target: "bite::page", "{}", entry.msg),
        LogLevel::Error => error!(target: "bite::page", "{}", entry.msg),
    }
    ok("logged")
}

async fn close_stream(State(state): State<Arc<ServerState>>) -> Response {
    if state.close_stream() {
        info!("Push stream closed on request");
        ok("stream closed")
    } else {
        debug!("Close requested with no push stream attached");
        ok("no stream attached")
    }
}

async fn enqueue_command(State(state): State<Arc<ServerState>>, body: Bytes) -> Response {
    let value = match parse_json(&body) {
        Ok(value) => value,
        Err(response) => return response,
    };
    match state.enqueue(value) {
        Ok(queued) => Json(json!({"status": "ok", "queued": queued})).into_response(),
        Err(e) => bad_request(e.to_string()),
    }
}

async fn push_stream(
    State(state): State<Arc<ServerState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let token = state.attach_stream();
    info!("Push subscriber attached ({} queued)", state.queue.len());
    Sse::new(message_stream(state, token)).keep_alive(KeepAlive::default())
}

fn message_stream(
    state: Arc<ServerState>,
    token: CancellationToken,
) -> impl Stream<Item = Result<Event, Infallible>> {
    futures::stream::unfold((state, token), |(state, token)| async move {
        let message = tokio::select! {
            biased;
            _ = token.cancelled() => {
                debug!("Push stream ended");
                return None;
            }
            message = state.queue.pop() => message,
        };
        debug!("Push event: {}", message);
        let event = Event::default().data(message.to_string());
        Some((Ok(event), (state, token)))
    })
}

async fn current_state(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let snapshot = state.snapshot();
    Json(json!({
        "content": snapshot.content,
        "slice": snapshot.slice,
        "progress": snapshot.progress,
        "queued": state.queue.len(),
        "streaming": state.is_streaming(),
    }))
}

async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
