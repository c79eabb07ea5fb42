//! JSON-RPC over server-sent events.
//!
//! `GET /mcp` opens a stream and assigns a session id, returned in the
//! `x-session-id` header and as the first `endpoint` event. Requests are then
//! posted to `POST /mcp/message` with that id (header, or `sessionId` query
//! parameter) and answered with `202 Accepted`; the JSON-RPC reply arrives on
//! the stream as a `message` event. Closing the stream ends the session.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::sse::{Event, KeepAlive};
use axum::response::{IntoResponse, Response, Sse};
use axum::Json;
use futures::{Stream, StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use uuid::Uuid;

use super::rpc;
use super::AppState;

/// Header carrying the session id in both directions.
pub const SESSION_HEADER: &str = "x-session-id";

const CHANNEL_CAPACITY: usize = 32;

/// Open SSE sessions, keyed by id.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, mpsc::Sender<Value>>>,
}

impl SessionRegistry {
    /// Registers a new session.
    pub fn open(self: &Arc<Self>) -> (SessionGuard, mpsc::Receiver<Value>) {
        let id = Uuid::new_v4().to_string();
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        self.lock().insert(id.clone(), tx);
        tracing::info!(session = %id, "SSE session opened");
        (
            SessionGuard {
                id,
                registry: Arc::clone(self),
            },
            rx,
        )
    }

    /// The sender for a session, if it is still open.
    #[must_use]
    pub fn sender(&self, id: &str) -> Option<mpsc::Sender<Value>> {
        self.lock().get(id).cloned()
    }

    /// Number of open sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True when no session is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn remove(&self, id: &str) {
        self.lock().remove(id);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, mpsc::Sender<Value>>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Removes its session from the registry when dropped.
#[derive(Debug)]
pub struct SessionGuard {
    id: String,
    registry: Arc<SessionRegistry>,
}

impl SessionGuard {
    /// The session id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.registry.remove(&self.id);
        tracing::info!(session = %self.id, "SSE session closed");
    }
}

/// Turns a session's receiver into the event stream, holding the guard for
/// as long as the stream lives.
fn event_stream(
    guard: SessionGuard,
    rx: mpsc::Receiver<Value>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    let endpoint = Event::default()
        .event("endpoint")
        .data(format!("/mcp/message?sessionId={}", guard.id()));

    let messages = futures::stream::unfold((rx, guard), |(mut rx, guard)| async move {
        let value = rx.recv().await?;
        let event = Event::default().event("message").data(value.to_string());
        Some((event, (rx, guard)))
    });

    futures::stream::once(async { endpoint })
        .chain(messages)
        .map(Ok)
}

pub(super) async fn open(State(state): State<AppState>) -> impl IntoResponse {
    let (guard, rx) = state.sessions.open();
    let id = guard.id().to_string();

    let sse = Sse::new(event_stream(guard, rx)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(20))
            .text("keep-alive"),
    );

    ([(SESSION_HEADER, id)], sse)
}

/// Query form of the session id.
#[derive(Debug, Deserialize)]
pub(super) struct SessionQuery {
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
}

pub(super) async fn message(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SessionQuery>,
    body: Bytes,
) -> Response {
    let session_id = headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or(query.session_id);

    let Some(session_id) = session_id else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Missing session ID" })),
        )
            .into_response();
    };

    let Some(sender) = state.sessions().sender(&session_id) else {
        return session_not_found();
    };

    let Some(payload) = rpc::dispatch(state.handler(), &body).await.into_json() else {
        return StatusCode::ACCEPTED.into_response();
    };

    if sender.send(payload).await.is_err() {
        tracing::debug!(session = %session_id, "SSE session closed before reply");
        return session_not_found();
    }
    StatusCode::ACCEPTED.into_response()
}

fn session_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Session not found" })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropping_guard_removes_session() {
        let registry = Arc::new(SessionRegistry::default());
        let (guard, _rx) = registry.open();
        let id = guard.id().to_string();

        assert_eq!(registry.len(), 1);
        assert!(registry.sender(&id).is_some());

        drop(guard);
        assert!(registry.is_empty());
        assert!(registry.sender(&id).is_none());
    }

    #[tokio::test]
    async fn stream_starts_with_endpoint_then_messages() {
        let registry = Arc::new(SessionRegistry::default());
        let (guard, rx) = registry.open();
        let id = guard.id().to_string();
        let sender = registry.sender(&id).unwrap();

        let mut stream = Box::pin(event_stream(guard, rx));

        sender.send(json!({"jsonrpc": "2.0", "id": 1, "result": {}})).await.unwrap();
        assert!(stream.next().await.is_some());
        assert!(stream.next().await.is_some());

        drop(stream);
        assert!(registry.is_empty());
    }
}
