//! `POST /mcp`: one JSON-RPC envelope per request body.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;

use super::AppState;
use crate::mcp::protocol::{parse_message, IncomingMessage, JsonRpcError, JsonRpcResponse};
use crate::mcp::McpHandler;

/// What a posted envelope produced.
#[derive(Debug)]
pub enum Reply {
    /// A request answered successfully.
    Response(JsonRpcResponse),
    /// A request (or an unparseable body) answered with an error.
    Error(JsonRpcError),
    /// A notification; nothing to send back.
    Accepted,
}

impl Reply {
    /// The JSON body to send, if any.
    #[must_use]
    pub fn into_json(self) -> Option<Value> {
        match self {
            Self::Response(r) => serde_json::to_value(r).ok(),
            Self::Error(e) => serde_json::to_value(e).ok(),
            Self::Accepted => None,
        }
    }
}

/// Parses a body and runs it through the handler.
pub async fn dispatch(handler: &McpHandler, body: &[u8]) -> Reply {
    let Ok(text) = std::str::from_utf8(body) else {
        return Reply::Error(JsonRpcError::parse_error());
    };

    match parse_message(text) {
        Ok(IncomingMessage::Request(req)) => {
            tracing::debug!(id = %req.id, method = %req.method, "HTTP JSON-RPC request");
            match handler.handle(&req).await {
                Ok(resp) => Reply::Response(resp),
                Err(e) => Reply::Error(e),
            }
        }
        Ok(IncomingMessage::Notification(notif)) => {
            tracing::debug!(method = %notif.method, "HTTP JSON-RPC notification");
            Reply::Accepted
        }
        Err(e) => Reply::Error(e),
    }
}

/// HTTP status carried by a JSON-RPC error: client faults are 400, the rest
/// 500.
#[must_use]
pub const fn error_status(code: i32) -> StatusCode {
    match code {
        -32700 | -32600 | -32601 | -32602 => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(super) async fn handle(State(state): State<AppState>, body: Bytes) -> Response {
    match dispatch(state.handler(), &body).await {
        Reply::Response(resp) => Json(resp).into_response(),
        Reply::Error(err) => {
            if err.code() == -32603 {
                tracing::warn!(message = %err.error.message, "JSON-RPC call failed");
            }
            (error_status(err.code()), Json(err)).into_response()
        }
        Reply::Accepted => StatusCode::ACCEPTED.into_response(),
    }
}
