//! `POST /execute`: `{tool, parameters}` in, `{success, data | error}` out.
//!
//! When no session is held and credentials are configured, a login is
//! attempted before the tool runs.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::AppState;
use crate::tools::{auth, ToolError};

#[derive(Debug, Deserialize)]
struct ExecuteRequest {
    #[serde(default)]
    tool: Option<String>,
    #[serde(default)]
    parameters: Value,
}

/// HTTP status for a failed tool call.
#[must_use]
pub fn status_for(err: &ToolError) -> StatusCode {
    match err {
        ToolError::UnknownTool(_) => StatusCode::NOT_FOUND,
        ToolError::InvalidArguments(_) => StatusCode::BAD_REQUEST,
        ToolError::NotAuthenticated | ToolError::LoginRejected(_) => StatusCode::UNAUTHORIZED,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn failure(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({ "success": false, "error": message.into() })),
    )
        .into_response()
}

pub(super) async fn execute(State(state): State<AppState>, body: Bytes) -> Response {
    let request: ExecuteRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => return failure(StatusCode::BAD_REQUEST, format!("Invalid request body: {e}")),
    };

    let Some(tool) = request.tool.filter(|t| !t.is_empty()) else {
        return failure(StatusCode::BAD_REQUEST, "Tool name is required");
    };

    if let Some(credentials) = &state.credentials {
        if !state.client().is_authenticated().await {
            if let Err(e) = auth::auto_login(state.client(), credentials).await {
                tracing::error!(error = %e, "REST auto-login failed");
                return failure(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Auto-login failed: {e}"),
                );
            }
        }
    }

    tracing::debug!(tool = %tool, "REST tool call");
    match state.handler().registry().call(&tool, request.parameters).await {
        Ok(data) => Json(json!({ "success": true, "data": data })).into_response(),
        Err(e) => failure(status_for(&e), e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            status_for(&ToolError::UnknownTool("x".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&ToolError::invalid("bad")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&ToolError::NotAuthenticated),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_for(&ToolError::FileNotFound {
                path: "/tmp/none.pdf".into()
            }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
