//! HTTP front doors.
//!
//! | Route | Adapter |
//! |-------|---------|
//! | `POST /mcp` | JSON-RPC, one request per body ([`rpc`]) |
//! | `GET /mcp`, `POST /mcp/message` | JSON-RPC pushed over server-sent events ([`sse`]) |
//! | `POST /execute` | plain REST `{tool, parameters}` ([`rest`]) |
//! | `GET /health`, `GET /tools`, `GET /` | shared status endpoints |
//!
//! Every adapter dispatches through the same [`McpHandler`] and therefore the
//! same tool registry and upstream session.

pub mod rest;
pub mod rpc;
pub mod sse;

use std::io;
use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use crate::config::Credentials;
use crate::mcp::McpHandler;
use crate::wesign::WeSignClient;

use self::sse::SessionRegistry;

/// State shared by every route.
#[derive(Debug, Clone)]
pub struct AppState {
    handler: McpHandler,
    sessions: Arc<SessionRegistry>,
    credentials: Option<Credentials>,
}

impl AppState {
    /// Builds the state. `credentials`, when present, let the REST endpoint
    /// log in on demand.
    #[must_use]
    pub fn new(handler: McpHandler, credentials: Option<Credentials>) -> Self {
        Self {
            handler,
            sessions: Arc::new(SessionRegistry::default()),
            credentials,
        }
    }

    /// The shared MCP handler.
    #[must_use]
    pub const fn handler(&self) -> &McpHandler {
        &self.handler
    }

    /// Open SSE sessions.
    #[must_use]
    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// The upstream client behind the tool registry.
    #[must_use]
    pub fn client(&self) -> &WeSignClient {
        self.handler.registry().client()
    }
}

/// Builds the router with every adapter mounted.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(server_info))
        .route("/health", get(health))
        .route("/tools", get(list_tools))
        .route("/mcp", get(sse::open).post(rpc::handle))
        .route("/mcp/message", post(sse::message))
        .route("/execute", post(rest::execute))
        .with_state(state)
}

/// Binds `host:port` and serves until SIGINT or SIGTERM.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound or the server fails.
pub async fn serve(host: &str, port: u16, state: AppState) -> io::Result<()> {
    let listener = TcpListener::bind((host, port)).await?;
    tracing::info!(address = %listener.local_addr()?, "HTTP adapters listening");
    tracing::info!("JSON-RPC: POST /mcp, SSE: GET /mcp, REST: POST /execute");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C, initiating graceful shutdown"),
        () = terminate => tracing::info!("Received SIGTERM, initiating graceful shutdown"),
    }
}

/// ISO-8601 UTC timestamp with millisecond precision.
pub(crate) fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "authenticated": state.client().is_authenticated().await,
        "protocol": "MCP HTTP + SSE",
        "activeSessions": state.sessions().len(),
        "timestamp": timestamp(),
    }))
}

async fn list_tools(State(state): State<AppState>) -> Json<Value> {
    let tools = state.handler().registry().definitions();
    Json(json!({
        "success": true,
        "tools": tools,
        "count": tools.len(),
        "timestamp": timestamp(),
    }))
}

async fn server_info(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "name": "WeSign MCP Server",
        "version": env!("CARGO_PKG_VERSION"),
        "protocol": "MCP + REST",
        "transport": "HTTP",
        "mcp_endpoint": "/mcp",
        "sse_endpoint": "/mcp",
        "message_endpoint": "/mcp/message",
        "rest_endpoint": "/execute",
        "capabilities": {
            "tools": true,
            "resources": true,
            "mcp": true,
            "rest": true,
        },
        "tools_count": state.handler().registry().definitions().len(),
        "activeSessions": state.sessions().len(),
    }))
}
