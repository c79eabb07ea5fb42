//! In-process stand-in for the WeSign API.
//!
//! Every request is recorded. Responses are canned per route; a few switches
//! make the mock expire tokens or fail specific steps.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use wesign_mcp::mcp::{McpHandler, ResourceCatalog};
use wesign_mcp::tools::ToolRegistry;
use wesign_mcp::wesign::{SessionTokens, WeSignClient};

pub const FIRST_TOKEN: &str = "access-1";
pub const REFRESHED_TOKEN: &str = "access-2";
pub const REJECTED_EMAIL: &str = "nobody@example.com";

/// One request as seen by the mock.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub bearer: Option<String>,
    pub body: Value,
}

/// Switches that change how the mock answers.
#[derive(Debug, Default)]
pub struct Behaviour {
    /// Answer 401 to any request carrying [`FIRST_TOKEN`].
    pub expire_first_token: AtomicBool,
    /// Answer 400 to `POST /users/refresh`.
    pub refresh_fails: AtomicBool,
    /// Answer 500 to `PUT /templates/{id}`.
    pub template_fields_fail: AtomicBool,
    /// Answer 401 to every session call, whatever the token.
    pub reject_every_token: AtomicBool,
    /// Answer `POST /users/refresh` with 200 and a bare JSON string.
    pub refresh_malformed: AtomicBool,
}

#[derive(Clone)]
struct MockState {
    log: Arc<Mutex<Vec<Recorded>>>,
    behaviour: Arc<Behaviour>,
}

/// A running mock upstream.
pub struct MockUpstream {
    pub url: String,
    log: Arc<Mutex<Vec<Recorded>>>,
    pub behaviour: Arc<Behaviour>,
}

impl MockUpstream {
    pub async fn start() -> Self {
        let state = MockState {
            log: Arc::new(Mutex::new(Vec::new())),
            behaviour: Arc::new(Behaviour::default()),
        };

        let app = Router::new().fallback(respond).with_state(state.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{addr}"),
            log: state.log,
            behaviour: state.behaviour,
        }
    }

    pub fn client(&self) -> WeSignClient {
        WeSignClient::new(&self.url, Duration::from_secs(5)).unwrap()
    }

    /// A client already holding [`FIRST_TOKEN`].
    pub async fn logged_in_client(&self) -> Arc<WeSignClient> {
        let client = self.client();
        client
            .set_tokens(SessionTokens {
                access_token: FIRST_TOKEN.to_string(),
                refresh_token: "refresh-1".to_string(),
                auth_token: None,
            })
            .await;
        Arc::new(client)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.log.lock().unwrap().clone()
    }

    /// `"METHOD /path"` for every recorded request, in order.
    pub fn calls(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| format!("{} {}", r.method, r.path))
            .collect()
    }
}

pub fn handler_for(client: Arc<WeSignClient>) -> McpHandler {
    McpHandler::new(
        Arc::new(ToolRegistry::new(client)),
        Arc::new(ResourceCatalog::default()),
    )
}

async fn respond(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri
        .path()
        .strip_prefix("/userapi/v3")
        .unwrap_or(uri.path())
        .to_string();
    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string);
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    state.log.lock().unwrap().push(Recorded {
        method: method.clone(),
        path: path.clone(),
        bearer: bearer.clone(),
        body: body.clone(),
    });

    let behaviour = &state.behaviour;
    let is_session_call = !path.starts_with("/users/login") && !path.starts_with("/users/refresh");
    let expired = behaviour.expire_first_token.load(Ordering::SeqCst)
        && bearer.as_deref() == Some(FIRST_TOKEN);
    if is_session_call && (expired || behaviour.reject_every_token.load(Ordering::SeqCst)) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Token expired" })),
        )
            .into_response();
    }

    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
    match (method.as_str(), segments.as_slice()) {
        ("POST", ["users", "login"]) => {
            if body["Email"] == REJECTED_EMAIL {
                Json(json!({ "message": "Invalid credentials" })).into_response()
            } else if body["Email"] == "locked@example.com" {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "message": "Account locked" })),
                )
                    .into_response()
            } else {
                Json(json!({ "token": FIRST_TOKEN, "refreshToken": "refresh-1" })).into_response()
            }
        }
        ("POST", ["users", "refresh"]) => {
            if behaviour.refresh_malformed.load(Ordering::SeqCst) {
                Json(json!("refreshed")).into_response()
            } else if behaviour.refresh_fails.load(Ordering::SeqCst) {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "message": "Refresh token revoked" })),
                )
                    .into_response()
            } else {
                Json(json!({ "token": REFRESHED_TOKEN, "refreshToken": "refresh-2" }))
                    .into_response()
            }
        }
        ("GET", ["users", "Logout"]) => StatusCode::OK.into_response(),
        ("GET", ["users"]) => Json(json!({
            "id": "u-1",
            "name": "Dana Levi",
            "email": "dana@example.com",
            "companyName": "Acme",
            "type": 3,
            "userConfiguration": { "language": 1 },
            "program": { "remainingDocumentsForMonth": 42 }
        }))
        .into_response(),
        ("GET", ["documentcollections"]) => Json(json!([
            {
                "id": "col-1",
                "name": "NDA",
                "status": 2,
                "creationTime": "2024-03-01T10:00:00",
                "documents": [{ "id": "doc-1", "name": "nda.pdf" }],
                "signers": [
                    { "id": "s-1", "firstName": "Dana", "lastName": "Levi", "status": 2 },
                    { "id": "s-2", "firstName": "Avi", "lastName": "Cohen", "status": 0 }
                ]
            },
            {
                "id": "col-2",
                "name": "Lease",
                "status": 1,
                "creationTime": "2024-04-15T08:30:00",
                "documents": [],
                "signers": []
            }
        ]))
        .into_response(),
        ("GET", ["documentcollections", _, "documents", _, "download"]) => Json(json!({
            "base64File": "data:application/pdf;base64,JVBERi0xLjQ=",
            "fileName": "nda.pdf"
        }))
        .into_response(),
        ("POST", ["templates"]) => Json(json!({
            "templateId": "tpl-1",
            "templateName": body["Name"],
            "creationTime": "2024-05-01T00:00:00"
        }))
        .into_response(),
        ("PUT", ["templates", _]) => {
            if behaviour.template_fields_fail.load(Ordering::SeqCst) {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "message": "Field update rejected" })),
                )
                    .into_response()
            } else {
                Json(json!({})).into_response()
            }
        }
        ("POST", ["documentcollections"]) => Json(json!({
            "id": "col-9",
            "name": body["DocumentName"],
            "status": 1,
            "creationTime": "2024-05-01T00:00:01"
        }))
        .into_response(),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": format!("not mocked: {method} {path}") })),
        )
            .into_response(),
    }
}
