//! Session handling against a mock upstream: login, refresh-once-on-401,
//! failed refresh, logout.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use serde_json::json;

use common::{MockUpstream, FIRST_TOKEN, REFRESHED_TOKEN, REJECTED_EMAIL};
use wesign_mcp::tools::{ToolError, ToolRegistry};
use wesign_mcp::wesign::ApiError;

#[tokio::test]
async fn login_stores_tokens_and_reports_user() {
    let upstream = MockUpstream::start().await;
    let registry = ToolRegistry::new(Arc::new(upstream.client()));

    let result = registry
        .call(
            "wesign_login",
            json!({ "email": "dana@example.com", "password": "pw", "persistent": true }),
        )
        .await
        .unwrap();

    assert_eq!(result["success"], true);
    assert_eq!(result["user"]["companyName"], "Acme");
    assert_eq!(result["user"]["type"], "Company Admin");
    assert_eq!(result["user"]["remainingDocuments"], 42);
    assert_eq!(result["sessionType"], "persistent");

    let tokens = registry.client().tokens().await.unwrap();
    assert_eq!(tokens.access_token, FIRST_TOKEN);

    let login = &upstream.requests()[0];
    assert_eq!(login.path, "/users/login");
    assert_eq!(login.body, json!({ "Email": "dana@example.com", "Password": "pw" }));
    assert!(login.bearer.is_none());
}

#[tokio::test]
async fn login_without_token_is_rejected_and_leaves_no_session() {
    let upstream = MockUpstream::start().await;
    let registry = ToolRegistry::new(Arc::new(upstream.client()));

    let err = registry
        .call(
            "wesign_login",
            json!({ "email": REJECTED_EMAIL, "password": "pw" }),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ToolError::LoginRejected(ref m) if m == "Invalid credentials"));
    assert!(!registry.client().is_authenticated().await);
}

#[tokio::test]
async fn login_failure_status_is_not_retried() {
    let upstream = MockUpstream::start().await;
    let client = upstream.client();

    let err = client.login("locked@example.com", "pw").await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert_eq!(err.to_string(), "Account locked");
    assert_eq!(upstream.calls(), vec!["POST /users/login"]);
}

#[tokio::test]
async fn expired_token_is_refreshed_once_and_the_call_retried() {
    let upstream = MockUpstream::start().await;
    upstream
        .behaviour
        .expire_first_token
        .store(true, Ordering::SeqCst);
    let client = upstream.logged_in_client().await;

    let user = client.current_user().await.unwrap();
    assert_eq!(user.name, "Dana Levi");

    assert_eq!(
        upstream.calls(),
        vec!["GET /users", "POST /users/refresh", "GET /users"]
    );
    let requests = upstream.requests();
    assert_eq!(requests[0].bearer.as_deref(), Some(FIRST_TOKEN));
    assert_eq!(requests[1].body["RefreshToken"], "refresh-1");
    assert_eq!(requests[2].bearer.as_deref(), Some(REFRESHED_TOKEN));

    let tokens = client.tokens().await.unwrap();
    assert_eq!(tokens.access_token, REFRESHED_TOKEN);
    assert_eq!(tokens.refresh_token, "refresh-2");
}

#[tokio::test]
async fn failed_refresh_clears_the_session() {
    let upstream = MockUpstream::start().await;
    upstream
        .behaviour
        .expire_first_token
        .store(true, Ordering::SeqCst);
    upstream.behaviour.refresh_fails.store(true, Ordering::SeqCst);
    let client = upstream.logged_in_client().await;

    let err = client.current_user().await.unwrap_err();
    assert!(matches!(err, ApiError::RefreshFailed(_)));
    assert!(!client.is_authenticated().await);
    assert_eq!(upstream.calls(), vec!["GET /users", "POST /users/refresh"]);

    // Later tool calls fail fast without reaching the upstream.
    let registry = ToolRegistry::new(client);
    let err = registry
        .call("wesign_list_documents", json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::NotAuthenticated));
    assert_eq!(upstream.calls().len(), 2);
}

#[tokio::test]
async fn second_401_after_refresh_is_returned_without_another_retry() {
    let upstream = MockUpstream::start().await;
    upstream
        .behaviour
        .reject_every_token
        .store(true, Ordering::SeqCst);
    let client = upstream.logged_in_client().await;

    let err = client.current_user().await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 401, .. }));
    assert_eq!(
        upstream.calls(),
        vec!["GET /users", "POST /users/refresh", "GET /users"]
    );

    // The refresh itself succeeded, so the session survives.
    assert!(client.is_authenticated().await);
    assert_eq!(
        client.tokens().await.unwrap().access_token,
        REFRESHED_TOKEN
    );
}

#[tokio::test]
async fn malformed_refresh_response_clears_the_session() {
    let upstream = MockUpstream::start().await;
    upstream
        .behaviour
        .expire_first_token
        .store(true, Ordering::SeqCst);
    upstream
        .behaviour
        .refresh_malformed
        .store(true, Ordering::SeqCst);
    let client = upstream.logged_in_client().await;

    let err = client.current_user().await.unwrap_err();
    assert!(matches!(err, ApiError::RefreshFailed(_)));
    assert!(!client.is_authenticated().await);
    assert_eq!(upstream.calls(), vec!["GET /users", "POST /users/refresh"]);
}

#[tokio::test]
async fn refresh_tool_reports_success() {
    let upstream = MockUpstream::start().await;
    let registry = ToolRegistry::new(upstream.logged_in_client().await);

    let result = registry
        .call("wesign_refresh_token", json!({}))
        .await
        .unwrap();
    assert_eq!(result["message"], "Token refreshed successfully");
    assert_eq!(
        registry.client().tokens().await.unwrap().access_token,
        REFRESHED_TOKEN
    );
}

#[tokio::test]
async fn logout_calls_upstream_and_clears_tokens() {
    let upstream = MockUpstream::start().await;
    let registry = ToolRegistry::new(upstream.logged_in_client().await);

    let result = registry.call("wesign_logout", json!({})).await.unwrap();
    assert_eq!(result["success"], true);
    assert!(!registry.client().is_authenticated().await);
    assert_eq!(upstream.calls(), vec!["GET /users/Logout"]);

    let status = registry
        .call("wesign_check_auth_status", json!({}))
        .await
        .unwrap();
    assert_eq!(status["authenticated"], false);
}
