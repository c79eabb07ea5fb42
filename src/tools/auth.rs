//! Session tools: login, logout, token refresh.

use serde::Deserialize;
use serde_json::{json, Value};

use super::{define, labels, parse_args, ToolError};
use crate::config::Credentials;
use crate::mcp::protocol::ToolDefinition;
use crate::wesign::{ApiError, ApiResult, LoginOutcome, WeSignClient};

/// Catalog entries for the session tools.
#[must_use]
pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        define(
            "wesign_login",
            "Authenticate with WeSign using email and password",
            json!({
                "type": "object",
                "properties": {
                    "email": { "type": "string", "description": "Email address for WeSign account" },
                    "password": { "type": "string", "description": "Password for WeSign account" },
                    "persistent": {
                        "type": "boolean",
                        "description": "Whether to use persistent session (default: false)"
                    }
                },
                "required": ["email", "password"]
            }),
        ),
        define(
            "wesign_logout",
            "Logout from WeSign and clear authentication tokens",
            json!({ "type": "object", "properties": {} }),
        ),
        define(
            "wesign_refresh_token",
            "Refresh the authentication token if expired",
            json!({ "type": "object", "properties": {} }),
        ),
    ]
}

#[derive(Deserialize)]
struct LoginArgs {
    email: String,
    password: String,
    #[serde(default)]
    persistent: bool,
}

/// Executes a session tool.
///
/// # Errors
///
/// Returns [`ToolError::LoginRejected`] when no token is issued, and
/// upstream errors otherwise.
pub async fn call(client: &WeSignClient, name: &str, arguments: &Value) -> Result<Value, ToolError> {
    match name {
        "wesign_login" => login(client, parse_args(arguments)?).await,
        "wesign_logout" => {
            client.logout().await;
            Ok(json!({ "success": true, "message": "Logout successful" }))
        }
        "wesign_refresh_token" => refresh(client).await,
        _ => Err(ToolError::UnknownTool(name.to_string())),
    }
}

async fn login(client: &WeSignClient, args: LoginArgs) -> Result<Value, ToolError> {
    let outcome = client
        .login(&args.email, &args.password)
        .await
        .map_err(ToolError::upstream("Login failed"))?;

    if !outcome.success {
        return Err(ToolError::LoginRejected(outcome.message));
    }

    let session_type = if args.persistent { "persistent" } else { "session" };

    match client.current_user().await {
        Ok(user) => Ok(json!({
            "success": true,
            "message": "Login successful",
            "user": {
                "name": user.name,
                "email": user.email,
                "companyName": user.company_name,
                "type": labels::user_type(user.user_type),
                "language": labels::language(user.user_configuration.language),
                "remainingDocuments": user.program.remaining_documents_for_month,
            },
            "sessionType": session_type,
        })),
        Err(e) => {
            tracing::warn!(error = %e, "logged in but user lookup failed");
            Ok(json!({
                "success": true,
                "message": "Login successful, but could not retrieve user details",
                "sessionType": session_type,
                "warning": "User details unavailable",
            }))
        }
    }
}

/// Logs in with configured credentials and logs who the session belongs to.
///
/// Used at startup and by the REST endpoint; the outcome is returned for the
/// caller to act on, nothing is retried.
///
/// # Errors
///
/// Returns the upstream error when the login request itself fails.
pub async fn auto_login(client: &WeSignClient, credentials: &Credentials) -> ApiResult<LoginOutcome> {
    tracing::info!(email = %credentials.email, "attempting automatic login");
    let outcome = client
        .login(&credentials.email, &credentials.password)
        .await?;

    if !outcome.success {
        tracing::warn!(message = %outcome.message, "automatic login rejected");
        return Ok(outcome);
    }

    match client.current_user().await {
        Ok(user) => tracing::info!(
            name = %user.name,
            company = %user.company_name,
            remaining_documents = user.program.remaining_documents_for_month,
            "logged in"
        ),
        Err(e) => tracing::warn!(error = %e, "could not retrieve user details after login"),
    }
    Ok(outcome)
}

async fn refresh(client: &WeSignClient) -> Result<Value, ToolError> {
    match client.refresh_token().await {
        Ok(()) => Ok(json!({ "success": true, "message": "Token refreshed successfully" })),
        Err(ApiError::NotAuthenticated) => Err(ToolError::NotAuthenticated),
        Err(e) => Err(ToolError::upstream("Token refresh failed")(e)),
    }
}
