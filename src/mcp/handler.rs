//! Method dispatch shared by the stdio, HTTP and SSE front doors.
//!
//! The handler is stateless apart from the upstream session held by the
//! tool registry. Lifecycle gating (initialize before use) is the stdio
//! server's concern; the HTTP adapters call straight through.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::mcp::protocol::{
    ErrorCode, InitializeParams, JsonRpcError, JsonRpcErrorData, JsonRpcRequest, JsonRpcResponse,
    ReadResourceParams, RequestId, ResourceContent, ServerCapabilities, ServerInfo,
    ToolCallParams, ToolCallResult, MCP_PROTOCOL_VERSION,
};
use crate::mcp::resources::ResourceCatalog;
use crate::tools::{ToolError, ToolRegistry};

/// Answers MCP requests against one tool registry and resource catalog.
#[derive(Debug, Clone)]
pub struct McpHandler {
    registry: Arc<ToolRegistry>,
    resources: Arc<ResourceCatalog>,
}

impl McpHandler {
    /// Creates a handler.
    #[must_use]
    pub const fn new(registry: Arc<ToolRegistry>, resources: Arc<ResourceCatalog>) -> Self {
        Self {
            registry,
            resources,
        }
    }

    /// The tool registry.
    #[must_use]
    pub const fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Dispatches one request by method name.
    ///
    /// # Errors
    ///
    /// Returns a JSON-RPC error for unknown methods, bad params and failed
    /// tool calls.
    pub async fn handle(&self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        match req.method.as_str() {
            "initialize" => Self::initialize(req),
            "ping" => Ok(JsonRpcResponse::success(req.id.clone(), json!({}))),
            "tools/list" => Ok(self.tools_list(req)),
            "tools/call" => self.tools_call(req).await,
            "resources/list" => Ok(self.resources_list(req)),
            "resources/read" => self.resources_read(req).await,
            _ => Err(JsonRpcError::method_not_found(req.id.clone(), &req.method)),
        }
    }

    /// Answers `initialize`. Only the presence of well-formed params is
    /// checked; the server always speaks [`MCP_PROTOCOL_VERSION`].
    ///
    /// # Errors
    ///
    /// Returns invalid params when the params are missing or malformed.
    pub fn initialize(req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        let params: InitializeParams = required_params(req, "initialize")?;
        tracing::info!(
            client = params.client_info.as_ref().map_or("unknown", |c| c.name.as_str()),
            requested = %params.protocol_version,
            "client initialising"
        );

        let result = json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "capabilities": ServerCapabilities::default(),
            "serverInfo": ServerInfo::default(),
        });
        Ok(JsonRpcResponse::success(req.id.clone(), result))
    }

    fn tools_list(&self, req: &JsonRpcRequest) -> JsonRpcResponse {
        JsonRpcResponse::success(
            req.id.clone(),
            json!({ "tools": self.registry.definitions() }),
        )
    }

    async fn tools_call(&self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        let params: ToolCallParams = required_params(req, "tool call")?;

        let value = self
            .registry
            .call(&params.name, params.arguments)
            .await
            .map_err(|e| tool_error(req.id.clone(), &e))?;

        let result = serde_json::to_value(ToolCallResult::json(&value)).map_err(|e| {
            tracing::error!(error = %e, "failed to serialise tool call result");
            JsonRpcError::internal_error(
                req.id.clone(),
                "Internal error: failed to serialise result",
            )
        })?;
        Ok(JsonRpcResponse::success(req.id.clone(), result))
    }

    fn resources_list(&self, req: &JsonRpcRequest) -> JsonRpcResponse {
        JsonRpcResponse::success(
            req.id.clone(),
            json!({ "resources": self.resources.list() }),
        )
    }

    async fn resources_read(&self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        let params: ReadResourceParams = required_params(req, "resource read")?;

        let text = self.resources.read(&params.uri).await.ok_or_else(|| {
            JsonRpcError::invalid_params(
                req.id.clone(),
                format!("Unknown resource URI: {}", params.uri),
            )
        })?;

        let content = ResourceContent {
            uri: params.uri,
            mime_type: "text/markdown",
            text,
        };
        Ok(JsonRpcResponse::success(
            req.id.clone(),
            json!({ "contents": [content] }),
        ))
    }
}

/// Maps a tool failure onto a JSON-RPC error.
///
/// | Tool error | Code |
/// |------------|------|
/// | unknown tool | -32601 |
/// | invalid arguments | -32602 |
/// | anything else | -32603 |
#[must_use]
pub fn tool_error(id: RequestId, err: &ToolError) -> JsonRpcError {
    let data = match err {
        ToolError::UnknownTool(_) => {
            JsonRpcErrorData::with_message(ErrorCode::MethodNotFound, err.to_string())
        }
        ToolError::InvalidArguments(_) => {
            JsonRpcErrorData::with_message(ErrorCode::InvalidParams, err.to_string())
        }
        _ => JsonRpcErrorData::with_message(
            ErrorCode::InternalError,
            format!("Tool execution failed: {err}"),
        ),
    };
    JsonRpcError::new(Some(id), data)
}

fn required_params<T: DeserializeOwned>(
    req: &JsonRpcRequest,
    what: &str,
) -> Result<T, JsonRpcError> {
    let params = req.params.clone().unwrap_or(Value::Null);
    if params.is_null() {
        return Err(JsonRpcError::invalid_params(
            req.id.clone(),
            format!("Missing {what} params"),
        ));
    }
    serde_json::from_value(params).map_err(|e| {
        JsonRpcError::invalid_params(req.id.clone(), format!("Invalid {what} params: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::wesign::WeSignClient;

    fn handler() -> McpHandler {
        let client = WeSignClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        McpHandler::new(
            Arc::new(ToolRegistry::new(Arc::new(client))),
            Arc::new(ResourceCatalog::default()),
        )
    }

    fn request(method: &str, params: Option<Value>) -> JsonRpcRequest {
        JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            id: RequestId::Number(7),
            method: method.to_string(),
            params,
        }
    }

    #[tokio::test]
    async fn lists_the_whole_catalog() {
        let resp = handler().handle(&request("tools/list", None)).await.unwrap();
        assert_eq!(resp.result["tools"].as_array().unwrap().len(), 49);
    }

    #[tokio::test]
    async fn unknown_method_is_method_not_found() {
        let err = handler()
            .handle(&request("prompts/list", None))
            .await
            .unwrap_err();
        assert_eq!(err.code(), -32601);
        assert_eq!(err.id, Some(RequestId::Number(7)));
    }

    #[tokio::test]
    async fn unknown_tool_is_method_not_found() {
        let err = handler()
            .handle(&request(
                "tools/call",
                Some(json!({"name": "wesign_teleport", "arguments": {}})),
            ))
            .await
            .unwrap_err();
        assert_eq!(err.code(), -32601);
        assert!(err.error.message.contains("wesign_teleport"));
    }

    #[tokio::test]
    async fn missing_arguments_are_invalid_params() {
        let err = handler()
            .handle(&request(
                "tools/call",
                Some(json!({"name": "wesign_login", "arguments": {"email": "a@b.c"}})),
            ))
            .await
            .unwrap_err();
        assert_eq!(err.code(), -32602);
    }

    #[tokio::test]
    async fn unauthenticated_call_is_internal_error() {
        let err = handler()
            .handle(&request(
                "tools/call",
                Some(json!({"name": "wesign_list_documents"})),
            ))
            .await
            .unwrap_err();
        assert_eq!(err.code(), -32603);
        assert!(err.error.message.starts_with("Tool execution failed: Not authenticated"));
    }

    #[tokio::test]
    async fn check_auth_status_works_without_session() {
        let resp = handler()
            .handle(&request(
                "tools/call",
                Some(json!({"name": "wesign_check_auth_status", "arguments": {}})),
            ))
            .await
            .unwrap();
        let text = resp.result["content"][0]["text"].as_str().unwrap();
        let payload: Value = serde_json::from_str(text).unwrap();
        assert_eq!(payload["authenticated"], false);
    }

    #[tokio::test]
    async fn reads_fallback_resource_and_rejects_unknown_uri() {
        let h = handler();
        let resp = h
            .handle(&request(
                "resources/read",
                Some(json!({"uri": "wesign://knowledge-base"})),
            ))
            .await
            .unwrap();
        assert_eq!(
            resp.result["contents"][0]["text"],
            "Knowledge base not available"
        );

        let err = h
            .handle(&request("resources/read", Some(json!({"uri": "file:///etc"}))))
            .await
            .unwrap_err();
        assert_eq!(err.code(), -32602);
    }

    #[test]
    fn initialize_requires_params() {
        let err = McpHandler::initialize(&request("initialize", None)).unwrap_err();
        assert_eq!(err.code(), -32602);

        let resp = McpHandler::initialize(&request(
            "initialize",
            Some(json!({"protocolVersion": "2024-11-05", "capabilities": {}})),
        ))
        .unwrap();
        assert_eq!(resp.result["serverInfo"]["name"], "wesign-mcp");
        assert_eq!(resp.result["protocolVersion"], MCP_PROTOCOL_VERSION);
    }
}
