//! The stdio MCP server.
//!
//! This module drives the MCP lifecycle over a line transport:
//!
//! 1. **Initialisation**: `initialize` request, then the
//!    `notifications/initialized` notification
//! 2. **Operation**: tool and resource requests, answered by [`McpHandler`]
//! 3. **Shutdown**: end of input, SIGINT or SIGTERM
//!
//! `ping` is answered in every state.

use std::io;

use tokio::io::{AsyncBufRead, AsyncWrite};

use crate::mcp::handler::McpHandler;
use crate::mcp::protocol::{
    parse_message, ErrorCode, IncomingMessage, JsonRpcError, JsonRpcErrorData,
    JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, RequestId,
};
use crate::mcp::transport::{LineTransport, StdioTransport};

/// Server state in the MCP lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Waiting for initialize request.
    AwaitingInit,
    /// Initialize received, waiting for initialized notification.
    Initialising,
    /// Ready for normal operation.
    Running,
    /// Shutdown in progress.
    ShuttingDown,
}

/// An MCP server bound to one line transport.
pub struct McpServer<R, W> {
    state: ServerState,
    transport: LineTransport<R, W>,
    handler: McpHandler,
}

impl McpServer<tokio::io::BufReader<tokio::io::Stdin>, tokio::io::Stdout> {
    /// Creates a server on the process's standard streams.
    #[must_use]
    pub fn stdio(handler: McpHandler) -> Self {
        Self::new(StdioTransport::stdio(), handler)
    }
}

impl<R, W> McpServer<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Creates a server on an arbitrary transport.
    #[must_use]
    pub const fn new(transport: LineTransport<R, W>, handler: McpHandler) -> Self {
        Self {
            state: ServerState::AwaitingInit,
            transport,
            handler,
        }
    }

    /// Returns the current server state.
    #[must_use]
    pub const fn state(&self) -> ServerState {
        self.state
    }

    /// Runs until end of input or a termination signal.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O fails.
    pub async fn run(&mut self) -> io::Result<()> {
        self.run_with_shutdown().await
    }

    #[cfg(unix)]
    async fn run_with_shutdown(&mut self) -> io::Result<()> {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt()).map_err(io::Error::other)?;
        let mut sigterm = signal(SignalKind::terminate()).map_err(io::Error::other)?;

        loop {
            tokio::select! {
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT, initiating graceful shutdown");
                    self.state = ServerState::ShuttingDown;
                    return Ok(());
                }

                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM, initiating graceful shutdown");
                    self.state = ServerState::ShuttingDown;
                    return Ok(());
                }

                line_result = self.transport.read_line() => {
                    if self.handle_transport_result(line_result).await? {
                        return Ok(());
                    }
                }
            }
        }
    }

    #[cfg(not(unix))]
    async fn run_with_shutdown(&mut self) -> io::Result<()> {
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                _ = &mut ctrl_c => {
                    tracing::info!("Received Ctrl+C, initiating graceful shutdown");
                    self.state = ServerState::ShuttingDown;
                    return Ok(());
                }

                line_result = self.transport.read_line() => {
                    if self.handle_transport_result(line_result).await? {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Returns `true` if the server should shut down.
    async fn handle_transport_result(
        &mut self,
        line_result: io::Result<Option<String>>,
    ) -> io::Result<bool> {
        let Some(line) = line_result? else {
            tracing::info!("stdin closed");
            self.state = ServerState::ShuttingDown;
            return Ok(true);
        };

        if line.trim().is_empty() {
            return Ok(false);
        }

        self.handle_line(&line).await?;
        Ok(self.state == ServerState::ShuttingDown)
    }

    /// Handles a single line of input.
    ///
    /// # Errors
    ///
    /// Returns an error if writing the reply fails.
    pub async fn handle_line(&mut self, line: &str) -> io::Result<()> {
        match parse_message(line) {
            Ok(IncomingMessage::Request(req)) => self.handle_request(req).await,
            Ok(IncomingMessage::Notification(ref notif)) => {
                self.handle_notification(notif);
                Ok(())
            }
            Err(error) => self.transport.write_error(&error).await,
        }
    }

    async fn handle_request(&mut self, req: JsonRpcRequest) -> io::Result<()> {
        tracing::debug!(id = %req.id, method = %req.method, "request");

        let response = match req.method.as_str() {
            "initialize" => self.handle_initialize(&req),
            "ping" => self.handler.handle(&req).await,
            _ => match self.require_running(&req.id) {
                Ok(()) => self.handler.handle(&req).await,
                Err(e) => Err(e),
            },
        };

        match response {
            Ok(resp) => self.transport.write_response(&resp).await,
            Err(error) => self.transport.write_error(&error).await,
        }
    }

    fn handle_notification(&mut self, notif: &JsonRpcNotification) {
        if notif.method == "notifications/initialized" && self.state == ServerState::Initialising {
            tracing::info!("client initialised");
            self.state = ServerState::Running;
        }
    }

    fn handle_initialize(&mut self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        if self.state != ServerState::AwaitingInit {
            return Err(JsonRpcError::new(
                Some(req.id.clone()),
                JsonRpcErrorData::with_message(
                    ErrorCode::InvalidRequest,
                    "Server already initialised",
                ),
            ));
        }

        let response = McpHandler::initialize(req)?;
        self.state = ServerState::Initialising;
        Ok(response)
    }

    fn require_running(&self, id: &RequestId) -> Result<(), JsonRpcError> {
        if self.state != ServerState::Running {
            return Err(JsonRpcError::new(
                Some(id.clone()),
                JsonRpcErrorData::with_message(ErrorCode::InvalidRequest, "Server not initialised"),
            ));
        }
        Ok(())
    }
}
