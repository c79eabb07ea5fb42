//! Model Context Protocol (MCP) implementation.
//!
//! The WeSign tool catalog and a handful of markdown resources are exposed
//! over JSON-RPC 2.0. The stdio server lives here; the HTTP adapters in
//! [`crate::http`] reuse the same [`McpHandler`].
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        MCP Server                            │
//! │                                                              │
//! │   ┌─────────────┐    ┌─────────────┐    ┌───────────────┐    │
//! │   │  Transport  │───▶│   Server    │───▶│   Handler     │    │
//! │   │   (stdio)   │    │ (lifecycle) │    │ (tools, docs) │    │
//! │   └─────────────┘    └─────────────┘    └───────────────┘    │
//! │                                                 ▲            │
//! │   ┌─────────────────────────────────┐           │            │
//! │   │  HTTP JSON-RPC / SSE (http mod) │───────────┘            │
//! │   └─────────────────────────────────┘                        │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Protocol Version
//!
//! This implementation targets MCP protocol version 2024-11-05.

pub mod handler;
pub mod protocol;
pub mod resources;
pub mod server;
pub mod transport;

pub use handler::McpHandler;
pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, MCP_PROTOCOL_VERSION};
pub use resources::ResourceCatalog;
pub use server::McpServer;
pub use transport::{LineTransport, StdioTransport};
