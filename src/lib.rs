//! wesign-mcp: MCP gateway for the WeSign document-signing API
//!
//! The WeSign REST API is wrapped in a catalog of MCP tools and exposed over
//! several front doors that share one upstream session.
//!
//! # Architecture
//!
//! ```text
//! stdio ─┐
//! /mcp  ─┼─▶ McpHandler ─▶ ToolRegistry ─▶ tool group ─▶ WeSignClient ─▶ WeSign
//! SSE   ─┤                      ▲
//! REST  ─┘──────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`config`]: configuration loading and validation
//! - [`error`]: configuration error types
//! - [`wesign`]: upstream REST client with token refresh
//! - [`position`]: natural-language field position parser
//! - [`tools`]: the tool catalog and dispatcher
//! - [`mcp`]: JSON-RPC protocol, shared handler and the stdio server
//! - [`http`]: JSON-RPC, SSE and REST adapters over HTTP

pub mod config;
pub mod error;
pub mod http;
pub mod mcp;
pub mod position;
pub mod tools;
pub mod wesign;
