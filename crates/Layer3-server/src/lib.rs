//! # seedbridge-server
//!
//! Tool Surface for SeedBridge: exposes the dispatch engine as MCP tools
//! over newline-delimited JSON-RPC on stdio.
//!
//! ```text
//! stdin ──▶ McpServer ──▶ ToolSurface ──▶ Dispatcher ──▶ target REST API
//!                │
//! stdout ◀── writer task
//! ```

pub mod mcp;
pub mod tools;

pub use mcp::McpServer;
pub use tools::{ToolDef, ToolError, ToolOutput, ToolSurface};
