//! MCP (Model Context Protocol) 서버
//!
//! - `types.rs` - JSON-RPC/MCP 메시지 타입
//! - `server.rs` - stdio 요청 루프

mod server;
mod types;

pub use server::{McpServer, SERVER_NAME};
pub use types::{
    JsonRpcError, JsonRpcRequest, JsonRpcResponse, McpContent, McpTool, McpToolCall,
    McpToolResult, PROTOCOL_VERSION,
};
