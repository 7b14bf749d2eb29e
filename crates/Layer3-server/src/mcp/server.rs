//! MCP Server - 줄 단위 JSON-RPC 2.0 루프
//!
//! - 입력: 한 줄에 메시지 하나 (stdin)
//! - `tools/call`은 요청마다 별도 task로 실행되어 서로를 막지 않는다
//! - 모든 응답은 단일 writer task를 거쳐 출력된다 (stdout)

use super::types::{
    JsonRpcError, JsonRpcRequest, JsonRpcResponse, McpTool, McpToolCall, McpToolResult,
    PROTOCOL_VERSION,
};
use crate::tools::ToolSurface;
use seedbridge_foundation::{Error, Result};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

pub const SERVER_NAME: &str = "seedbridge";

const RESPONSE_BUFFER: usize = 64;

type Responder = mpsc::Sender<JsonRpcResponse>;

pub struct McpServer {
    surface: Arc<ToolSurface>,
}

impl McpServer {
    pub fn new(surface: ToolSurface) -> Self {
        Self {
            surface: Arc::new(surface),
        }
    }

    /// Serve on the process's stdin/stdout until stdin closes.
    pub async fn serve_stdio(&self) -> Result<()> {
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Serve until `reader` hits EOF, then wait for in-flight tool calls.
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, mut rx) = mpsc::channel::<JsonRpcResponse>(RESPONSE_BUFFER);

        // writer task
        let writer_task = tokio::spawn(async move {
            let mut writer = writer;
            while let Some(response) = rx.recv().await {
                let mut line = match serde_json::to_string(&response) {
                    Ok(line) => line,
                    Err(e) => {
                        error!("Failed to serialize response: {}", e);
                        continue;
                    }
                };
                debug!("MCP response: {}", line);
                line.push('\n');
                writer.write_all(line.as_bytes()).await?;
                writer.flush().await?;
            }
            Ok::<(), std::io::Error>(())
        });

        info!("MCP server listening");

        let mut lines = BufReader::new(reader).lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            debug!("MCP request: {}", line);
            self.handle_line(line, &tx).await;
        }

        info!("Input closed, waiting for in-flight calls");
        drop(tx);
        writer_task
            .await
            .map_err(|e| Error::Internal(format!("writer task failed: {}", e)))??;
        Ok(())
    }

    async fn handle_line(&self, line: &str, tx: &Responder) {
        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                warn!("Unparseable message: {}", e);
                respond(tx, JsonRpcResponse::error(Value::Null, JsonRpcError::parse_error(e))).await;
                return;
            }
        };

        let id = value.get("id").cloned().unwrap_or(Value::Null);
        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(e) => {
                respond(tx, JsonRpcResponse::error(id, JsonRpcError::invalid_request(e.to_string())))
                    .await;
                return;
            }
        };

        let Some(id) = request.id.clone() else {
            debug!("Notification: {}", request.method);
            return;
        };

        let response = match request.method.as_str() {
            "initialize" => JsonRpcResponse::success(id, self.initialize(request.params.as_ref())),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => JsonRpcResponse::success(id, self.list_tools()),
            "tools/call" => {
                self.spawn_call(id, request.params, tx.clone());
                return;
            }
            other => JsonRpcResponse::error(id, JsonRpcError::method_not_found(other)),
        };
        respond(tx, response).await;
    }

    fn initialize(&self, params: Option<&Value>) -> Value {
        let version = params
            .and_then(|p| p.get("protocolVersion"))
            .and_then(Value::as_str)
            .unwrap_or(PROTOCOL_VERSION);

        if let Some(client) = params.and_then(|p| p.get("clientInfo")) {
            info!("Client connected: {}", client);
        }

        json!({
            "protocolVersion": version,
            "capabilities": {"tools": {"listChanged": false}},
            "serverInfo": {"name": SERVER_NAME, "version": env!("CARGO_PKG_VERSION")}
        })
    }

    fn list_tools(&self) -> Value {
        let tools: Vec<McpTool> = self.surface.definitions().iter().map(McpTool::from).collect();
        json!({ "tools": tools })
    }

    fn spawn_call(&self, id: Value, params: Option<Value>, tx: Responder) {
        let call: McpToolCall = match serde_json::from_value(params.unwrap_or(Value::Null)) {
            Ok(call) => call,
            Err(e) => {
                tokio::spawn(async move {
                    let error = JsonRpcError::invalid_params(format!("Invalid tools/call params: {}", e));
                    respond(&tx, JsonRpcResponse::error(id, error)).await;
                });
                return;
            }
        };

        let surface = Arc::clone(&self.surface);
        tokio::spawn(async move {
            let response = match surface.call(&call.name, &call.arguments).await {
                Ok(output) => match serde_json::to_value(McpToolResult::from(output)) {
                    Ok(result) => JsonRpcResponse::success(id, result),
                    Err(e) => JsonRpcResponse::error(id, JsonRpcError::internal_error(e.to_string())),
                },
                Err(e) => {
                    warn!("Tool call rejected: {}", e);
                    JsonRpcResponse::error(id, JsonRpcError::invalid_params(e.to_string()))
                }
            };
            respond(&tx, response).await;
        });
    }
}

async fn respond(tx: &Responder, response: JsonRpcResponse) {
    if tx.send(response).await.is_err() {
        error!("Response channel closed");
    }
}
