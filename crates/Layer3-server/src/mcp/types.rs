//! MCP Types - JSON-RPC 2.0 메시지와 MCP 도구 타입

use crate::tools::{ToolDef, ToolOutput};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// MCP protocol revision reported when the client doesn't send one
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// JSON-RPC 2.0 요청 (id가 없으면 notification)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// JSON-RPC 2.0 응답
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Value, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// JSON-RPC 에러
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;

    fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn parse_error(detail: impl std::fmt::Display) -> Self {
        Self::new(Self::PARSE_ERROR, format!("Parse error: {}", detail))
    }

    pub fn invalid_request(detail: impl Into<String>) -> Self {
        Self::new(Self::INVALID_REQUEST, detail)
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(Self::METHOD_NOT_FOUND, format!("Method not found: {}", method))
    }

    pub fn invalid_params(detail: impl Into<String>) -> Self {
        Self::new(Self::INVALID_PARAMS, detail)
    }

    pub fn internal_error(detail: impl Into<String>) -> Self {
        Self::new(Self::INTERNAL_ERROR, detail)
    }
}

/// 도구 정보 (`tools/list`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpTool {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

impl From<&ToolDef> for McpTool {
    fn from(def: &ToolDef) -> Self {
        Self {
            name: def.name.clone(),
            description: Some(def.description.clone()),
            input_schema: def.input_schema(),
        }
    }
}

/// 도구 호출 파라미터 (`tools/call`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpToolCall {
    pub name: String,

    #[serde(default)]
    pub arguments: Value,
}

/// 도구 실행 결과
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpToolResult {
    pub content: Vec<McpContent>,

    #[serde(rename = "isError", default)]
    pub is_error: bool,
}

/// MCP 콘텐츠
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum McpContent {
    Text { text: String },
}

impl McpToolResult {
    pub fn text(&self) -> Option<&str> {
        self.content.iter().find_map(|content| match content {
            McpContent::Text { text } => Some(text.as_str()),
        })
    }
}

impl From<ToolOutput> for McpToolResult {
    fn from(output: ToolOutput) -> Self {
        let text = serde_json::to_string_pretty(&output.value)
            .unwrap_or_else(|_| output.value.to_string());
        Self {
            content: vec![McpContent::Text { text }],
            is_error: output.is_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_result_shape() {
        let result: McpToolResult = ToolOutput {
            value: json!({"status": "error", "kind": "ClientError"}),
            is_error: true,
        }
        .into();

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["isError"], json!(true));
        assert_eq!(value["content"][0]["type"], "text");

        let text: Value = serde_json::from_str(result.text().unwrap()).unwrap();
        assert_eq!(text["kind"], "ClientError");
    }

    #[test]
    fn test_request_without_id_is_notification() {
        let request: JsonRpcRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
                .unwrap();
        assert!(request.is_notification());

        let request: JsonRpcRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":"a-1","method":"ping"}"#).unwrap();
        assert_eq!(request.id, Some(json!("a-1")));
    }

    #[test]
    fn test_error_response_omits_result() {
        let response = JsonRpcResponse::error(json!(7), JsonRpcError::method_not_found("x"));
        let value = serde_json::to_value(&response).unwrap();
        assert!(value.get("result").is_none());
        assert_eq!(value["error"]["code"], json!(-32601));
    }
}
