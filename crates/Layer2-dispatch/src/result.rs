//! Normalized dispatch outcome

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Outcome of one dispatch call. Never persisted.
///
/// JSON shape:
/// ```json
/// {"status": "success", "status_code": 201, "response_body": {"id": 1}, "attempts": 1}
/// {"status": "error", "kind": "ClientError", "message": "...", "attempts_made": 1, "status_code": 404}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DispatchResult {
    Success {
        status_code: u16,
        response_body: Value,
        attempts: u32,
    },

    #[serde(rename = "error")]
    Failure(Failure),
}

impl DispatchResult {
    pub fn success(status_code: u16, response_body: Value, attempts: u32) -> Self {
        DispatchResult::Success {
            status_code,
            response_body,
            attempts,
        }
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            DispatchResult::Failure(f) => Some(f),
            DispatchResult::Success { .. } => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, DispatchResult::Success { .. })
    }

    /// HTTP attempts made (0 when the call failed before any network I/O)
    pub fn attempts(&self) -> u32 {
        match self {
            DispatchResult::Success { attempts, .. } => *attempts,
            DispatchResult::Failure(f) => f.attempts_made,
        }
    }

    pub fn kind(&self) -> Option<FailureKind> {
        self.failure().map(|f| f.kind)
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Structured failure details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
    pub attempts_made: u32,

    /// Upstream status, when a response was received
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,

    /// Upstream body, when a response was received
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_body: Option<Value>,

    /// Offending payload field (validation errors)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    /// Expected type tag of `field`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
}

impl Failure {
    pub fn new(kind: FailureKind, message: impl Into<String>, attempts_made: u32) -> Self {
        Self {
            kind,
            message: message.into(),
            attempts_made,
            status_code: None,
            response_body: None,
            field: None,
            expected: None,
        }
    }

    pub fn with_response(mut self, status_code: u16, body: Value) -> Self {
        self.status_code = Some(status_code);
        self.response_body = Some(body);
        self
    }
}

/// Failure taxonomy surfaced to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    UnknownEndpoint,
    PayloadValidationError,
    ClientError,
    TransientExhausted,
    NetworkError,
    InvalidResponse,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::UnknownEndpoint => "UnknownEndpoint",
            FailureKind::PayloadValidationError => "PayloadValidationError",
            FailureKind::ClientError => "ClientError",
            FailureKind::TransientExhausted => "TransientExhausted",
            FailureKind::NetworkError => "NetworkError",
            FailureKind::InvalidResponse => "InvalidResponse",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
