//! Dispatch error types
//!
//! `DispatchError`는 네트워크 I/O 이전에 감지되는 호출자 에러이고,
//! `TransportError`는 HTTP 응답을 받기 전의 연결 수준 에러다.
//! 둘 다 Dispatcher 경계에서 `DispatchResult::Failure`로 변환된다.

use crate::result::{DispatchResult, Failure, FailureKind};
use crate::retry::{RetryClassification, RetryableError};
use crate::schema::{FieldType, TypeMismatch};
use thiserror::Error;

/// Caller errors detected before any network I/O
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// Endpoint name is not in the registry
    #[error("Unknown endpoint: {0}")]
    UnknownEndpoint(String),

    /// Payload field missing or not convertible to its declared type
    #[error("Invalid payload: field '{field}' {reason} (expected {expected})")]
    PayloadValidation {
        field: String,
        expected: FieldType,
        reason: String,
    },
}

impl DispatchError {
    pub fn missing_field(field: impl Into<String>, expected: FieldType) -> Self {
        DispatchError::PayloadValidation {
            field: field.into(),
            expected,
            reason: "is missing".to_string(),
        }
    }

    pub fn type_mismatch(field: impl Into<String>, mismatch: TypeMismatch) -> Self {
        DispatchError::PayloadValidation {
            field: field.into(),
            expected: mismatch.expected,
            reason: format!("has invalid value: {}", mismatch.found),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            DispatchError::UnknownEndpoint(_) => FailureKind::UnknownEndpoint,
            DispatchError::PayloadValidation { .. } => FailureKind::PayloadValidationError,
        }
    }
}

impl From<DispatchError> for DispatchResult {
    fn from(err: DispatchError) -> Self {
        let mut failure = Failure::new(err.kind(), err.to_string(), 0);
        if let DispatchError::PayloadValidation {
            field, expected, ..
        } = err
        {
            failure.field = Some(field);
            failure.expected = Some(expected.to_string());
        }
        DispatchResult::Failure(failure)
    }
}

/// Errors raised by an `HttpTransport` before a response is available
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Attempt exceeded the configured timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Connection refused, DNS failure, etc.
    #[error("Connection failed: {0}")]
    Connect(String),

    /// Other I/O failure while sending or reading
    #[error("Network error: {0}")]
    Network(String),

    /// Request could not be built (bad URL, bad header)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl RetryableError for TransportError {
    fn classify(&self) -> RetryClassification {
        match self {
            TransportError::Timeout(_)
            | TransportError::Connect(_)
            | TransportError::Network(_) => RetryClassification::Retry,

            TransportError::InvalidRequest(_) => RetryClassification::NoRetry,
        }
    }
}
