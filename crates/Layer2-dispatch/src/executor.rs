//! Resilient HTTP Executor
//!
//! 응답 분류:
//! - 2xx: 성공
//! - 429, 500, 502, 503, 504, 네트워크 에러: 일시적 (재시도)
//! - 그 외 4xx: 영구적 (ClientError, 재시도 없음)
//!
//! 각 호출의 재시도 루프는 독립적이며 다른 호출과 상태를 공유하지 않는다.

use crate::error::TransportError;
use crate::registry::HttpMethod;
use crate::resolver::Payload;
use crate::result::{DispatchResult, Failure, FailureKind};
use crate::retry::{with_retry, RetryClassification, RetryPolicy, RetryableError, Sleeper, TokioSleeper};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Statuses treated as transient besides network failures
pub const TRANSIENT_STATUSES: &[u16] = &[429, 500, 502, 503, 504];

const BODY_SNIPPET_LEN: usize = 200;

/// Why a single attempt did not succeed
#[derive(Error, Debug)]
enum AttemptError {
    #[error("HTTP {status}: {snippet}")]
    Transient {
        status: u16,
        snippet: String,
        body: Value,
        retry_after: Option<Duration>,
    },

    #[error("HTTP {status}: {snippet}")]
    Client {
        status: u16,
        snippet: String,
        body: Value,
    },

    #[error("Unexpected HTTP status {status}: {snippet}")]
    Unexpected {
        status: u16,
        snippet: String,
        body: Value,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl RetryableError for AttemptError {
    fn classify(&self) -> RetryClassification {
        match self {
            AttemptError::Transient { retry_after, .. } => match retry_after {
                Some(_) => RetryClassification::RateLimited {
                    retry_after: *retry_after,
                },
                None => RetryClassification::Retry,
            },
            AttemptError::Client { .. } | AttemptError::Unexpected { .. } => {
                RetryClassification::NoRetry
            }
            AttemptError::Transport(e) => e.classify(),
        }
    }
}

impl AttemptError {
    fn from_response(response: &HttpResponse) -> Self {
        let status = response.status;
        let snippet = snippet(&response.body);
        let body = response.json_body();

        if TRANSIENT_STATUSES.contains(&status) {
            AttemptError::Transient {
                status,
                snippet,
                body,
                retry_after: response.retry_after,
            }
        } else if (400..500).contains(&status) {
            AttemptError::Client {
                status,
                snippet,
                body,
            }
        } else {
            AttemptError::Unexpected {
                status,
                snippet,
                body,
            }
        }
    }

    fn into_failure(self, attempts: u32, exhausted: bool) -> Failure {
        let message = self.to_string();
        match self {
            AttemptError::Transient { status, body, .. } => {
                let message = format!("retries exhausted after {} attempt(s): {}", attempts, message);
                Failure::new(FailureKind::TransientExhausted, message, attempts)
                    .with_response(status, body)
            }
            AttemptError::Client { status, body, .. } => {
                Failure::new(FailureKind::ClientError, message, attempts).with_response(status, body)
            }
            AttemptError::Unexpected { status, body, .. } => {
                Failure::new(FailureKind::InvalidResponse, message, attempts)
                    .with_response(status, body)
            }
            AttemptError::Transport(_) if exhausted => {
                let message = format!("retries exhausted after {} attempt(s): {}", attempts, message);
                Failure::new(FailureKind::TransientExhausted, message, attempts)
            }
            AttemptError::Transport(_) => Failure::new(FailureKind::NetworkError, message, attempts),
        }
    }
}

fn snippet(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return "(empty body)".to_string();
    }
    match body.char_indices().nth(BODY_SNIPPET_LEN) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

/// Executes HTTP calls with bounded exponential-backoff retry
#[derive(Clone)]
pub struct ResilientExecutor {
    transport: Arc<dyn HttpTransport>,
    sleeper: Arc<dyn Sleeper>,
    policy: RetryPolicy,
}

impl ResilientExecutor {
    pub fn new(transport: Arc<dyn HttpTransport>, policy: RetryPolicy) -> Self {
        Self {
            transport,
            sleeper: Arc::new(TokioSleeper),
            policy,
        }
    }

    /// Replace the sleeper (tests use a recording no-op sleeper)
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub async fn execute(&self, method: HttpMethod, url: &str, payload: &Payload) -> DispatchResult {
        let request = HttpRequest::build(method, url, payload);
        let operation_name = format!("{} {}", method, url);

        let outcome = with_retry(
            &self.policy,
            self.sleeper.as_ref(),
            &operation_name,
            |_attempt| self.attempt(&request),
        )
        .await;

        match outcome {
            Ok((response, attempts)) => {
                debug!("{}: HTTP {} after {} attempt(s)", operation_name, response.status, attempts);
                DispatchResult::success(response.status, response.json_body(), attempts)
            }
            Err(e) => DispatchResult::Failure(e.error.into_failure(e.attempts, e.exhausted)),
        }
    }

    async fn attempt(&self, request: &HttpRequest) -> Result<HttpResponse, AttemptError> {
        let response = self.transport.send(request).await?;
        if (200..300).contains(&response.status) {
            Ok(response)
        } else {
            Err(AttemptError::from_response(&response))
        }
    }
}
