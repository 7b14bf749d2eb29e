//! HTTP transport
//!
//! `HttpTransport`은 한 번의 HTTP 시도만 담당한다. 상태 분류와 재시도는
//! `ResilientExecutor`의 몫이다.

use crate::error::TransportError;
use crate::registry::HttpMethod;
use crate::resolver::Payload;
use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::Client;
use seedbridge_foundation::HttpConfig;
use serde_json::Value;
use std::time::Duration;

/// One outbound HTTP request
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl HttpRequest {
    /// POST/PUT send the payload as a JSON body. GET/DELETE send scalar
    /// fields as query parameters; nested values are JSON-encoded and nulls
    /// are dropped.
    pub fn build(method: HttpMethod, url: impl Into<String>, payload: &Payload) -> Self {
        let url = url.into();
        if method.has_body() {
            return Self {
                method,
                url,
                query: Vec::new(),
                body: Some(Value::Object(payload.clone())),
            };
        }

        let query = payload
            .iter()
            .filter_map(|(key, value)| {
                let text = match value {
                    Value::Null => return None,
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                Some((key.clone(), text))
            })
            .collect();

        Self {
            method,
            url,
            query,
            body: None,
        }
    }
}

/// Raw HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
    /// Parsed `Retry-After` header (delta-seconds form only)
    pub retry_after: Option<Duration>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            retry_after: None,
        }
    }

    pub fn with_retry_after(mut self, retry_after: Duration) -> Self {
        self.retry_after = Some(retry_after);
        self
    }

    /// Body as JSON when it parses, `null` when empty, otherwise a string
    pub fn json_body(&self) -> Value {
        let trimmed = self.body.trim();
        if trimmed.is_empty() {
            return Value::Null;
        }
        serde_json::from_str(trimmed).unwrap_or_else(|_| Value::String(self.body.clone()))
    }
}

/// Sends a single HTTP request
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// `reqwest`-backed transport with a per-attempt timeout
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("seedbridge/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::InvalidRequest(format!("failed to build client: {}", e)))?;
        Ok(Self { client })
    }

    pub fn from_config(config: &HttpConfig) -> Result<Self, TransportError> {
        Self::new(Duration::from_secs(config.timeout_secs))
    }

    fn method(method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }

    fn classify(err: reqwest::Error) -> TransportError {
        if err.is_builder() {
            TransportError::InvalidRequest(err.to_string())
        } else if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .client
            .request(Self::method(request.method), &request.url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(Self::classify)?;

        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs);

        let body = response.text().await.map_err(Self::classify)?;

        Ok(HttpResponse {
            status,
            body,
            retry_after,
        })
    }
}
