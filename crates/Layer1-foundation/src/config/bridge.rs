//! Bridge Config - 엔드포인트/재시도/도구 설정
//!
//! 프로세스 시작 시 한 번 로드되고 이후 변경되지 않는다.

use super::env::expand_env_var;
use crate::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// HTTP method names accepted in `endpoints.*.method`
pub const SUPPORTED_METHODS: &[&str] = &["GET", "POST", "PUT", "DELETE"];

// ============================================================================
// Bridge Config (통합)
// ============================================================================

/// SeedBridge 통합 설정
///
/// JSON 형식:
/// ```json
/// {
///   "api_base_url": "http://localhost:8000",
///   "endpoints": {
///     "products": {
///       "path": "/products",
///       "method": "POST",
///       "fields": { "name": "string", "price": "float", "stockQuantity": "integer" }
///     }
///   }
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// 대상 API 기본 URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,

    /// 논리 이름 -> 엔드포인트 (선언 순서 유지)
    #[serde(default)]
    pub endpoints: IndexMap<String, EndpointConfig>,

    /// HTTP 클라이언트 설정
    #[serde(default)]
    pub http: HttpConfig,

    /// 재시도 정책
    #[serde(default)]
    pub retry: RetryConfig,

    /// 도구 표면 설정
    #[serde(default)]
    pub tools: ToolsConfig,
}

impl BridgeConfig {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: Some(api_base_url.into()),
            ..Default::default()
        }
    }

    /// 엔드포인트 추가 (builder)
    pub fn endpoint(mut self, name: impl Into<String>, endpoint: EndpointConfig) -> Self {
        self.endpoints.insert(name.into(), endpoint);
        self
    }

    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn tools(mut self, tools: ToolsConfig) -> Self {
        self.tools = tools;
        self
    }

    /// Base URL, after validation this is always present.
    pub fn base_url(&self) -> &str {
        self.api_base_url.as_deref().unwrap_or_default()
    }

    /// `${VAR}` 확장을 URL과 경로에 적용
    pub fn expand_env(&mut self) {
        if let Some(url) = self.api_base_url.as_mut() {
            *url = expand_env_var(url);
        }
        for endpoint in self.endpoints.values_mut() {
            if let Some(path) = endpoint.path.as_mut() {
                *path = expand_env_var(path);
            }
        }
        self.tools.reset_path = expand_env_var(&self.tools.reset_path);
    }

    /// 구조 검증
    ///
    /// Type tags are checked when the endpoint registry is built, since the
    /// tag vocabulary belongs to the dispatch layer.
    pub fn validate(&self) -> Result<()> {
        let base_url = self.api_base_url.as_deref().map(str::trim).unwrap_or("");
        if base_url.is_empty() {
            return Err(Error::invalid_config("missing 'api_base_url'"));
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(Error::invalid_config(format!(
                "'api_base_url' must be an http(s) URL, got '{}'",
                base_url
            )));
        }

        if self.endpoints.is_empty() {
            return Err(Error::invalid_config("no endpoints configured"));
        }

        let errors: Vec<_> = self
            .endpoints
            .iter()
            .filter_map(|(name, e)| e.validate().err().map(|msg| format!("{}: {}", name, msg)))
            .collect();
        if !errors.is_empty() {
            return Err(Error::invalid_config(errors.join("; ")));
        }

        self.http.validate()?;
        self.retry.validate()?;
        self.tools.validate(self)?;

        Ok(())
    }
}

// ============================================================================
// Endpoint Config
// ============================================================================

/// 개별 엔드포인트 설정 (원시 형태, 타입 태그는 문자열)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    /// 필드 이름 -> 타입 태그
    #[serde(default)]
    pub fields: IndexMap<String, String>,
}

impl EndpointConfig {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            method: Some(method.into()),
            fields: IndexMap::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, type_tag: impl Into<String>) -> Self {
        self.fields.insert(name.into(), type_tag.into());
        self
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        match self.path.as_deref().map(str::trim) {
            None | Some("") => return Err("missing 'path'".to_string()),
            Some(_) => {}
        }

        let method = self
            .method
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .ok_or_else(|| "missing 'method'".to_string())?;
        if !SUPPORTED_METHODS
            .iter()
            .any(|m| m.eq_ignore_ascii_case(method))
        {
            return Err(format!(
                "unsupported method '{}' (expected one of {})",
                method,
                SUPPORTED_METHODS.join("|")
            ));
        }

        if let Some((field, _)) = self.fields.iter().find(|(name, _)| name.trim().is_empty()) {
            return Err(format!("empty field name '{}'", field));
        }

        Ok(())
    }
}

// ============================================================================
// HTTP Config
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// 시도당 타임아웃 (초)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
        }
    }
}

impl HttpConfig {
    fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(Error::invalid_config("'http.timeout_secs' must be at least 1"));
        }
        Ok(())
    }
}

// ============================================================================
// Retry Config
// ============================================================================

/// 지수 백오프 재시도 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// 최대 시도 횟수 (첫 시도 포함)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// 두 번째 시도 전 대기 (밀리초)
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// 대기 상한 (밀리초)
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl RetryConfig {
    fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(Error::invalid_config("'retry.max_attempts' must be at least 1"));
        }
        if self.base_delay_ms > self.max_delay_ms {
            return Err(Error::invalid_config(format!(
                "'retry.base_delay_ms' ({}) exceeds 'retry.max_delay_ms' ({})",
                self.base_delay_ms, self.max_delay_ms
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Tools Config
// ============================================================================

/// 시드/초기화 도구가 사용하는 고정 대상
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default = "default_product_endpoint")]
    pub product_endpoint: String,

    #[serde(default = "default_customer_endpoint")]
    pub customer_endpoint: String,

    /// 관리용 초기화 경로. 레지스트리에 등록되지 않는다.
    #[serde(default = "default_reset_path")]
    pub reset_path: String,

    #[serde(default = "default_reset_method")]
    pub reset_method: String,

    /// 한 번의 시드 호출로 생성할 수 있는 최대 개수
    #[serde(default = "default_max_seed_count")]
    pub max_seed_count: u32,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            product_endpoint: default_product_endpoint(),
            customer_endpoint: default_customer_endpoint(),
            reset_path: default_reset_path(),
            reset_method: default_reset_method(),
            max_seed_count: default_max_seed_count(),
        }
    }
}

impl ToolsConfig {
    fn validate(&self, config: &BridgeConfig) -> Result<()> {
        // A seed target missing from `endpoints` only disables that tool.
        for (key, name) in [
            ("product_endpoint", &self.product_endpoint),
            ("customer_endpoint", &self.customer_endpoint),
        ] {
            if !config.endpoints.contains_key(name.as_str()) {
                warn!(
                    "'tools.{}' refers to unknown endpoint '{}'; the tool will report UnknownEndpoint",
                    key, name
                );
            }
        }

        if self.reset_path.trim().is_empty() {
            return Err(Error::invalid_config("'tools.reset_path' must not be empty"));
        }
        if !SUPPORTED_METHODS
            .iter()
            .any(|m| m.eq_ignore_ascii_case(self.reset_method.trim()))
        {
            return Err(Error::invalid_config(format!(
                "unsupported 'tools.reset_method' '{}'",
                self.reset_method
            )));
        }
        if self.max_seed_count == 0 {
            return Err(Error::invalid_config("'tools.max_seed_count' must be at least 1"));
        }
        Ok(())
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    2_000
}

fn default_max_delay_ms() -> u64 {
    30_000
}

fn default_product_endpoint() -> String {
    "products".to_string()
}

fn default_customer_endpoint() -> String {
    "customers".to_string()
}

fn default_reset_path() -> String {
    "/admin/reset-test-db".to_string()
}

fn default_reset_method() -> String {
    "POST".to_string()
}

fn default_max_seed_count() -> u32 {
    100
}
