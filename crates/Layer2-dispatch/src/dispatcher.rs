//! Dispatch Facade - 도구 호출이 도달하는 단일 진입점
//!
//! 순서: 엔드포인트 조회 -> payload 결정 -> URL 조합 -> 실행.
//! 호출 단위 에러는 모두 `DispatchResult::Failure`로 변환되며,
//! 이 경계 밖으로 `Err`를 던지지 않는다.

use crate::executor::ResilientExecutor;
use crate::fake::{FakeValueProducer, RandomFaker};
use crate::registry::{EndpointRegistry, EndpointSpec, HttpMethod};
use crate::resolver::{Payload, PayloadRequest, PayloadResolver};
use crate::result::DispatchResult;
use crate::retry::RetryPolicy;
use crate::transport::{HttpTransport, ReqwestTransport};
use seedbridge_foundation::{BridgeConfig, Error, Result};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Administrative reset target. Not a registry entry, so it
/// can't be reached through `dispatch` by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminEndpoint {
    pub method: HttpMethod,
    pub path: String,
}

impl AdminEndpoint {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
        }
    }
}

impl Default for AdminEndpoint {
    fn default() -> Self {
        Self::new(HttpMethod::Post, "/admin/reset-test-db")
    }
}

/// One item of a batch seed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeedOutcome {
    pub result: DispatchResult,

    /// Generated payload, echoed back on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Payload>,
}

/// Join a base URL and an endpoint path with exactly one slash
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Entry point for every tool call
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<EndpointRegistry>,
    base_url: Arc<str>,
    resolver: PayloadResolver,
    executor: ResilientExecutor,
    admin: AdminEndpoint,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<EndpointRegistry>,
        base_url: impl Into<String>,
        resolver: PayloadResolver,
        executor: ResilientExecutor,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            registry,
            base_url: Arc::from(base_url),
            resolver,
            executor,
            admin: AdminEndpoint::default(),
        }
    }

    pub fn with_admin_endpoint(mut self, admin: AdminEndpoint) -> Self {
        self.admin = admin;
        self
    }

    /// Production wiring from a loaded configuration
    pub fn from_config(config: &BridgeConfig) -> Result<Self> {
        let transport = ReqwestTransport::from_config(&config.http)
            .map_err(|e| Error::Internal(e.to_string()))?;
        Self::with_parts(config, Arc::new(transport), Arc::new(RandomFaker::new()))
    }

    /// Wiring with explicit transport and producer
    pub fn with_parts(
        config: &BridgeConfig,
        transport: Arc<dyn HttpTransport>,
        producer: Arc<dyn FakeValueProducer>,
    ) -> Result<Self> {
        let registry = EndpointRegistry::from_config(config)?;
        let admin_method = config
            .tools
            .reset_method
            .parse::<HttpMethod>()
            .map_err(Error::InvalidConfiguration)?;

        let executor = ResilientExecutor::new(transport, RetryPolicy::from_config(&config.retry));

        info!(
            "Dispatcher ready: {} endpoint(s) at {}",
            registry.len(),
            config.base_url()
        );

        Ok(Self::new(
            Arc::new(registry),
            config.base_url(),
            PayloadResolver::new(producer),
            executor,
        )
        .with_admin_endpoint(AdminEndpoint::new(admin_method, config.tools.reset_path.clone())))
    }

    pub fn registry(&self) -> &EndpointRegistry {
        &self.registry
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url_for(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    /// Resolve, prepare and execute one endpoint call.
    pub async fn dispatch(&self, endpoint_name: &str, request: PayloadRequest) -> DispatchResult {
        let spec = match self.registry.resolve(endpoint_name) {
            Ok(spec) => spec,
            Err(e) => {
                debug!("dispatch rejected: {}", e);
                return e.into();
            }
        };

        self.dispatch_spec(spec, &request).await.0
    }

    /// Run `count` synthesis dispatches sequentially against one endpoint.
    pub async fn seed(&self, endpoint_name: &str, overrides: &Payload, count: u32) -> Vec<SeedOutcome> {
        let spec = match self.registry.resolve(endpoint_name) {
            Ok(spec) => spec,
            Err(e) => {
                return vec![SeedOutcome {
                    result: e.into(),
                    payload: None,
                }]
            }
        };

        let request = PayloadRequest::with_overrides(overrides.clone());
        let mut outcomes = Vec::with_capacity(count as usize);
        for i in 0..count {
            let (result, payload) = self.dispatch_spec(spec, &request).await;
            if !result.is_success() {
                warn!("seed {} #{} failed: {:?}", endpoint_name, i + 1, result.kind());
            }
            let payload = payload.filter(|_| result.is_success());
            outcomes.push(SeedOutcome { result, payload });
        }
        outcomes
    }

    /// Call the administrative reset endpoint. Destructive.
    pub async fn clear_test_data(&self) -> DispatchResult {
        let url = self.url_for(&self.admin.path);
        warn!("Clearing test data via {} {}", self.admin.method, url);
        self.executor
            .execute(self.admin.method, &url, &Payload::new())
            .await
    }

    async fn dispatch_spec(
        &self,
        spec: &EndpointSpec,
        request: &PayloadRequest,
    ) -> (DispatchResult, Option<Payload>) {
        let payload = match self.resolver.resolve(spec, request) {
            Ok(payload) => payload,
            Err(e) => {
                debug!("payload rejected for {}: {}", spec.name, e);
                return (e.into(), None);
            }
        };

        let url = self.url_for(&spec.path);
        let result = self.executor.execute(spec.method, &url, &payload).await;
        (result, Some(payload))
    }
}
