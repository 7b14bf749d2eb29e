//! End-to-end dispatch against a mock HTTP server using the real reqwest transport

use async_trait::async_trait;
use parking_lot::Mutex;
use seedbridge_dispatch::{
    Dispatcher, EndpointRegistry, FailureKind, Payload, PayloadRequest, PayloadResolver,
    RandomFaker, ReqwestTransport, ResilientExecutor, RetryPolicy, Sleeper,
};
use seedbridge_foundation::{BridgeConfig, EndpointConfig};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Records backoff delays so retries don't wait on the wall clock
#[derive(Default)]
struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    fn new() -> Self {
        Self::default()
    }

    fn delays(&self) -> Vec<Duration> {
        self.delays.lock().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().push(duration);
    }
}

fn config(base_url: &str) -> BridgeConfig {
    BridgeConfig::new(base_url)
        .endpoint(
            "products",
            EndpointConfig::new("POST", "/products")
                .field("name", "string")
                .field("price", "float")
                .field("stockQuantity", "integer"),
        )
        .endpoint(
            "customers",
            EndpointConfig::new("POST", "/customers")
                .field("email", "string")
                .field("address", "address"),
        )
        .endpoint(
            "search",
            EndpointConfig::new("GET", "/products/search").field("q", "string"),
        )
}

fn dispatcher(base_url: &str, max_attempts: u32) -> (Dispatcher, Arc<RecordingSleeper>) {
    let registry = EndpointRegistry::from_config(&config(base_url)).unwrap();
    let sleeper = Arc::new(RecordingSleeper::new());
    let executor = ResilientExecutor::new(
        Arc::new(ReqwestTransport::new(Duration::from_secs(5)).unwrap()),
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(50),
            max_delay: Duration::from_millis(500),
        },
    )
    .with_sleeper(sleeper.clone());

    let dispatcher = Dispatcher::new(
        Arc::new(registry),
        base_url,
        PayloadResolver::new(Arc::new(RandomFaker::seeded(11))),
        executor,
    );
    (dispatcher, sleeper)
}

fn object(value: Value) -> Payload {
    value.as_object().cloned().unwrap()
}

#[tokio::test]
async fn test_post_scenario() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/products"))
        .and(body_json(json!({"name": "Laptop", "price": 1200, "stockQuantity": 50})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 1})))
        .expect(1)
        .mount(&server)
        .await;

    let (dispatcher, _) = dispatcher(&format!("{}/api", server.uri()), 3);
    let result = dispatcher
        .dispatch(
            "products",
            PayloadRequest::supplied(object(
                json!({"name": "Laptop", "price": 1200, "stockQuantity": 50}),
            )),
        )
        .await;

    assert_eq!(
        result.to_json(),
        json!({"status": "success", "status_code": 201, "response_body": {"id": 1}, "attempts": 1})
    );
}

#[tokio::test]
async fn test_retries_503_then_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/customers"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/customers"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 9})))
        .with_priority(2)
        .mount(&server)
        .await;

    let (dispatcher, sleeper) = dispatcher(&format!("{}/api", server.uri()), 3);
    let result = dispatcher
        .dispatch("customers", PayloadRequest::synthesize())
        .await;

    assert!(result.is_success(), "{:?}", result);
    assert_eq!(result.attempts(), 3);
    assert_eq!(
        sleeper.delays(),
        vec![Duration::from_millis(50), Duration::from_millis(100)]
    );

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 3);
    let body: Value = serde_json::from_slice(&received[0].body).unwrap();
    assert!(body["email"].as_str().unwrap().contains('@'));
    assert!(body["address"].is_string());
}

#[tokio::test]
async fn test_404_single_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not Found"})))
        .expect(1)
        .mount(&server)
        .await;

    let (dispatcher, sleeper) = dispatcher(&format!("{}/api", server.uri()), 3);
    let result = dispatcher
        .dispatch("products", PayloadRequest::synthesize())
        .await;

    let failure = result.failure().unwrap();
    assert_eq!(failure.kind, FailureKind::ClientError);
    assert_eq!(failure.attempts_made, 1);
    assert_eq!(failure.status_code, Some(404));
    assert!(sleeper.delays().is_empty());
}

#[tokio::test]
async fn test_exhausts_on_persistent_500() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(2)
        .mount(&server)
        .await;

    let (dispatcher, _) = dispatcher(&format!("{}/api", server.uri()), 2);
    let result = dispatcher
        .dispatch("products", PayloadRequest::synthesize())
        .await;

    let failure = result.failure().unwrap();
    assert_eq!(failure.kind, FailureKind::TransientExhausted);
    assert_eq!(failure.attempts_made, 2);
    assert!(failure.message.contains("boom"));
}

#[tokio::test]
async fn test_get_sends_query_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products/search"))
        .and(query_param("q", "lamp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 4}])))
        .expect(1)
        .mount(&server)
        .await;

    let (dispatcher, _) = dispatcher(&format!("{}/api/", server.uri()), 3);
    let result = dispatcher
        .dispatch("search", PayloadRequest::supplied(object(json!({"q": "lamp"}))))
        .await;

    assert!(result.is_success(), "{:?}", result);
}

#[tokio::test]
async fn test_connection_refused_is_retried() {
    // Nothing listens on port 1.
    let (dispatcher, sleeper) = dispatcher("http://127.0.0.1:1/api", 2);
    let result = dispatcher
        .dispatch("products", PayloadRequest::synthesize())
        .await;

    let failure = result.failure().unwrap();
    assert_eq!(failure.kind, FailureKind::TransientExhausted);
    assert_eq!(failure.attempts_made, 2);
    assert_eq!(sleeper.delays().len(), 1);
}
