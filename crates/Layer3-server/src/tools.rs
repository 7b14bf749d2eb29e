//! Tool Surface - MCP 도구 정의와 어댑터
//!
//! 도구는 인자를 해석해 `Dispatcher`에 넘기는 얇은 어댑터다.
//! 디스패치 결과(`DispatchResult`)는 가공 없이 JSON으로 돌려준다.
//!
//! | Tool | Dispatch |
//! |------|----------|
//! | `call_endpoint` | validation mode, any registered endpoint |
//! | `seed_test_product` | synthesis mode, `tools.product_endpoint` |
//! | `seed_test_customer` | synthesis mode, `tools.customer_endpoint` |
//! | `clear_test_data` | admin reset endpoint, requires `confirm: true` |

use seedbridge_dispatch::{
    DispatchResult, Dispatcher, FakeValueProducer, FieldCategory, FieldType, Payload,
    PayloadRequest, SeedOutcome,
};
use seedbridge_foundation::ToolsConfig;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const CALL_ENDPOINT: &str = "call_endpoint";
pub const SEED_TEST_PRODUCT: &str = "seed_test_product";
pub const SEED_TEST_CUSTOMER: &str = "seed_test_customer";
pub const CLEAR_TEST_DATA: &str = "clear_test_data";

const CATEGORY_FIELD: &str = "category";

// ============================================================================
// Errors
// ============================================================================

/// Errors raised before a tool reaches the dispatcher
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },
}

impl ToolError {
    fn invalid(tool: &str, reason: impl Into<String>) -> Self {
        ToolError::InvalidArguments {
            tool: tool.to_string(),
            reason: reason.into(),
        }
    }
}

// ============================================================================
// Tool definitions
// ============================================================================

/// Tool definition published through `tools/list`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDef {
    pub name: String,
    pub description: String,
    pub parameters: ToolParameters,
}

/// JSON Schema of a tool's arguments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolParameters {
    #[serde(rename = "type")]
    pub schema_type: String,

    pub properties: Value,

    #[serde(default)]
    pub required: Vec<String>,
}

impl ToolDef {
    pub fn builder(name: impl Into<String>, description: impl Into<String>) -> ToolDefBuilder {
        ToolDefBuilder::new(name, description)
    }

    /// Input schema as a JSON value
    pub fn input_schema(&self) -> Value {
        json!({
            "type": self.parameters.schema_type,
            "properties": self.parameters.properties,
            "required": self.parameters.required,
        })
    }
}

pub struct ToolDefBuilder {
    name: String,
    description: String,
    properties: Map<String, Value>,
    required: Vec<String>,
}

impl ToolDefBuilder {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            properties: Map::new(),
            required: vec![],
        }
    }

    fn param(mut self, name: impl Into<String>, schema: Value, required: bool) -> Self {
        let name = name.into();
        self.properties.insert(name.clone(), schema);
        if required {
            self.required.push(name);
        }
        self
    }

    pub fn string_param(
        self,
        name: impl Into<String>,
        description: impl Into<String>,
        required: bool,
    ) -> Self {
        let schema = json!({"type": "string", "description": description.into()});
        self.param(name, schema, required)
    }

    /// Integer parameter with inclusive bounds
    pub fn integer_param(
        self,
        name: impl Into<String>,
        description: impl Into<String>,
        minimum: u32,
        maximum: u32,
        required: bool,
    ) -> Self {
        let schema = json!({
            "type": "integer",
            "description": description.into(),
            "minimum": minimum,
            "maximum": maximum
        });
        self.param(name, schema, required)
    }

    pub fn boolean_param(
        self,
        name: impl Into<String>,
        description: impl Into<String>,
        required: bool,
    ) -> Self {
        let schema = json!({"type": "boolean", "description": description.into()});
        self.param(name, schema, required)
    }

    pub fn object_param(
        self,
        name: impl Into<String>,
        description: impl Into<String>,
        required: bool,
    ) -> Self {
        let schema = json!({"type": "object", "description": description.into()});
        self.param(name, schema, required)
    }

    /// Object parameter matching any one of the given schemas
    pub fn one_of_param(
        self,
        name: impl Into<String>,
        description: impl Into<String>,
        schemas: Vec<Value>,
        required: bool,
    ) -> Self {
        let schema = json!({
            "type": "object",
            "description": description.into(),
            "anyOf": schemas
        });
        self.param(name, schema, required)
    }

    pub fn enum_param(
        self,
        name: impl Into<String>,
        description: impl Into<String>,
        values: Vec<&str>,
        required: bool,
    ) -> Self {
        let schema = json!({
            "type": "string",
            "description": description.into(),
            "enum": values
        });
        self.param(name, schema, required)
    }

    pub fn build(self) -> ToolDef {
        ToolDef {
            name: self.name,
            description: self.description,
            parameters: ToolParameters {
                schema_type: "object".to_string(),
                properties: Value::Object(self.properties),
                required: self.required,
            },
        }
    }
}

// ============================================================================
// Arguments
// ============================================================================

/// Typed access to a tool's `arguments` object
struct Arguments<'a> {
    tool: &'a str,
    map: Map<String, Value>,
}

impl<'a> Arguments<'a> {
    fn parse(tool: &'a str, arguments: &Value) -> Result<Self, ToolError> {
        let map = match arguments {
            Value::Null => Map::new(),
            Value::Object(map) => map.clone(),
            other => {
                return Err(ToolError::invalid(
                    tool,
                    format!("arguments must be an object, got {}", json_kind(other)),
                ))
            }
        };
        Ok(Self { tool, map })
    }

    fn present(&self, key: &str) -> Option<&Value> {
        self.map.get(key).filter(|v| !v.is_null())
    }

    fn string(&self, key: &str) -> Result<Option<String>, ToolError> {
        match self.present(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(self.wrong_type(key, "a string", other)),
        }
    }

    fn object(&self, key: &str) -> Result<Option<Payload>, ToolError> {
        match self.present(key) {
            None => Ok(None),
            Some(Value::Object(map)) => Ok(Some(map.clone())),
            Some(other) => Err(self.wrong_type(key, "an object", other)),
        }
    }

    fn boolean(&self, key: &str) -> Result<Option<bool>, ToolError> {
        match self.present(key) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(self.wrong_type(key, "a boolean", other)),
        }
    }

    fn count(&self, key: &str, max: u32) -> Result<Option<u32>, ToolError> {
        let Some(value) = self.present(key) else {
            return Ok(None);
        };
        let n = seedbridge_dispatch::validate(FieldType::Integer, value)
            .ok()
            .and_then(|v| v.as_u64());
        match n {
            Some(n) if n >= 1 && n <= u64::from(max) => Ok(Some(n as u32)),
            _ => Err(ToolError::invalid(
                self.tool,
                format!("'{}' must be an integer between 1 and {}, got {}", key, max, value),
            )),
        }
    }

    fn wrong_type(&self, key: &str, expected: &str, found: &Value) -> ToolError {
        ToolError::invalid(
            self.tool,
            format!("'{}' must be {}, got {}", key, expected, json_kind(found)),
        )
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// Tool Surface
// ============================================================================

/// JSON returned by a tool and whether it represents a failure
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub value: Value,
    pub is_error: bool,
}

impl From<DispatchResult> for ToolOutput {
    fn from(result: DispatchResult) -> Self {
        Self {
            is_error: !result.is_success(),
            value: result.to_json(),
        }
    }
}

fn outcome_json(outcome: &SeedOutcome) -> Value {
    let mut value = outcome.result.to_json();
    if let (Value::Object(map), Some(payload)) = (&mut value, &outcome.payload) {
        map.insert("payload".to_string(), Value::Object(payload.clone()));
    }
    value
}

/// The four tools exposed over MCP
pub struct ToolSurface {
    dispatcher: Dispatcher,
    producer: Arc<dyn FakeValueProducer>,
    config: ToolsConfig,
}

impl ToolSurface {
    pub fn new(
        dispatcher: Dispatcher,
        producer: Arc<dyn FakeValueProducer>,
        config: ToolsConfig,
    ) -> Self {
        Self {
            dispatcher,
            producer,
            config,
        }
    }

    pub fn definitions(&self) -> Vec<ToolDef> {
        let registry = self.dispatcher.registry();
        let names = registry.names();
        let payloads = registry.iter().map(|spec| spec.payload_schema()).collect();
        let max = self.config.max_seed_count;

        vec![
            ToolDef::builder(
                CALL_ENDPOINT,
                format!(
                    "Call a configured API endpoint by name. The payload is validated against \
                     the endpoint's field schema before sending. Endpoints: {}",
                    names.join(", ")
                ),
            )
            .enum_param("endpoint_name", "Logical endpoint name", names.clone(), true)
            .one_of_param(
                "payload",
                "Field values for the request, shaped by the endpoint's schema",
                payloads,
                true,
            )
            .build(),
            ToolDef::builder(
                SEED_TEST_PRODUCT,
                "Create test products with generated data. Given fields override generated ones.",
            )
            .object_param("overrides", "Field values to use instead of generated ones", false)
            .string_param(
                CATEGORY_FIELD,
                "Product category; a random one is shared by the batch when omitted",
                false,
            )
            .integer_param("count", "Number of products to create", 1, max, false)
            .build(),
            ToolDef::builder(
                SEED_TEST_CUSTOMER,
                "Create test customers with generated data. Given fields override generated ones.",
            )
            .object_param("overrides", "Field values to use instead of generated ones", false)
            .integer_param("count", "Number of customers to create", 1, max, false)
            .build(),
            ToolDef::builder(
                CLEAR_TEST_DATA,
                "Reset the target database. DESTRUCTIVE: deletes all data. \
                 Only use against test environments.",
            )
            .boolean_param("confirm", "Must be true to proceed", true)
            .build(),
        ]
    }

    /// Run a tool by name.
    ///
    /// `Err` only for unknown tools and malformed arguments. Dispatch
    /// failures come back as `Ok` with `is_error` set.
    pub async fn call(&self, name: &str, arguments: &Value) -> Result<ToolOutput, ToolError> {
        debug!("tool call: {} {}", name, arguments);

        match name {
            CALL_ENDPOINT => self.call_endpoint(Arguments::parse(name, arguments)?).await,
            SEED_TEST_PRODUCT => self.seed_test_product(Arguments::parse(name, arguments)?).await,
            SEED_TEST_CUSTOMER => {
                self.seed_test_customer(Arguments::parse(name, arguments)?)
                    .await
            }
            CLEAR_TEST_DATA => self.clear_test_data(Arguments::parse(name, arguments)?).await,
            other => Err(ToolError::UnknownTool(other.to_string())),
        }
    }

    async fn call_endpoint(&self, args: Arguments<'_>) -> Result<ToolOutput, ToolError> {
        let endpoint = args
            .string("endpoint_name")?
            .ok_or_else(|| ToolError::invalid(args.tool, "'endpoint_name' is required"))?;
        let payload = args.object("payload")?.unwrap_or_default();

        let result = self
            .dispatcher
            .dispatch(&endpoint, PayloadRequest::supplied(payload))
            .await;
        Ok(result.into())
    }

    async fn seed_test_product(&self, args: Arguments<'_>) -> Result<ToolOutput, ToolError> {
        let mut overrides = args.object("overrides")?.unwrap_or_default();
        let count = args.count("count", self.config.max_seed_count)?;
        let endpoint = self.config.product_endpoint.as_str();

        if let Some(category) = args.string(CATEGORY_FIELD)? {
            overrides.insert(CATEGORY_FIELD.to_string(), Value::String(category));
        } else if !overrides.contains_key(CATEGORY_FIELD) && self.declares(endpoint, CATEGORY_FIELD) {
            let category = self.producer.produce(FieldCategory::Category, FieldType::String);
            overrides.insert(CATEGORY_FIELD.to_string(), category);
        }

        Ok(self.seed(endpoint, overrides, count).await)
    }

    async fn seed_test_customer(&self, args: Arguments<'_>) -> Result<ToolOutput, ToolError> {
        let overrides = args.object("overrides")?.unwrap_or_default();
        let count = args.count("count", self.config.max_seed_count)?;
        Ok(self
            .seed(&self.config.customer_endpoint, overrides, count)
            .await)
    }

    async fn clear_test_data(&self, args: Arguments<'_>) -> Result<ToolOutput, ToolError> {
        if args.boolean("confirm")? != Some(true) {
            info!("clear_test_data called without confirmation");
            return Ok(ToolOutput {
                value: json!({"status": "cancelled", "reason": "Confirmation required"}),
                is_error: false,
            });
        }
        Ok(self.dispatcher.clear_test_data().await.into())
    }

    /// Without `count` the single outcome is returned as an object,
    /// with `count` an array. A batch is an error only when every item failed.
    async fn seed(&self, endpoint: &str, overrides: Payload, count: Option<u32>) -> ToolOutput {
        let outcomes = self
            .dispatcher
            .seed(endpoint, &overrides, count.unwrap_or(1))
            .await;
        let failed = outcomes.iter().filter(|o| !o.result.is_success()).count();

        info!(
            "seeded {}: {} ok, {} failed",
            endpoint,
            outcomes.len() - failed,
            failed
        );

        let mut items: Vec<Value> = outcomes.iter().map(outcome_json).collect();
        match count {
            None => ToolOutput {
                value: items.pop().unwrap_or(Value::Null),
                is_error: failed > 0,
            },
            Some(_) => {
                if failed > 0 && failed < outcomes.len() {
                    warn!("partial seed of {}: {} of {} failed", endpoint, failed, outcomes.len());
                }
                ToolOutput {
                    value: Value::Array(items),
                    is_error: failed == outcomes.len(),
                }
            }
        }
    }

    fn declares(&self, endpoint: &str, field: &str) -> bool {
        self.dispatcher
            .registry()
            .resolve(endpoint)
            .ok()
            .and_then(|spec| spec.get_field(field))
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seedbridge_dispatch::testing::ScriptedTransport;
    use seedbridge_dispatch::{HttpMethod, HttpResponse, RandomFaker};
    use seedbridge_foundation::{BridgeConfig, EndpointConfig, RetryConfig};

    fn config() -> BridgeConfig {
        BridgeConfig::new("http://x/api")
            .endpoint(
                "products",
                EndpointConfig::new("POST", "/products")
                    .field("name", "string")
                    .field("price", "float")
                    .field("category", "string"),
            )
            .endpoint(
                "customers",
                EndpointConfig::new("POST", "/customers")
                    .field("email", "string")
                    .field("address", "address"),
            )
            .retry(RetryConfig {
                max_attempts: 2,
                base_delay_ms: 1,
                max_delay_ms: 1,
            })
    }

    fn surface(transport: Arc<ScriptedTransport>) -> ToolSurface {
        let config = config();
        let producer: Arc<dyn FakeValueProducer> = Arc::new(RandomFaker::seeded(3));
        let dispatcher = Dispatcher::with_parts(&config, transport, producer.clone()).unwrap();
        ToolSurface::new(dispatcher, producer, config.tools.clone())
    }

    fn created() -> Arc<ScriptedTransport> {
        Arc::new(ScriptedTransport::repeating(Ok(HttpResponse::new(
            201,
            r#"{"id":1}"#,
        ))))
    }

    #[test]
    fn test_definitions() {
        let surface = surface(created());
        let defs = surface.definitions();
        let names: Vec<&str> = defs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            vec![CALL_ENDPOINT, SEED_TEST_PRODUCT, SEED_TEST_CUSTOMER, CLEAR_TEST_DATA]
        );

        let schema = defs[0].input_schema();
        assert_eq!(
            schema["properties"]["endpoint_name"]["enum"],
            json!(["products", "customers"])
        );
        assert_eq!(schema["required"], json!(["endpoint_name", "payload"]));
        let payloads = &schema["properties"]["payload"]["anyOf"];
        assert_eq!(payloads[0]["title"], "products");
        assert_eq!(payloads[0]["properties"]["price"]["type"], "number");
        assert_eq!(payloads[1]["properties"]["address"]["type"], "string");
        assert_eq!(defs[1].input_schema()["properties"]["count"]["maximum"], json!(100));
        assert!(defs[3].description.contains("DESTRUCTIVE"));
    }

    #[tokio::test]
    async fn test_call_endpoint() {
        let transport = created();
        let surface = surface(transport.clone());

        let output = surface
            .call(
                CALL_ENDPOINT,
                &json!({
                    "endpoint_name": "products",
                    "payload": {"name": "Laptop", "price": 1200, "category": "electronics"}
                }),
            )
            .await
            .unwrap();

        assert!(!output.is_error);
        assert_eq!(
            output.value,
            json!({"status": "success", "status_code": 201, "response_body": {"id": 1}, "attempts": 1})
        );
        assert_eq!(transport.requests()[0].url, "http://x/api/products");
    }

    #[tokio::test]
    async fn test_call_endpoint_validation_failure() {
        let transport = created();
        let surface = surface(transport.clone());

        let output = surface
            .call(
                CALL_ENDPOINT,
                &json!({"endpoint_name": "products", "payload": {"name": "Laptop"}}),
            )
            .await
            .unwrap();

        assert!(output.is_error);
        assert_eq!(output.value["kind"], "PayloadValidationError");
        assert_eq!(output.value["attempts_made"], 0);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_argument_errors() {
        let surface = surface(created());

        let missing = surface.call(CALL_ENDPOINT, &json!({"payload": {}})).await;
        assert!(matches!(missing, Err(ToolError::InvalidArguments { .. })));

        let not_object = surface.call(CALL_ENDPOINT, &json!([1, 2])).await;
        assert!(matches!(not_object, Err(ToolError::InvalidArguments { .. })));

        let unknown = surface.call("drop_tables", &json!({})).await;
        assert_eq!(unknown, Err(ToolError::UnknownTool("drop_tables".to_string())));
    }

    #[tokio::test]
    async fn test_seed_product_single() {
        let transport = created();
        let surface = surface(transport.clone());

        let output = surface
            .call(SEED_TEST_PRODUCT, &json!({"overrides": {"price": 9.5}}))
            .await
            .unwrap();

        assert!(!output.is_error);
        assert_eq!(output.value["status"], "success");
        assert_eq!(output.value["payload"]["price"], json!(9.5));
        assert!(output.value["payload"]["category"].is_string());

        let body = transport.requests()[0].body.clone().unwrap();
        assert_eq!(body["category"], output.value["payload"]["category"]);
    }

    #[tokio::test]
    async fn test_seed_product_batch_shares_category() {
        let transport = created();
        let surface = surface(transport.clone());

        let output = surface
            .call(SEED_TEST_PRODUCT, &json!({"count": 3}))
            .await
            .unwrap();

        let items = output.value.as_array().unwrap();
        assert_eq!(items.len(), 3);
        let category = &items[0]["payload"]["category"];
        assert!(items.iter().all(|i| &i["payload"]["category"] == category));
        assert_eq!(transport.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_seed_explicit_category() {
        let transport = created();
        let surface = surface(transport.clone());

        surface
            .call(SEED_TEST_PRODUCT, &json!({"category": "garden"}))
            .await
            .unwrap();

        let body = transport.requests()[0].body.clone().unwrap();
        assert_eq!(body["category"], "garden");
    }

    #[tokio::test]
    async fn test_seed_count_bounds() {
        let surface = surface(created());

        for count in [json!(0), json!(101), json!(-1), json!(2.5), json!("lots")] {
            let result = surface
                .call(SEED_TEST_CUSTOMER, &json!({"count": count}))
                .await;
            assert!(matches!(result, Err(ToolError::InvalidArguments { .. })));
        }
    }

    #[tokio::test]
    async fn test_seed_count_accepts_whole_numbers() {
        for count in [json!(3.0), json!("3")] {
            let transport = created();
            let surface = surface(transport.clone());

            let output = surface
                .call(SEED_TEST_CUSTOMER, &json!({"count": count}))
                .await
                .unwrap();

            assert_eq!(output.value.as_array().unwrap().len(), 3);
            assert_eq!(transport.requests().len(), 3);
        }
    }

    #[tokio::test]
    async fn test_seed_without_customer_endpoint() {
        let config = BridgeConfig::new("http://x/api").endpoint(
            "products",
            EndpointConfig::new("POST", "/products").field("name", "string"),
        );
        let transport = created();
        let producer: Arc<dyn FakeValueProducer> = Arc::new(RandomFaker::seeded(3));
        let dispatcher =
            Dispatcher::with_parts(&config, transport.clone(), producer.clone()).unwrap();
        let surface = ToolSurface::new(dispatcher, producer, config.tools.clone());

        let output = surface.call(SEED_TEST_CUSTOMER, &json!({})).await.unwrap();
        assert!(output.is_error);
        assert_eq!(output.value["kind"], "UnknownEndpoint");
        assert!(transport.requests().is_empty());

        let product = surface.call(SEED_TEST_PRODUCT, &json!({})).await.unwrap();
        assert!(!product.is_error);
    }

    #[tokio::test]
    async fn test_seed_customers_unique_emails() {
        let surface = surface(created());

        let output = surface
            .call(SEED_TEST_CUSTOMER, &json!({"count": 5}))
            .await
            .unwrap();

        let mut emails: Vec<String> = output
            .value
            .as_array()
            .unwrap()
            .iter()
            .map(|i| i["payload"]["email"].as_str().unwrap().to_string())
            .collect();
        emails.sort();
        emails.dedup();
        assert_eq!(emails.len(), 5);
    }

    #[tokio::test]
    async fn test_seed_failure_is_error() {
        let transport = Arc::new(ScriptedTransport::repeating(Ok(HttpResponse::new(
            422,
            r#"{"detail":"bad"}"#,
        ))));
        let surface = surface(transport);

        let single = surface.call(SEED_TEST_CUSTOMER, &json!({})).await.unwrap();
        assert!(single.is_error);
        assert_eq!(single.value["kind"], "ClientError");
        assert!(single.value.get("payload").is_none());

        let batch = surface
            .call(SEED_TEST_CUSTOMER, &json!({"count": 2}))
            .await
            .unwrap();
        assert!(batch.is_error);
    }

    #[tokio::test]
    async fn test_clear_requires_confirmation() {
        let transport = created();
        let surface = surface(transport.clone());

        for args in [json!({}), json!({"confirm": false})] {
            let output = surface.call(CLEAR_TEST_DATA, &args).await.unwrap();
            assert!(!output.is_error);
            assert_eq!(
                output.value,
                json!({"status": "cancelled", "reason": "Confirmation required"})
            );
        }
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_clear_confirmed() {
        let transport = Arc::new(ScriptedTransport::repeating(Ok(HttpResponse::new(
            200,
            r#"{"status":"reset"}"#,
        ))));
        let surface = surface(transport.clone());

        let output = surface
            .call(CLEAR_TEST_DATA, &json!({"confirm": true}))
            .await
            .unwrap();

        assert!(!output.is_error);
        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, HttpMethod::Post);
        assert_eq!(requests[0].url, "http://x/api/admin/reset-test-db");
    }
}
