//! Payload Resolver
//!
//! 두 가지 모드:
//! - Validation: 호출자가 준 payload에 스키마 필드가 모두 있는지, 타입이 맞는지 검사
//! - Synthesis: 덮어쓰지 않은 필드를 fake producer로 채움
//!
//! 누락 필드는 엄격하게 거부하고, 스키마에 없는 추가 필드는 그대로 통과시킨다.

use crate::error::DispatchError;
use crate::fake::{FakeValueProducer, FieldCategory};
use crate::registry::{EndpointSpec, FieldSpec};
use crate::schema::validate;
use serde_json::{Map, Value};
use std::sync::Arc;

/// JSON object payload
pub type Payload = Map<String, Value>;

/// How the payload for a dispatch is obtained
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadRequest {
    /// Caller-supplied payload, validated against the schema
    Supplied(Payload),

    /// Generated test data; `overrides` take precedence and are still validated
    Synthesize { overrides: Payload },
}

impl PayloadRequest {
    pub fn supplied(payload: Payload) -> Self {
        PayloadRequest::Supplied(payload)
    }

    pub fn synthesize() -> Self {
        PayloadRequest::Synthesize {
            overrides: Payload::new(),
        }
    }

    pub fn with_overrides(overrides: Payload) -> Self {
        PayloadRequest::Synthesize { overrides }
    }
}

/// Resolves a request body for an endpoint schema
#[derive(Clone)]
pub struct PayloadResolver {
    producer: Arc<dyn FakeValueProducer>,
}

impl PayloadResolver {
    pub fn new(producer: Arc<dyn FakeValueProducer>) -> Self {
        Self { producer }
    }

    pub fn resolve(
        &self,
        spec: &EndpointSpec,
        request: &PayloadRequest,
    ) -> Result<Payload, DispatchError> {
        match request {
            PayloadRequest::Supplied(payload) => self.validate(spec, payload),
            PayloadRequest::Synthesize { overrides } => self.synthesize(spec, overrides),
        }
    }

    /// Validation mode. Fields are checked in schema declaration order, so
    /// the first missing or invalid field is reported deterministically.
    pub fn validate(&self, spec: &EndpointSpec, payload: &Payload) -> Result<Payload, DispatchError> {
        let mut resolved = payload.clone();

        for field in &spec.fields {
            let value = payload
                .get(&field.name)
                .ok_or_else(|| DispatchError::missing_field(&field.name, field.field_type))?;
            resolved.insert(field.name.clone(), normalize(field, value)?);
        }

        Ok(resolved)
    }

    /// Synthesis mode. A `null` override counts as "not overridden".
    pub fn synthesize(
        &self,
        spec: &EndpointSpec,
        overrides: &Payload,
    ) -> Result<Payload, DispatchError> {
        let mut resolved = Payload::new();

        for field in &spec.fields {
            let value = match overrides.get(&field.name) {
                Some(v) if !v.is_null() => normalize(field, v)?,
                _ => self.generate(field)?,
            };
            resolved.insert(field.name.clone(), value);
        }

        for (key, value) in overrides {
            if spec.get_field(key).is_none() {
                resolved.insert(key.clone(), value.clone());
            }
        }

        Ok(resolved)
    }

    fn generate(&self, field: &FieldSpec) -> Result<Value, DispatchError> {
        let category = FieldCategory::classify(&field.name, field.field_type);
        let value = self.producer.produce(category, field.field_type);

        match validate(field.field_type, &value) {
            Ok(v) => Ok(v),
            // Category value didn't fit the declared type; fall back to a
            // type-only value.
            Err(_) => {
                let fallback = self
                    .producer
                    .produce(FieldCategory::Generic, field.field_type);
                normalize(field, &fallback)
            }
        }
    }
}

fn normalize(field: &FieldSpec, value: &Value) -> Result<Value, DispatchError> {
    validate(field.field_type, value).map_err(|e| DispatchError::type_mismatch(&field.name, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::RandomFaker;
    use crate::registry::HttpMethod;
    use crate::schema::FieldType;
    use serde_json::json;

    fn products() -> EndpointSpec {
        EndpointSpec::new("products", HttpMethod::Post, "/products")
            .field("name", FieldType::String)
            .field("price", FieldType::Float)
            .field("stockQuantity", FieldType::Integer)
    }

    fn customers() -> EndpointSpec {
        EndpointSpec::new("customers", HttpMethod::Post, "/customers")
            .field("firstName", FieldType::String)
            .field("email", FieldType::String)
            .field("address", FieldType::Address)
            .field("loyaltyPoints", FieldType::Integer)
    }

    fn resolver() -> PayloadResolver {
        PayloadResolver::new(Arc::new(RandomFaker::seeded(3)))
    }

    fn object(value: Value) -> Payload {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_validation_passes_complete_payload() {
        let payload = object(json!({"name": "Laptop", "price": 1200, "stockQuantity": 50}));
        let resolved = resolver().validate(&products(), &payload).unwrap();
        assert_eq!(resolved, payload);
    }

    #[test]
    fn test_validation_coerces_numeric_strings() {
        let payload = object(json!({"name": 7, "price": "19.5", "stockQuantity": "3"}));
        let resolved = resolver().validate(&products(), &payload).unwrap();
        assert_eq!(
            Value::Object(resolved),
            json!({"name": "7", "price": 19.5, "stockQuantity": 3})
        );
    }

    #[test]
    fn test_missing_field_reported_in_declaration_order() {
        let payload = object(json!({"name": "Laptop"}));
        let err = resolver().validate(&products(), &payload).unwrap_err();
        assert_eq!(err, DispatchError::missing_field("price", FieldType::Float));
    }

    #[test]
    fn test_integer_rejects_fraction() {
        let payload = object(json!({"name": "Laptop", "price": 10, "stockQuantity": 2.5}));
        match resolver().validate(&products(), &payload).unwrap_err() {
            DispatchError::PayloadValidation {
                field, expected, ..
            } => {
                assert_eq!(field, "stockQuantity");
                assert_eq!(expected, FieldType::Integer);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_extra_fields_pass_through() {
        let payload = object(json!({
            "name": "Laptop", "price": 1, "stockQuantity": 1, "color": ["red"]
        }));
        let resolved = resolver().validate(&products(), &payload).unwrap();
        assert_eq!(resolved.get("color"), Some(&json!(["red"])));
    }

    #[test]
    fn test_synthesis_covers_exact_schema() {
        let spec = customers();
        let resolved = resolver().synthesize(&spec, &Payload::new()).unwrap();

        let keys: Vec<_> = resolved.keys().map(String::as_str).collect();
        assert_eq!(keys.len(), spec.fields.len());
        for field in &spec.fields {
            let value = resolved.get(&field.name).unwrap();
            assert!(validate(field.field_type, value).is_ok(), "{} = {}", field.name, value);
        }
        assert!(resolved["email"].as_str().unwrap().contains('@'));
        assert!(resolved["loyaltyPoints"].is_i64());
    }

    #[test]
    fn test_synthesis_overrides_take_precedence() {
        let overrides = object(json!({"price": "9.99", "name": null}));
        let resolved = resolver().synthesize(&products(), &overrides).unwrap();

        assert_eq!(resolved["price"], json!(9.99));
        assert!(resolved["name"].is_string());
    }

    #[test]
    fn test_synthesis_validates_overrides() {
        let overrides = object(json!({"stockQuantity": "lots"}));
        let err = resolver().synthesize(&products(), &overrides).unwrap_err();
        assert_eq!(err.kind(), crate::result::FailureKind::PayloadValidationError);
    }

    #[test]
    fn test_resolve_dispatches_by_mode() {
        let spec = products();
        let r = resolver();
        assert!(r.resolve(&spec, &PayloadRequest::synthesize()).is_ok());
        assert!(r
            .resolve(&spec, &PayloadRequest::supplied(Payload::new()))
            .is_err());
    }
}
