//! Endpoint Registry - 논리 이름 -> HTTP 메서드/경로/스키마
//!
//! 시작 시 `BridgeConfig`에서 한 번 만들어지고 이후 읽기 전용이다.
//! 알 수 없는 메서드나 타입 태그는 호출 시점이 아니라 여기서 거부된다.

use crate::error::DispatchError;
use crate::schema::FieldType;
use indexmap::IndexMap;
use seedbridge_foundation::{BridgeConfig, EndpointConfig, Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// HTTP method supported by endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// POST/PUT carry the payload as a JSON body, GET/DELETE as query parameters
    pub fn has_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            _ => Err(format!("unsupported method '{}'", s)),
        }
    }
}

/// One declared schema field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub field_type: FieldType,
}

/// Resolved endpoint definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointSpec {
    pub name: String,
    pub method: HttpMethod,
    /// Path relative to the base URL
    pub path: String,
    /// Fields in declaration order. All are required.
    pub fields: Vec<FieldSpec>,
}

impl EndpointSpec {
    pub fn new(name: impl Into<String>, method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            method,
            path: path.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.fields.push(FieldSpec {
            name: name.into(),
            field_type,
        });
        self
    }

    /// Build from raw configuration, parsing method and type tags.
    pub fn from_config(name: &str, config: &EndpointConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| Error::invalid_config(format!("{}: {}", name, e)))?;

        let method = config
            .method
            .as_deref()
            .unwrap_or_default()
            .parse::<HttpMethod>()
            .map_err(|e| Error::invalid_config(format!("{}: {}", name, e)))?;

        let fields = config
            .fields
            .iter()
            .map(|(field, tag)| {
                tag.parse::<FieldType>()
                    .map(|field_type| FieldSpec {
                        name: field.clone(),
                        field_type,
                    })
                    .map_err(|e| {
                        Error::invalid_config(format!("{}.fields.{}: {}", name, field, e))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name: name.to_string(),
            method,
            path: config.path.clone().unwrap_or_default(),
            fields,
        })
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// JSON Schema of the payload, titled with the endpoint name
    pub fn payload_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|f| (f.name.clone(), json!({"type": f.field_type.json_schema_type()})))
            .collect();

        json!({
            "title": self.name,
            "type": "object",
            "properties": properties,
            "required": self.field_names().collect::<Vec<_>>(),
        })
    }
}

/// Immutable endpoint lookup table
#[derive(Debug, Clone, Default)]
pub struct EndpointRegistry {
    endpoints: IndexMap<String, EndpointSpec>,
}

impl EndpointRegistry {
    /// Build the registry from a validated configuration.
    pub fn from_config(config: &BridgeConfig) -> Result<Self> {
        config.validate()?;

        let endpoints = config
            .endpoints
            .iter()
            .map(|(name, e)| EndpointSpec::from_config(name, e).map(|spec| (name.clone(), spec)))
            .collect::<Result<IndexMap<_, _>>>()?;

        debug!("Endpoint registry loaded: {} endpoint(s)", endpoints.len());
        Ok(Self { endpoints })
    }

    /// Build directly from specs (later duplicates replace earlier ones)
    pub fn from_specs(specs: impl IntoIterator<Item = EndpointSpec>) -> Self {
        Self {
            endpoints: specs.into_iter().map(|s| (s.name.clone(), s)).collect(),
        }
    }

    pub fn resolve(&self, name: &str) -> std::result::Result<&EndpointSpec, DispatchError> {
        self.endpoints
            .get(name)
            .ok_or_else(|| DispatchError::UnknownEndpoint(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.endpoints.contains_key(name)
    }

    /// Endpoint names in configuration order
    pub fn names(&self) -> Vec<&str> {
        self.endpoints.keys().map(|s| s.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EndpointSpec> {
        self.endpoints.values()
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}
