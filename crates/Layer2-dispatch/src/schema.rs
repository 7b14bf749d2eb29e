//! Field schema type tags and value normalization
//!
//! 엔드포인트 스키마의 타입 태그는 닫힌 집합이며, 값 검증은 순수 함수
//! `validate(tag, value)`로만 수행한다.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Declared type of a schema field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Any scalar, normalized to a JSON string
    String,

    /// Any number (or numeric string), normalized to a JSON number
    Float,

    /// Whole number only, normalized to a JSON integer
    Integer,

    /// Composite postal address, carried as a single-line string
    Address,
}

impl FieldType {
    pub const ALL: [FieldType; 4] = [
        FieldType::String,
        FieldType::Float,
        FieldType::Integer,
        FieldType::Address,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Float => "float",
            FieldType::Integer => "integer",
            FieldType::Address => "address",
        }
    }

    /// JSON Schema type used when publishing tool input schemas
    pub fn json_schema_type(&self) -> &'static str {
        match self {
            FieldType::String | FieldType::Address => "string",
            FieldType::Float => "number",
            FieldType::Integer => "integer",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        FieldType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(tag))
            .ok_or_else(|| {
                let known: Vec<_> = FieldType::ALL.iter().map(|t| t.as_str()).collect();
                format!("unknown type tag '{}' (expected one of {})", s, known.join("|"))
            })
    }
}

/// A value could not be converted to its declared type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("expected {expected}, got {found}")]
pub struct TypeMismatch {
    pub expected: FieldType,
    pub found: String,
}

impl TypeMismatch {
    fn new(expected: FieldType, value: &Value) -> Self {
        Self {
            expected,
            found: describe(value),
        }
    }
}

/// Convert `value` to the runtime shape required by `tag`.
pub fn validate(tag: FieldType, value: &Value) -> Result<Value, TypeMismatch> {
    match tag {
        FieldType::String | FieldType::Address => to_string_value(value),
        FieldType::Float => to_float(value),
        FieldType::Integer => to_integer(value),
    }
    .ok_or_else(|| TypeMismatch::new(tag, value))
}

fn to_string_value(value: &Value) -> Option<Value> {
    match value {
        Value::String(_) => Some(value.clone()),
        Value::Number(n) => Some(Value::String(n.to_string())),
        Value::Bool(b) => Some(Value::String(b.to_string())),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn to_float(value: &Value) -> Option<Value> {
    match value {
        Value::Number(_) => Some(value.clone()),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number),
        _ => None,
    }
}

fn to_integer(value: &Value) -> Option<Value> {
    match value {
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                Some(value.clone())
            } else {
                n.as_f64().and_then(whole_number)
            }
        }
        Value::String(s) => {
            let s = s.trim();
            match s.parse::<i64>() {
                Ok(i) => Some(Value::from(i)),
                Err(_) => s.parse::<f64>().ok().and_then(whole_number),
            }
        }
        _ => None,
    }
}

// i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

fn whole_number(f: f64) -> Option<Value> {
    if f.is_finite() && f.fract() == 0.0 && f >= -I64_BOUND && f < I64_BOUND {
        Some(Value::from(f as i64))
    } else {
        None
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "boolean".to_string(),
        Value::Number(n) => format!("number {}", n),
        Value::String(s) => format!("string \"{}\"", s),
        Value::Array(_) => "array".to_string(),
        Value::Object(_) => "object".to_string(),
    }
}
