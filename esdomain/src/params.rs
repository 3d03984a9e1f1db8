//! Raw caller-supplied parameters.
//!
//! Values arrive loosely typed (from a JSON params file or from command line
//! flags), so every accessor coerces and reports a [`ValidationError`] naming
//! the offending field.

use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{ParamsFileError, ValidationError};

pub type Result<T> = std::result::Result<T, ValidationError>;

/// Loosely typed option bag keyed by parameter name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawParams {
    values: Map<String, Value>,
}

impl RawParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(values) => Ok(Self { values }),
            other => Err(ValidationError::InvalidType {
                field: "params",
                expected: "a JSON object",
                value: other.to_string(),
            }),
        }
    }

    /// Load a params file holding a single JSON object.
    pub fn from_file(path: &Path) -> std::result::Result<Self, ParamsFileError> {
        let text = std::fs::read_to_string(path).map_err(|source| ParamsFileError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let value: Value = serde_json::from_str(&text).map_err(|source| ParamsFileError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_value(value).map_err(|source| ParamsFileError::Params {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Set a parameter, replacing any previous value.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.values.insert(key.to_string(), value.into());
    }

    /// Set a parameter only when a value was supplied.
    pub fn set_opt<V: Into<Value>>(&mut self, key: &str, value: Option<V>) {
        if let Some(v) = value {
            self.set(key, v);
        }
    }

    /// Raw value; explicit `null` counts as absent.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key).filter(|v| !v.is_null())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn string(&self, field: &'static str) -> Result<Option<String>> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(other) => Err(invalid(field, "a string", other)),
        }
    }

    pub fn int(&self, field: &'static str) -> Result<Option<i64>> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::Number(n)) => n
                .as_i64()
                .map(Some)
                .ok_or_else(|| invalid(field, "an integer", &Value::Number(n.clone()))),
            Some(Value::String(s)) => s
                .trim()
                .parse::<i64>()
                .map(Some)
                .map_err(|_| invalid(field, "an integer", &Value::String(s.clone()))),
            Some(other) => Err(invalid(field, "an integer", other)),
        }
    }

    pub fn bool(&self, field: &'static str) -> Result<Option<bool>> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(Value::String(s)) => parse_bool(s)
                .map(Some)
                .ok_or_else(|| invalid(field, "a boolean", &Value::String(s.clone()))),
            Some(Value::Number(n)) => match n.as_i64() {
                Some(0) => Ok(Some(false)),
                Some(1) => Ok(Some(true)),
                _ => Err(invalid(field, "a boolean", &Value::Number(n.clone()))),
            },
            Some(other) => Err(invalid(field, "a boolean", other)),
        }
    }

    /// Comma-separated string or JSON array of strings; blanks are dropped.
    pub fn list(&self, field: &'static str) -> Result<Vec<String>> {
        match self.get(field) {
            None => Ok(Vec::new()),
            Some(Value::String(s)) => Ok(split_list(s)),
            Some(Value::Array(items)) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::String(s) => out.extend(split_list(s)),
                        other => return Err(invalid(field, "a list of strings", other)),
                    }
                }
                Ok(out)
            }
            Some(other) => Err(invalid(field, "a comma-separated list", other)),
        }
    }
}

/// Split a comma-separated list, trimming entries and dropping empty ones.
pub fn split_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(input: &str) -> Option<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn invalid(field: &'static str, expected: &'static str, value: &Value) -> ValidationError {
    ValidationError::InvalidType {
        field,
        expected,
        value: value.to_string(),
    }
}
