//! Structured logging context for key-value fields
//!
//! This module provides:
//! - `LogContext`: a flat, string-keyed map attached to a logger or a call
//! - `merge_context`: the shallow, override-only merge used for context
//!   inheritance
//!
//! Context merging is intentionally flat. Configuration uses the recursive
//! [`merge_config`](crate::core::config::merge_config) instead.

use super::error::{LoggerError, Result};
use super::formatter::stringify_value;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Context for structured logging with key-value fields
///
/// Fields are kept sorted by key so the rendered block is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogContext {
    fields: BTreeMap<String, Value>,
}

impl LogContext {
    /// Create a new empty log context
    pub fn new() -> Self {
        Self {
            fields: BTreeMap::new(),
        }
    }

    /// Add a field to the context
    pub fn with_field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Add a field to the context (mutable version)
    pub fn add_field<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Get all fields
    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    /// Check if context has any fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Format fields as `k1=v1,k2=v2`
    pub fn format_fields(&self) -> String {
        self.fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, stringify_value(v)))
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_fields())
    }
}

impl TryFrom<Value> for LogContext {
    type Error = LoggerError;

    /// Accepts only JSON objects; anything else is an `InvalidArgument`
    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self {
                fields: map.into_iter().collect(),
            }),
            Value::Null => Err(LoggerError::invalid_argument(
                "context must be a map, got nil",
            )),
            other => Err(LoggerError::invalid_argument(format!(
                "context must be a map, got {}",
                kind_of(&other)
            ))),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for LogContext
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "nil",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "map",
    }
}

/// Merge `overlay` onto `base`, one level deep
///
/// Overlay keys replace base keys; keys absent from the overlay keep the
/// base value. Inputs are never modified and the result is an independent
/// copy.
///
/// # Examples
///
/// ```
/// use cc_logger::core::log_context::{merge_context, LogContext};
///
/// let parent = LogContext::new().with_field("request_id", "abc");
/// let child = LogContext::new()
///     .with_field("request_id", "xyz")
///     .with_field("user", "bob");
///
/// let merged = merge_context(Some(&parent), Some(&child)).unwrap();
/// assert_eq!(merged.format_fields(), "request_id=xyz,user=bob");
/// assert!(merge_context(None, None).is_none());
/// ```
pub fn merge_context(
    base: Option<&LogContext>,
    overlay: Option<&LogContext>,
) -> Option<LogContext> {
    match (base, overlay) {
        (None, None) => None,
        (Some(base), None) => Some(base.clone()),
        (None, Some(overlay)) => Some(overlay.clone()),
        (Some(base), Some(overlay)) => {
            let mut merged = base.clone();
            for (key, value) in &overlay.fields {
                merged.fields.insert(key.clone(), value.clone());
            }
            Some(merged)
        }
    }
}
