//! Untyped action parameters and their coercion rules.
//!
//! The intent parser emits parameters as loose JSON: a recipient may be a
//! string or a list, a count may be a number or a numeric string. Every
//! accessor here treats `null` the same as an absent key and treats
//! whitespace-only strings as absent.

use crate::DispatchError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Prefix of unresolved template values such as `{{previous.id}}`.
pub const PLACEHOLDER_PREFIX: &str = "{{";

/// Whether a value is a template placeholder rather than a literal ID.
pub fn is_placeholder(value: &str) -> bool {
    value.starts_with(PLACEHOLDER_PREFIX)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(Map<String, Value>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> &mut Self {
        self.0.insert(key.into(), value);
        self
    }

    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.insert(key, value);
        self
    }

    /// Raw value, with `null` treated as absent.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Scalar value as a trimmed, non-empty string.
    pub fn string(&self, key: &str) -> Option<String> {
        self.get(key).and_then(scalar_to_string)
    }

    /// First non-empty string among several aliases.
    pub fn string_any(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|k| self.string(k))
    }

    pub fn require_string(&self, action: &str, key: &str) -> Result<String, DispatchError> {
        self.string(key)
            .ok_or_else(|| DispatchError::missing_parameter(action, key))
    }

    /// A single string or a list of strings, normalized to a list.
    /// Empty entries are dropped.
    pub fn string_list(&self, key: &str) -> Vec<String> {
        match self.get(key) {
            Some(Value::Array(items)) => items.iter().filter_map(scalar_to_string).collect(),
            Some(v) => scalar_to_string(v).into_iter().collect(),
            None => Vec::new(),
        }
    }

    /// Literal ID under `key`, ignoring template placeholders.
    pub fn literal_id(&self, key: &str) -> Option<String> {
        self.string(key).filter(|s| !is_placeholder(s))
    }

    /// Literal IDs under `key`, ignoring template placeholders.
    pub fn literal_ids(&self, key: &str) -> Vec<String> {
        self.string_list(key)
            .into_iter()
            .filter(|s| !is_placeholder(s))
            .collect()
    }

    /// Positive count under the first present alias.
    ///
    /// Accepts JSON numbers and numeric strings. Zero and negative values are
    /// rejected since every count bounds a fetch or a context slice.
    pub fn count(&self, action: &str, keys: &[&str]) -> Result<Option<usize>, DispatchError> {
        let Some((key, value)) = keys.iter().find_map(|k| self.get(k).map(|v| (*k, v))) else {
            return Ok(None);
        };

        let parsed = match value {
            Value::Number(n) => n.as_u64().map(|n| n as usize),
            Value::String(s) => s.trim().parse::<usize>().ok(),
            _ => None,
        };

        match parsed {
            Some(n) if n > 0 => Ok(Some(n)),
            _ => Err(DispatchError::invalid_parameter(
                action,
                key,
                format!("expected a positive integer, got {}", value),
            )),
        }
    }
}

impl From<Map<String, Value>> for Params {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn scalar_to_string(v: &Value) -> Option<String> {
    let s = match v {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    if s.is_empty() { None } else { Some(s) }
}
