//! Loosely-typed event payloads as delivered by the print server

use std::collections::BTreeMap;
use std::fmt;

/// A single payload value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Text
    Str(String),
    /// Integer
    Int(i64),
    /// Floating point
    Float(f64),
    /// Boolean
    Bool(bool),
    /// Explicit null
    Null,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

/// Payload validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    /// A required key is absent
    MissingKey {
        /// Event name
        event: String,
        /// Missing key
        key: &'static str,
    },
    /// A key holds a value of the wrong type
    WrongType {
        /// Event name
        event: String,
        /// Offending key
        key: &'static str,
        /// Expected type
        expected: &'static str,
    },
}

impl fmt::Display for PayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadError::MissingKey { event, key } => {
                write!(f, "{} payload is missing '{}'", event, key)
            }
            PayloadError::WrongType {
                event,
                key,
                expected,
            } => write!(f, "{} payload '{}' is not a {}", event, key, expected),
        }
    }
}

impl std::error::Error for PayloadError {}

/// String-keyed payload map
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    fields: BTreeMap<String, Value>,
}

impl Payload {
    /// Create an empty payload
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a field
    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.fields.insert(key.to_string(), value.into());
    }

    /// Raw field lookup
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    fn require(&self, event: &str, key: &'static str) -> Result<&Value, PayloadError> {
        self.fields.get(key).ok_or_else(|| PayloadError::MissingKey {
            event: event.to_string(),
            key,
        })
    }

    /// Required text field
    pub fn str_field(&self, event: &str, key: &'static str) -> Result<&str, PayloadError> {
        match self.require(event, key)? {
            Value::Str(s) => Ok(s),
            _ => Err(wrong_type(event, key, "string")),
        }
    }

    /// Required numeric field, integer or float
    pub fn number_field(&self, event: &str, key: &'static str) -> Result<f64, PayloadError> {
        match self.require(event, key)? {
            Value::Int(v) => Ok(*v as f64),
            Value::Float(v) => Ok(*v),
            _ => Err(wrong_type(event, key, "number")),
        }
    }

    /// Required boolean field
    pub fn bool_field(&self, event: &str, key: &'static str) -> Result<bool, PayloadError> {
        match self.require(event, key)? {
            Value::Bool(v) => Ok(*v),
            _ => Err(wrong_type(event, key, "boolean")),
        }
    }
}

fn wrong_type(event: &str, key: &'static str, expected: &'static str) -> PayloadError {
    PayloadError::WrongType {
        event: event.to_string(),
        key,
        expected,
    }
}

/// An event as received from the host: a name plus its payload
#[derive(Debug, Clone, PartialEq)]
pub struct PendingEvent {
    /// Event name, e.g. `"PrintStarted"`
    pub name: String,
    /// Event payload
    pub payload: Payload,
}

impl PendingEvent {
    /// Create a pending event
    pub fn new(name: &str, payload: Payload) -> Self {
        Self {
            name: name.to_string(),
            payload,
        }
    }
}
