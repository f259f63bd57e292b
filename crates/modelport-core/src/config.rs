//! Typed, strict accessors over the parsed model configuration.
//!
//! A missing member is reported as `None` by the `find`-style helpers; a
//! member that exists with the wrong type is always an error.

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{path}: {message}")]
pub struct ConfigError {
    pub path: String,
    pub message: String,
}

impl ConfigError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// The parsed configuration document. The root must be a JSON object.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelConfig {
    root: Map<String, Value>,
}

impl ModelConfig {
    pub fn parse(bytes: &[u8]) -> ConfigResult<Self> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| ConfigError::new("<root>", format!("failed to parse JSON: {e}")))?;
        match value {
            Value::Object(root) => Ok(Self { root }),
            other => Err(ConfigError::new(
                "<root>",
                format!("expected an object, found {}", type_name(&other)),
            )),
        }
    }

    pub fn root(&self) -> Object<'_> {
        Object {
            path: String::new(),
            map: &self.root,
        }
    }
}

/// A borrowed JSON object together with its path from the document root.
#[derive(Clone, Debug)]
pub struct Object<'a> {
    path: String,
    map: &'a Map<String, Value>,
}

impl<'a> Object<'a> {
    pub fn path(&self) -> &str {
        if self.path.is_empty() {
            "<root>"
        } else {
            &self.path
        }
    }

    fn child_path(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{key}", self.path)
        }
    }

    pub fn find_object(&self, key: &str) -> ConfigResult<Option<Object<'a>>> {
        let path = self.child_path(key);
        match self.map.get(key) {
            None => Ok(None),
            Some(Value::Object(map)) => Ok(Some(Object { path, map })),
            Some(other) => Err(mismatch(path, "an object", other)),
        }
    }

    pub fn member(&self, key: &str) -> ConfigResult<&'a Value> {
        self.map
            .get(key)
            .ok_or_else(|| ConfigError::new(self.child_path(key), "missing required member"))
    }

    pub fn member_as_bool(&self, key: &str) -> ConfigResult<bool> {
        as_bool(&self.child_path(key), self.member(key)?)
    }

    pub fn member_as_str(&self, key: &str) -> ConfigResult<&'a str> {
        let path = self.child_path(key);
        match self.member(key)? {
            Value::String(s) => Ok(s),
            other => Err(mismatch(path, "a string", other)),
        }
    }

    pub fn member_as_array(&self, key: &str) -> ConfigResult<Array<'a>> {
        let path = self.child_path(key);
        match self.member(key)? {
            Value::Array(items) => Ok(Array { path, items }),
            other => Err(mismatch(path, "an array", other)),
        }
    }

    /// Like [`Self::member_as_array`] but an absent member is an empty array.
    pub fn optional_array(&self, key: &str) -> ConfigResult<Array<'a>> {
        if self.map.contains_key(key) {
            self.member_as_array(key)
        } else {
            Ok(Array {
                path: self.child_path(key),
                items: &[],
            })
        }
    }

    pub fn optional_bool(&self, key: &str, default: bool) -> ConfigResult<bool> {
        match self.map.get(key) {
            None => Ok(default),
            Some(value) => as_bool(&self.child_path(key), value),
        }
    }

    pub fn optional_i64(&self, key: &str, default: i64) -> ConfigResult<i64> {
        match self.map.get(key) {
            None => Ok(default),
            Some(value) => as_i64(&self.child_path(key), value),
        }
    }

    pub fn member_as_string_array(&self, key: &str) -> ConfigResult<Vec<String>> {
        self.member_as_array(key)?.strings()
    }
}

#[derive(Clone, Debug)]
pub struct Array<'a> {
    path: String,
    items: &'a [Value],
}

impl<'a> Array<'a> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn index_as_object(&self, idx: usize) -> ConfigResult<Object<'a>> {
        let path = format!("{}[{idx}]", self.path);
        match self.items.get(idx) {
            Some(Value::Object(map)) => Ok(Object { path, map }),
            Some(other) => Err(mismatch(path, "an object", other)),
            None => Err(ConfigError::new(path, "index out of range")),
        }
    }

    pub fn objects(&self) -> impl Iterator<Item = ConfigResult<Object<'a>>> + '_ {
        (0..self.items.len()).map(|idx| self.index_as_object(idx))
    }

    pub fn strings(&self) -> ConfigResult<Vec<String>> {
        self.items
            .iter()
            .enumerate()
            .map(|(idx, item)| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(mismatch(format!("{}[{idx}]", self.path), "a string", other)),
            })
            .collect()
    }
}

pub fn as_bool(path: &str, value: &Value) -> ConfigResult<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        other => Err(mismatch(path, "a boolean", other)),
    }
}

/// Integers arrive either as JSON numbers or, for 64-bit fields, as decimal
/// strings.
pub fn as_i64(path: &str, value: &Value) -> ConfigResult<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| ConfigError::new(path, format!("expected an integer, found {n}"))),
        Value::String(s) => s
            .parse::<i64>()
            .map_err(|_| ConfigError::new(path, format!("expected an integer, found \"{s}\""))),
        other => Err(mismatch(path, "an integer", other)),
    }
}

fn mismatch(path: impl Into<String>, expected: &str, found: &Value) -> ConfigError {
    ConfigError::new(path, format!("expected {expected}, found {}", type_name(found)))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
