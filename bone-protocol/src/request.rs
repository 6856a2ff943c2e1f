use serde_json::{Map, Value};

use crate::error::{BoneError, Result};

/// `api` value injected into requests that do not carry one.
pub const DEFAULT_API: i64 = 2;

/// An outbound JSON request.
///
/// Always carries a `command` string. `api` is filled in at encode time from
/// the connection's default unless the caller set it explicitly.
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    fields: Map<String, Value>,
}

impl Request {
    pub fn new(command: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("command".to_owned(), Value::String(command.into()));
        Self { fields }
    }

    /// Build from an arbitrary JSON object; it must contain a string `command`.
    pub fn from_map(fields: Map<String, Value>) -> Result<Self> {
        match fields.get("command") {
            Some(Value::String(_)) => Ok(Self { fields }),
            Some(other) => Err(BoneError::InvalidRequest(format!(
                "command must be a string, got {other}"
            ))),
            None => Err(BoneError::InvalidRequest("missing command".into())),
        }
    }

    /// Parse one request line as the instrument receives it.
    pub fn parse(line: &[u8]) -> Result<Self> {
        let line = line.strip_suffix(b"\n").unwrap_or(line);
        match serde_json::from_slice(line).map_err(BoneError::InvalidJson)? {
            Value::Object(fields) => Self::from_map(fields),
            other => Err(BoneError::InvalidRequest(format!(
                "expected a JSON object, got {other}"
            ))),
        }
    }

    pub fn with_payload(self, payload: Value) -> Self {
        self.with_field("payload", payload)
    }

    pub fn with_api(self, api: i64) -> Self {
        self.with_field("api", Value::from(api))
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    pub fn command(&self) -> &str {
        self.fields
            .get("command")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn api(&self) -> Option<i64> {
        self.fields.get("api").and_then(Value::as_i64)
    }

    pub fn payload(&self) -> Option<&Value> {
        self.fields.get("payload")
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Serialize to wire bytes: compact JSON with sorted keys and a trailing `\n`.
    pub fn to_bytes(&self, default_api: i64) -> Result<Vec<u8>> {
        let mut fields = self.fields.clone();
        fields
            .entry("api")
            .or_insert_with(|| Value::from(default_api));
        let mut bytes = serde_json::to_vec(&fields).map_err(BoneError::Serialize)?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}
