use serde_json::{Map, Value};

use crate::error::{BoneError, Result};

/// Decode a frame body as JSON.
pub fn decode_json(body: &[u8]) -> Result<Value> {
    serde_json::from_slice(body).map_err(BoneError::InvalidJson)
}

/// The `payload` of a JSON response, split on the presence of `payload.error`.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    /// No `error` key. Holds the payload object (empty when absent).
    Success(Map<String, Value>),
    /// Server-reported failure message.
    Failure(String),
}

/// A decoded JSON response.
#[derive(Clone, Debug, PartialEq)]
pub struct Response {
    payload: Payload,
    raw: Value,
}

impl Response {
    /// Decode a frame body and classify its payload.
    pub fn parse(body: &[u8]) -> Result<Self> {
        decode_json(body).map(Self::from_value)
    }

    pub fn from_value(raw: Value) -> Self {
        let payload = match raw.get("payload") {
            Some(Value::Object(fields)) => match fields.get("error") {
                Some(Value::String(message)) => Payload::Failure(message.clone()),
                Some(other) => Payload::Failure(other.to_string()),
                None => Payload::Success(fields.clone()),
            },
            _ => Payload::Success(Map::new()),
        };
        Self { payload, raw }
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// The full response document as received.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn into_raw(self) -> Value {
        self.raw
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.payload, Payload::Failure(_))
    }

    pub fn error(&self) -> Option<&str> {
        match &self.payload {
            Payload::Failure(message) => Some(message),
            Payload::Success(_) => None,
        }
    }

    /// `payload.token` from a `request_token` reply.
    pub fn token(&self) -> Option<&str> {
        match &self.payload {
            Payload::Success(fields) => fields.get("token").and_then(Value::as_str),
            Payload::Failure(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn token_response() {
        let resp = Response::parse(br#"{"payload":{"token":"n0nce"}}"#).unwrap();
        assert_eq!(resp.token(), Some("n0nce"));
        assert!(!resp.is_failure());
    }

    #[test]
    fn error_response() {
        let resp = Response::parse(br#"{"payload":{"error":"bad credentials"}}"#).unwrap();
        assert_eq!(resp.payload(), &Payload::Failure("bad credentials".into()));
        assert_eq!(resp.error(), Some("bad credentials"));
        assert_eq!(resp.token(), None);
    }

    #[test]
    fn non_string_error_is_still_failure() {
        let resp = Response::from_value(json!({"payload": {"error": 17}}));
        assert_eq!(resp.error(), Some("17"));
    }

    #[test]
    fn missing_payload_is_empty_success() {
        let resp = Response::parse(br#"{"status":"ok"}"#).unwrap();
        assert_eq!(resp.payload(), &Payload::Success(Map::new()));
        assert_eq!(resp.raw()["status"], "ok");
    }

    #[test]
    fn non_object_payload_is_empty_success() {
        let resp = Response::from_value(json!({"payload": "hello"}));
        assert_eq!(resp.payload(), &Payload::Success(Map::new()));
        assert_eq!(resp.into_raw()["payload"], "hello");
    }

    #[test]
    fn top_level_error_key_is_not_a_failure() {
        let resp = Response::from_value(json!({"error": "ignored", "payload": {}}));
        assert!(!resp.is_failure());
    }

    #[test]
    fn invalid_json() {
        let err = Response::parse(b"{\"payload\":").unwrap_err();
        assert!(matches!(err, BoneError::InvalidJson(_)));
        let err = decode_json(&[0xFF, 0xFE]).unwrap_err();
        assert!(matches!(err, BoneError::InvalidJson(_)));
    }
}
