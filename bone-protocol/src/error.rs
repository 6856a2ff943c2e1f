#[derive(Debug, thiserror::Error)]
pub enum BoneError {
    #[error("malformed input: expected at least {expected} bytes, actual {actual}")]
    MalformedInput { expected: usize, actual: usize },

    #[error("invalid hex digits: {0:?}")]
    InvalidHex(String),

    #[error("invalid length header: {0:?}")]
    InvalidLengthHeader(String),

    #[error("invalid json: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("failed to serialize request: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("invalid serial number: {0:?}")]
    InvalidSerial(String),
}

pub type Result<T> = std::result::Result<T, BoneError>;
