use std::time::Duration;

/// Errors that can occur during client operations.
///
/// Every variant except [`ClientError::Auth`] and [`ClientError::ServerError`]
/// leaves the connection unusable; reconnect before issuing more requests.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// TCP or socket I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed length header, invalid JSON, or an undecodable body.
    #[error("protocol error: {0}")]
    Protocol(#[from] bone_rs_protocol::BoneError),

    /// A connect or read exceeded its configured timeout.
    #[error("timeout after {0:?}")]
    Timeout(Duration),

    /// The peer closed the stream mid-frame, or the connection was closed
    /// after an earlier failure.
    #[error("connection closed")]
    ConnectionClosed,

    /// Login failed: no token was issued, or the server rejected the signature.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The server answered a JSON command with `payload.error`.
    #[error("server error: {0}")]
    ServerError(String),
}

/// Convenience alias for `Result<T, ClientError>`.
pub type Result<T> = std::result::Result<T, ClientError>;
