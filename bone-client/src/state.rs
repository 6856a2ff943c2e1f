use std::net::IpAddr;
use std::time::Duration;

use bone_rs_protocol::DEFAULT_API;

/// TCP port instruments listen on.
pub const DEFAULT_PORT: u16 = 6450;

/// Login state of a connection.
///
/// Transitions: `Unauthenticated` → `Authenticated` after a successful
/// [`login`](crate::BoneClient::login). A rejected login leaves the state at
/// `Unauthenticated`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "Unauthenticated",
            Self::Authenticated => "Authenticated",
        }
    }
}

/// Username and password used for the token login.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Configuration for [`BoneClient`](crate::BoneClient) connections.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// `api` value added to requests that do not set one. Default: 2.
    pub api: i64,
    /// Timeout for the initial TCP connection. Default: 10 seconds.
    pub connect_timeout: Duration,
    /// Timeout for reading one response frame. `None` waits forever.
    /// On expiry the connection is closed. Default: 30 seconds.
    pub read_timeout: Option<Duration>,
    /// Log in right after connecting. Default: `None`.
    pub credentials: Option<Credentials>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api: DEFAULT_API,
            connect_timeout: Duration::from_secs(10),
            read_timeout: Some(Duration::from_secs(30)),
            credentials: None,
        }
    }
}

/// Join `host` and `port` into an address `TcpStream::connect` accepts.
///
/// IPv6 literals are bracketed: `socket_addr("fe80::1", 6450)` gives
/// `"[fe80::1]:6450"`.
pub fn socket_addr(host: &str, port: u16) -> String {
    match host.parse::<IpAddr>() {
        Ok(IpAddr::V6(_)) => format!("[{host}]:{port}"),
        _ => format!("{host}:{port}"),
    }
}
