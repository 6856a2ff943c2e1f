use std::sync::atomic::{AtomicBool, Ordering};

use bone_rs_protocol::channel::{
    KsSyncData, SyncData, parse_dv_data, parse_ks, parse_ks_sync, parse_sync,
};
use bone_rs_protocol::command::{Command, DEFAULT_UNIT};
use bone_rs_protocol::{Payload, Position, Request, Response, auth};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::{debug, info, trace, warn};

use crate::connection::Connection;
use crate::error::{ClientError, Result};
use crate::state::{ClientConfig, SessionState};

/// Async client for one instrument connection.
///
/// Methods take `&self`, so a client can be shared across tasks (wrap it in an
/// `Arc`). Requests from different tasks are serialized: each one holds the
/// connection from the moment its request is written until its whole response
/// frame has been read. Responses carry no correlation id, so this ordering is
/// what ties a response to its caller. Use separate clients for parallelism.
///
/// Dropping the client closes the socket.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> bone_rs_client::Result<()> {
/// use bone_rs_client::{BoneClient, ClientConfig, Credentials, Position, DEFAULT_PORT, socket_addr};
///
/// let config = ClientConfig {
///     credentials: Some(Credentials::new("admin", "secret")),
///     ..ClientConfig::default()
/// };
/// let client = BoneClient::connect_with_config(&socket_addr("10.0.0.5", DEFAULT_PORT), config).await?;
///
/// let (next, data) = client.sync(1000, Position::ZERO, &["saw", "int"]).await?;
/// println!("runtime={:?} next={next}", data.runtime());
/// # Ok(())
/// # }
/// ```
pub struct BoneClient<S = TcpStream> {
    connection: Mutex<Connection<S>>,
    api: i64,
    state: SessionState,
    closed: AtomicBool,
}

impl BoneClient<TcpStream> {
    /// Connect to `addr` (`host:port`) with default configuration.
    pub async fn connect(addr: &str) -> Result<Self> {
        Self::connect_with_config(addr, ClientConfig::default()).await
    }

    /// Connect to `addr` (`host:port`) with custom [`ClientConfig`].
    ///
    /// Logs in before returning when `config.credentials` is set.
    pub async fn connect_with_config(addr: &str, config: ClientConfig) -> Result<Self> {
        info!(addr, "connecting");
        let connection =
            Connection::connect(addr, config.connect_timeout, config.read_timeout).await?;
        Self::establish(connection, config).await
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin> BoneClient<S> {
    /// Speak the protocol over an already-connected stream.
    pub async fn from_stream(stream: S, config: ClientConfig) -> Result<Self> {
        let connection = Connection::new(stream, config.read_timeout);
        Self::establish(connection, config).await
    }

    async fn establish(connection: Connection<S>, config: ClientConfig) -> Result<Self> {
        let mut client = Self {
            connection: Mutex::new(connection),
            api: config.api,
            state: SessionState::Unauthenticated,
            closed: AtomicBool::new(false),
        };
        if let Some(credentials) = &config.credentials {
            client
                .login(&credentials.username, &credentials.password)
                .await?;
        }
        info!(api = client.api, state = client.state.as_str(), "connected");
        Ok(client)
    }

    // -- Accessors --

    /// Login state; `Unauthenticated` once the connection has been closed by
    /// a failed exchange.
    pub fn state(&self) -> SessionState {
        if self.closed.load(Ordering::Relaxed) {
            SessionState::Unauthenticated
        } else {
            self.state
        }
    }

    /// `api` value added to requests that do not carry one.
    pub fn api(&self) -> i64 {
        self.api
    }

    // -- Raw exchange --

    /// Send `request` and return the raw response body.
    pub async fn request_raw(&self, request: &Request) -> Result<Vec<u8>> {
        let bytes = request.to_bytes(self.api)?;
        debug!(command = request.command(), "request");

        let body = {
            let mut connection = self.connection.lock().await;
            let result = connection.exchange(&bytes).await;
            if connection.is_closed() {
                self.closed.store(true, Ordering::Relaxed);
            }
            result?
        };

        trace!(command = request.command(), len = body.len(), "response");
        Ok(body)
    }

    /// Send `request` and decode the response as JSON.
    ///
    /// A `payload.error` reply is returned as a [`Payload::Failure`], not an error.
    pub async fn send_message(&self, request: &Request) -> Result<Response> {
        let body = self.request_raw(request).await?;
        Ok(Response::parse(&body)?)
    }

    /// Like [`send_message`](Self::send_message), but a `payload.error` reply
    /// becomes [`ClientError::ServerError`].
    pub async fn send_checked(&self, request: &Request) -> Result<Response> {
        let response = self.send_message(request).await?;
        match response.payload() {
            Payload::Failure(message) => Err(ClientError::ServerError(format!(
                "{}: {message}",
                request.command()
            ))),
            Payload::Success(_) => Ok(response),
        }
    }

    // -- Session (Unauthenticated → Authenticated) --

    /// Log in with the token handshake.
    ///
    /// Requests a token, signs it with `password`, and sends `auth`. Any failure
    /// leaves the state at [`SessionState::Unauthenticated`].
    pub async fn login(&mut self, username: &str, password: &str) -> Result<()> {
        self.state = SessionState::Unauthenticated;

        let response = self
            .send_message(&Command::RequestToken.to_request())
            .await?;
        let token = match response.payload() {
            Payload::Failure(message) => return Err(ClientError::Auth(message.clone())),
            Payload::Success(_) => response
                .token()
                .ok_or_else(|| ClientError::Auth("no token in request_token reply".into()))?,
        };

        debug!(username, "auth");
        let cmd = auth::auth_command(username, password, token);
        let reply = self.send_message(&cmd.to_request()).await?;

        if let Payload::Failure(message) = reply.payload() {
            warn!(username, %message, "login rejected");
            return Err(ClientError::Auth(message.clone()));
        }

        info!(username, "logged in");
        self.state = SessionState::Authenticated;
        Ok(())
    }

    // -- Binary streaming commands --

    /// Read the current voltage of every DV channel.
    pub async fn dv_data(&self) -> Result<Vec<f64>> {
        let body = self.request_raw(&Command::DvData.to_request()).await?;
        Ok(parse_dv_data(&body)?)
    }

    /// Read up to `amount` float samples of `channel`, starting at `start`.
    ///
    /// Returns the cursor to pass as `start` next time.
    pub async fn ks(
        &self,
        channel: u32,
        amount: u32,
        start: Position,
    ) -> Result<(Position, Vec<f64>)> {
        let cmd = Command::Ks {
            channel,
            amount,
            start,
        };
        let body = self.request_raw(&cmd.to_request()).await?;
        Ok(parse_ks(&body)?)
    }

    /// Read synchronized samples of the channels in `filter`, in `unit`.
    ///
    /// The result is indexed `[channel][sample]` in filter order.
    pub async fn ks_sync(
        &self,
        amount: u32,
        start: Position,
        filter: &[u32],
        unit: &str,
    ) -> Result<(Position, KsSyncData)> {
        let cmd = Command::KsSync {
            amount,
            start,
            filter: filter.to_vec(),
            unit: unit.to_owned(),
        };
        let body = self.request_raw(&cmd.to_request()).await?;
        Ok(parse_ks_sync(&body, filter.len())?)
    }

    /// [`ks_sync`](Self::ks_sync) with the default unit.
    pub async fn ks_sync_default_unit(
        &self,
        amount: u32,
        start: Position,
        filter: &[u32],
    ) -> Result<(Position, KsSyncData)> {
        self.ks_sync(amount, start, filter, DEFAULT_UNIT).await
    }

    /// Read synchronized blocks of the named channels in `filter`.
    ///
    /// The `"saw"` channel is reported as runtime (`rt`) and amplitude (`amp`).
    pub async fn sync<F: AsRef<str>>(
        &self,
        amount: u32,
        start: Position,
        filter: &[F],
    ) -> Result<(Position, SyncData)> {
        let cmd = Command::Sync {
            amount,
            start,
            filter: filter.iter().map(|f| f.as_ref().to_owned()).collect(),
        };
        let body = self.request_raw(&cmd.to_request()).await?;
        Ok(parse_sync(&body, filter)?)
    }

    // -- Teardown --

    /// Shut the connection down and consume the client.
    pub async fn close(self) -> Result<()> {
        let mut connection = self.connection.into_inner();
        if connection.is_closed() {
            return Ok(());
        }
        connection.shutdown().await
    }
}
