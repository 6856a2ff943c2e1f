use std::time::Duration;

use bone_rs_protocol::frame::{self, LENGTH_PREFIX_LEN};
use tokio::io::{
    AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufWriter, ReadHalf, WriteHalf,
};
use tokio::net::TcpStream;
use tracing::{debug, trace, warn};

use crate::error::{ClientError, Result};

/// Upper bound on a single body read.
const READ_CHUNK_SIZE: usize = 2048;

/// Upper bound on the up-front body allocation; larger bodies grow as they arrive.
const MAX_PREALLOC: usize = 1 << 20;

/// One duplex stream speaking the line protocol.
///
/// Not synchronized; [`BoneClient`](crate::BoneClient) holds it behind a lock
/// so that [`exchange`](Self::exchange) calls never overlap.
pub struct Connection<S> {
    reader: ReadHalf<S>,
    writer: BufWriter<WriteHalf<S>>,
    read_timeout: Option<Duration>,
    closed: bool,
    /// Set while an exchange is on the wire; still set on entry means the
    /// previous caller was dropped mid-exchange.
    in_flight: bool,
}

impl Connection<TcpStream> {
    pub async fn connect(
        addr: &str,
        connect_timeout: Duration,
        read_timeout: Option<Duration>,
    ) -> Result<Self> {
        debug!(addr, "TCP connecting");
        let stream = tokio::time::timeout(connect_timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| ClientError::Timeout(connect_timeout))?
            .map_err(ClientError::Io)?;

        stream.set_nodelay(true).ok();

        Ok(Self::new(stream, read_timeout))
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin> Connection<S> {
    pub fn new(stream: S, read_timeout: Option<Duration>) -> Self {
        let (read_half, write_half) = tokio::io::split(stream);
        Self {
            reader: read_half,
            writer: BufWriter::new(write_half),
            read_timeout,
            closed: false,
            in_flight: false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Write one request and read its complete response frame.
    ///
    /// Any failure here leaves framing in an unknown state, so the connection
    /// is shut down and every later call fails with
    /// [`ClientError::ConnectionClosed`]. The same holds when a previous
    /// exchange was cancelled before its response frame was fully read.
    pub async fn exchange(&mut self, request: &[u8]) -> Result<Vec<u8>> {
        if self.closed {
            return Err(ClientError::ConnectionClosed);
        }
        if self.in_flight {
            warn!("previous exchange was cancelled, closing connection");
            self.closed = true;
            self.writer.shutdown().await.ok();
            return Err(ClientError::ConnectionClosed);
        }

        self.in_flight = true;
        let result = self.send_and_receive(request).await;
        self.in_flight = false;
        if let Err(e) = &result {
            warn!(error = %e, "exchange failed, closing connection");
            self.closed = true;
            self.writer.shutdown().await.ok();
        }
        result
    }

    async fn send_and_receive(&mut self, request: &[u8]) -> Result<Vec<u8>> {
        self.send_raw(request).await?;
        self.read_frame().await
    }

    pub async fn send_raw(&mut self, data: &[u8]) -> Result<()> {
        self.writer.write_all(data).await.map_err(ClientError::Io)?;
        self.writer.flush().await.map_err(ClientError::Io)?;
        Ok(())
    }

    /// Read one length-prefixed frame and return its body.
    pub async fn read_frame(&mut self) -> Result<Vec<u8>> {
        let timeout = self.read_timeout;
        match timeout {
            Some(limit) => tokio::time::timeout(limit, self.read_frame_unbounded())
                .await
                .map_err(|_| {
                    warn!(timeout = ?limit, "read timeout");
                    ClientError::Timeout(limit)
                })?,
            None => self.read_frame_unbounded().await,
        }
    }

    async fn read_frame_unbounded(&mut self) -> Result<Vec<u8>> {
        let mut header = [0u8; LENGTH_PREFIX_LEN];
        self.reader
            .read_exact(&mut header)
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::UnexpectedEof => ClientError::ConnectionClosed,
                _ => ClientError::Io(e),
            })?;
        let expected = frame::parse_length(&header)?;

        let mut body = Vec::with_capacity(expected.min(MAX_PREALLOC));
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        while body.len() < expected {
            let want = (expected - body.len()).min(READ_CHUNK_SIZE);
            let n = self
                .reader
                .read(&mut chunk[..want])
                .await
                .map_err(ClientError::Io)?;
            if n == 0 {
                return Err(ClientError::ConnectionClosed);
            }
            body.extend_from_slice(&chunk[..n]);
        }

        trace!(len = expected, "frame received");
        Ok(body)
    }

    pub async fn shutdown(&mut self) -> Result<()> {
        self.closed = true;
        self.writer.shutdown().await.map_err(ClientError::Io)?;
        Ok(())
    }
}
