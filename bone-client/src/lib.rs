//! Async client for bone instruments.
//!
//! Connects to an instrument over TCP (or any duplex byte stream), performs
//! the token login, and decodes the binary streaming commands into samples.
//! One request/response exchange is on the wire at a time per connection.

mod client;
mod connection;
mod error;
#[cfg(test)]
mod mock;
mod state;
mod stream;

pub use bone_rs_protocol as protocol;
pub use bone_rs_protocol::{
    ChannelBlock, KsSyncData, Position, Request, Response, SyncData, link_local_from_serial,
};
pub use client::BoneClient;
pub use error::{ClientError, Result};
pub use state::{ClientConfig, Credentials, DEFAULT_PORT, SessionState, socket_addr};
pub use stream::sync_stream;
