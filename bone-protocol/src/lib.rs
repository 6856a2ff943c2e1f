//! Wire codec for the bone instrument line protocol.
//!
//! This crate is the I/O-free half of the workspace: it knows how inbound
//! frames are delimited, how requests and JSON responses look, how the login
//! token is signed, and how the binary bodies of the streaming commands decode
//! into physical units. The async client lives in `bone-rs-client`.

pub mod address;
pub mod auth;
pub mod channel;
pub mod command;
pub mod decode;
pub mod error;
pub mod frame;
pub mod position;
pub mod request;
pub mod response;

pub use address::link_local_from_serial;
pub use channel::{ChannelBlock, KsSyncData, SyncData};
pub use command::Command;
pub use error::{BoneError, Result};
pub use position::Position;
pub use request::{DEFAULT_API, Request};
pub use response::{Payload, Response};
