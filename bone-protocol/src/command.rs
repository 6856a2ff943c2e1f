use serde_json::{Value, json};

use crate::position::Position;
use crate::request::Request;

/// Channels requested by `ks_sync` when the caller gives no filter.
pub const DEFAULT_KS_SYNC_FILTER: [u32; 3] = [0, 1, 2];

/// Channels requested by `sync` when the caller gives no filter.
pub const DEFAULT_SYNC_FILTER: [&str; 4] = ["saw", "int", "coe", "int2"];

/// Unit requested by `ks_sync` when the caller gives none.
pub const DEFAULT_UNIT: &str = "G";

/// The commands this client speaks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    // Login
    RequestToken,
    Auth {
        username: String,
        signed_token: String,
    },

    // Binary streaming
    DvData,
    Ks {
        channel: u32,
        amount: u32,
        start: Position,
    },
    KsSync {
        amount: u32,
        start: Position,
        filter: Vec<u32>,
        unit: String,
    },
    Sync {
        amount: u32,
        start: Position,
        filter: Vec<String>,
    },
}

impl Command {
    /// Wire name sent in the `command` field.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RequestToken => "request_token",
            Self::Auth { .. } => "auth",
            Self::DvData => "dv_data",
            Self::Ks { .. } => "ks",
            Self::KsSync { .. } => "ks_sync",
            Self::Sync { .. } => "sync",
        }
    }

    /// Whether the response body is binary rather than JSON.
    pub fn has_binary_response(&self) -> bool {
        matches!(
            self,
            Self::DvData | Self::Ks { .. } | Self::KsSync { .. } | Self::Sync { .. }
        )
    }

    pub fn to_request(&self) -> Request {
        let request = Request::new(self.name());
        match self.payload() {
            Some(payload) => request.with_payload(payload),
            None => request,
        }
    }

    fn payload(&self) -> Option<Value> {
        match self {
            Self::RequestToken | Self::DvData => None,
            Self::Auth {
                username,
                signed_token,
            } => Some(json!({
                "username": username,
                "signed_token": signed_token,
            })),
            Self::Ks {
                channel,
                amount,
                start,
            } => Some(json!({
                "channel": channel,
                "amount": amount,
                "start": start.value(),
                "float": true,
            })),
            Self::KsSync {
                amount,
                start,
                filter,
                unit,
            } => Some(json!({
                "amount": amount,
                "start": start.value(),
                "filter": filter,
                "unit": unit,
            })),
            Self::Sync {
                amount,
                start,
                filter,
            } => Some(json!({
                "amount": amount,
                "start": start.value(),
                "filter": filter,
            })),
        }
    }
}
