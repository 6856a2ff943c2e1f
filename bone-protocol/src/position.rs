use crate::error::{BoneError, Result};

const CURSOR_LEN: usize = 4;

/// Read offset returned by the streaming commands (`ks`, `ks_sync`, `sync`).
///
/// The instrument prefixes each binary response with this cursor; feed it back
/// as `start` on the next request to continue where the last one ended.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position(u32);

impl Position {
    /// Cursor width on the wire.
    pub const LEN: usize = CURSOR_LEN;

    /// Start of the instrument buffer.
    pub const ZERO: Self = Self(0);

    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn value(self) -> u32 {
        self.0
    }

    /// Split a body into its leading big-endian cursor and the remainder.
    pub fn split_body(body: &[u8]) -> Result<(Self, &[u8])> {
        let Some((head, rest)) = body.split_first_chunk::<CURSOR_LEN>() else {
            return Err(BoneError::MalformedInput {
                expected: Self::LEN,
                actual: body.len(),
            });
        };
        Ok((Self(u32::from_be_bytes(*head)), rest))
    }

    pub fn to_be_bytes(self) -> [u8; CURSOR_LEN] {
        self.0.to_be_bytes()
    }
}

impl From<u32> for Position {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
