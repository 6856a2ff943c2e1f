//! Inbound frame envelope: 8 ASCII hex digits of body length, then the body.
//!
//! Only responses are framed this way. Requests go out as newline-terminated
//! JSON (see [`crate::request`]).

use crate::error::{BoneError, Result};

/// Width of the ASCII hex length header.
pub const LENGTH_PREFIX_LEN: usize = 8;

/// Largest body the 8-digit header can announce.
pub const MAX_BODY_LEN: usize = 0xFFFF_FFFF;

/// Parse the 8-byte length header into the body length.
pub fn parse_length(header: &[u8]) -> Result<usize> {
    if header.len() != LENGTH_PREFIX_LEN {
        return Err(BoneError::InvalidLengthHeader(
            String::from_utf8_lossy(header).into_owned(),
        ));
    }
    let text = std::str::from_utf8(header)
        .map_err(|_| BoneError::InvalidLengthHeader(String::from_utf8_lossy(header).into_owned()))?;
    if !text.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(BoneError::InvalidLengthHeader(text.to_owned()));
    }
    let len = u32::from_str_radix(text, 16)
        .map_err(|_| BoneError::InvalidLengthHeader(text.to_owned()))?;
    Ok(len as usize)
}

/// Format the length header for a body of `len` bytes (lowercase hex).
pub fn encode_length(len: usize) -> Result<[u8; LENGTH_PREFIX_LEN]> {
    if len > MAX_BODY_LEN {
        return Err(BoneError::InvalidLengthHeader(format!("{len:x}")));
    }
    let mut header = [0u8; LENGTH_PREFIX_LEN];
    header.copy_from_slice(format!("{len:08x}").as_bytes());
    Ok(header)
}

/// Wrap `body` in a complete inbound frame, as the instrument sends it.
pub fn encode(body: &[u8]) -> Result<Vec<u8>> {
    let header = encode_length(body.len())?;
    let mut frame = Vec::with_capacity(LENGTH_PREFIX_LEN + body.len());
    frame.extend_from_slice(&header);
    frame.extend_from_slice(body);
    Ok(frame)
}

/// Split one complete frame off the front of `data`.
///
/// Returns `Ok(None)` while `data` is still short of a full frame; the
/// returned `usize` is the number of bytes the frame occupied.
pub fn decode(data: &[u8]) -> Result<Option<(&[u8], usize)>> {
    if data.len() < LENGTH_PREFIX_LEN {
        return Ok(None);
    }
    let len = parse_length(&data[..LENGTH_PREFIX_LEN])?;
    let total = LENGTH_PREFIX_LEN + len;
    if data.len() < total {
        return Ok(None);
    }
    Ok(Some((&data[LENGTH_PREFIX_LEN..total], total)))
}
