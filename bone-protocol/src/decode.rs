//! Numeric decoders for the packed big-endian sample formats.
//!
//! Every decoder reads the *first* fixed-size window of its input and ignores
//! anything past it; the stream-level sizing lives in [`crate::channel`].

use crate::error::{BoneError, Result};

/// Width of one packed sample word.
pub const WORD_LEN: usize = 4;

/// Width of one ASCII hex voltage group in a `dv_data` body.
pub const HEX_TRIPLET_LEN: usize = 3;

/// Read the leading big-endian `u32` from `bytes`.
pub fn read_word(bytes: &[u8]) -> Result<u32> {
    let Some(head) = bytes.first_chunk::<WORD_LEN>() else {
        return Err(BoneError::MalformedInput {
            expected: WORD_LEN,
            actual: bytes.len(),
        });
    };
    Ok(u32::from_be_bytes(*head))
}

/// Decode the amplitude packed in the low 12 bits of a saw word.
///
/// Output is within `[-5.0, 5.0)`; the upper 20 bits never contribute.
pub fn decode_amplitude(bytes: &[u8]) -> Result<f64> {
    read_word(bytes).map(amplitude_from_word)
}

pub fn amplitude_from_word(word: u32) -> f64 {
    (f64::from(word & 0xFFF) * (5.0 / 4096.0) - 2.5) * 2.0
}

/// Decode the runtime packed in the upper 20 bits of a saw word.
pub fn decode_runtime(bytes: &[u8]) -> Result<f64> {
    read_word(bytes).map(runtime_from_word)
}

/// Two fixed-point scalings, selected by the parity of the scaled value.
///
/// The integer divisions must happen before the float conversion; doing the
/// division in floating point gives different results.
pub fn runtime_from_word(word: u32) -> f64 {
    let data = u64::from(word / 4096) * 100;
    if data & 0x1 == 0 {
        data as f64 / 512.0
    } else {
        (data / 16) as f64 / 128.0
    }
}

/// Decode consecutive big-endian IEEE-754 `f32` values.
///
/// Trailing bytes that do not fill a whole word are dropped.
pub fn decode_float32(bytes: &[u8]) -> Vec<f64> {
    bytes
        .chunks_exact(WORD_LEN)
        .map(|c| f64::from(f32::from_be_bytes([c[0], c[1], c[2], c[3]])))
        .collect()
}

/// Decode three ASCII hex digits (`000`..`FFF`) into a voltage around zero.
pub fn decode_hex_triplet(bytes: &[u8]) -> Result<f64> {
    let Some(triplet) = bytes.first_chunk::<HEX_TRIPLET_LEN>() else {
        return Err(BoneError::MalformedInput {
            expected: HEX_TRIPLET_LEN,
            actual: bytes.len(),
        });
    };
    let text = std::str::from_utf8(triplet)
        .map_err(|_| BoneError::InvalidHex(String::from_utf8_lossy(triplet).into_owned()))?;
    let raw =
        u16::from_str_radix(text, 16).map_err(|_| BoneError::InvalidHex(text.to_owned()))?;
    Ok((f64::from(raw) - 2048.0) / 4096.0 * 5.0)
}
