use crate::error::{BoneError, Result};

/// Vendor prefix printed on serial number labels.
pub const SERIAL_PREFIX: &str = "SN208";

/// Derive an instrument's IPv6 link-local address from its serial number.
///
/// `"SN2080042"` and `"42"` both map to `fe80::b5:b1ff:fe00:2a`. The result
/// carries no zone index; append `%<iface>` when connecting.
pub fn link_local_from_serial(serial: &str) -> Result<String> {
    let digits = serial.strip_prefix(SERIAL_PREFIX).unwrap_or(serial);
    let number: u16 = digits
        .parse()
        .map_err(|_| BoneError::InvalidSerial(serial.to_owned()))?;
    let hex = format!("{number:04x}");
    Ok(format!("fe80::b5:b1ff:fe{}:{}", &hex[..2], &hex[2..]))
}
