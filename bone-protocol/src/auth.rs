//! Login token signing.
//!
//! The instrument hands out a one-time token; the client proves knowledge of
//! the password by returning `sha512(hex(sha512(password)) ++ token)` as
//! lowercase hex. The plaintext password never goes on the wire.

use sha2::{Digest, Sha512};

use crate::command::Command;

/// Lowercase hex SHA-512 of `data`.
pub fn sha512_hex(data: &[u8]) -> String {
    hex::encode(Sha512::digest(data))
}

/// Sign a server-issued `token` with `password`.
pub fn sign_token(password: &str, token: &str) -> String {
    let mut material = sha512_hex(password.as_bytes());
    material.push_str(token);
    sha512_hex(material.as_bytes())
}

/// Build the `auth` command answering `token`.
pub fn auth_command(username: &str, password: &str, token: &str) -> Command {
    Command::Auth {
        username: username.to_owned(),
        signed_token: sign_token(password, token),
    }
}
