// Copyright (c) 2024 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};

use crate::error::{DecodeError, EncodeError};

/// Generate a random alphanumeric string, used to synthesize a client id
/// when the CONNECT packet supplied an empty one.
#[must_use]
pub fn random_string(len: usize) -> String {
    thread_rng().sample_iter(&Alphanumeric).take(len).collect()
}

/// Errors raised while validating UTF-8 encoded string fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringError {
    /// Bytes are not well-formed UTF-8.
    InvalidUtf8,

    /// String contains the null character `U+0000`, forbidden by [MQTT-1.5.4-2].
    ContainsNul,

    /// String is longer than 65,535 bytes and cannot fit in a 2-byte length prefix.
    TooLong,
}

/// Decode `bytes` as a UTF-8 string, rejecting embedded nulls.
///
/// # Errors
///
/// Returns an error if `bytes` is not valid UTF-8 or contains `U+0000`.
pub fn to_utf8_string(bytes: &[u8]) -> Result<String, StringError> {
    let s = std::str::from_utf8(bytes).map_err(|_err| StringError::InvalidUtf8)?;
    validate_utf8_string(s)?;
    Ok(s.to_string())
}

/// Validate that `s` is an acceptable MQTT UTF-8 string field: no embedded
/// null and no more than 65,535 bytes.
///
/// # Errors
///
/// Returns an error if `s` contains `U+0000` or is too long.
pub fn validate_utf8_string(s: &str) -> Result<(), StringError> {
    if s.len() > usize::from(u16::MAX) {
        return Err(StringError::TooLong);
    }
    // A UTF-8 Encoded String MUST NOT include an encoding of the null
    // character U+0000 [MQTT-1.5.4-2].
    if s.contains('\u{0000}') {
        return Err(StringError::ContainsNul);
    }
    Ok(())
}

/// Validate that binary data fits in a 2-byte length-prefixed field.
///
/// # Errors
///
/// Returns an error if `data` is longer than 65,535 bytes.
pub fn validate_two_bytes_data(data: &[u8]) -> Result<(), EncodeError> {
    if data.len() > usize::from(u16::MAX) {
        return Err(EncodeError::TooManyData);
    }
    Ok(())
}

/// Validate a client id: non-empty callers are expected to have already
/// allowed empty ids under `clean_session=true`. Length must not exceed 23
/// bytes of `0-9a-zA-Z` per the MQTT 3.1.1 minimum conformance requirement;
/// longer or non-alphanumeric ids are still accepted since most brokers
/// relax this limit, but invalid UTF-8/control chars are rejected.
///
/// # Errors
///
/// Returns an error if `client_id` contains a null character.
pub fn validate_client_id(client_id: &str) -> Result<(), EncodeError> {
    if client_id.contains('\u{0000}') {
        return Err(EncodeError::InvalidClientId);
    }
    Ok(())
}

/// Validate the `keep_alive` field: zero disables keepalive, otherwise a
/// value below 5 seconds is rejected as impractical.
///
/// # Errors
///
/// Returns an error if `keep_alive` is non-zero and smaller than 5.
pub const fn validate_keep_alive(keep_alive: u16) -> Result<(), DecodeError> {
    if keep_alive != 0 && keep_alive < 5 {
        Err(DecodeError::OtherErrors)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_utf8_string() {
        assert!(validate_utf8_string("hello").is_ok());
        assert!(validate_utf8_string("bad\u{0000}string").is_err());
    }

    #[test]
    fn test_validate_keep_alive() {
        assert!(validate_keep_alive(0).is_ok());
        assert!(validate_keep_alive(60).is_ok());
        assert!(validate_keep_alive(3).is_err());
    }
}
