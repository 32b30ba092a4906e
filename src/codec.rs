//! Encoding primitives shared by the signer.
//!
//! These mirror the helpers in `django.core.signing`: URL-safe base64 with
//! the padding stripped, and a base-62 integer codec used for timestamps.

use base64::Engine as _;
use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use subtle::{Choice, ConstantTimeEq};

use crate::SessionError;

/// Digits used by the base-62 codec, most significant first.
pub const BASE62_ALPHABET: &[u8; 62] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Encodes bytes as URL-safe base64 with trailing `=` removed.
#[must_use]
pub fn b64_encode(data: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

/// Decodes unpadded URL-safe base64.
///
/// Padding is restored (`(4 - len % 4) % 4` characters) before decoding.
/// Correctly padded input therefore decodes as well. Input whose length is
/// `1 (mod 4)`, or with padding that leaves the length off a multiple of
/// four, is rejected.
pub fn b64_decode(s: &str) -> Result<Vec<u8>, SessionError> {
    let padding = (4 - s.len() % 4) % 4;
    let mut padded = String::with_capacity(s.len() + padding);
    padded.push_str(s);
    padded.extend(std::iter::repeat_n('=', padding));

    URL_SAFE
        .decode(padded.as_bytes())
        .map_err(|e| SessionError::DecodeError(format!("base64: {e}")))
}

/// Encodes an integer in base 62. Negative values get a leading `-`.
#[must_use]
pub fn b62_encode(n: i64) -> String {
    if n == 0 {
        return "0".to_owned();
    }

    let mut magnitude = n.unsigned_abs();
    let mut digits = Vec::new();
    while magnitude > 0 {
        let idx = usize::try_from(magnitude % 62).unwrap_or_default();
        digits.push(BASE62_ALPHABET.get(idx).copied().unwrap_or(b'0'));
        magnitude /= 62;
    }
    if n < 0 {
        digits.push(b'-');
    }
    digits.iter().rev().map(|&b| char::from(b)).collect()
}

/// Decodes a base-62 integer produced by [`b62_encode`].
///
/// Rejects empty input, a bare `-`, characters outside the alphabet, and
/// values that do not fit in an `i64`.
pub fn b62_decode(s: &str) -> Result<i64, SessionError> {
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    if digits.is_empty() {
        return Err(SessionError::DecodeError(format!(
            "invalid base62 value: {s:?}"
        )));
    }

    let mut magnitude: u64 = 0;
    for c in digits.bytes() {
        let idx = BASE62_ALPHABET
            .iter()
            .position(|&d| d == c)
            .ok_or_else(|| {
                SessionError::DecodeError(format!(
                    "invalid base62 character: {}",
                    char::from(c)
                ))
            })?;
        magnitude = magnitude
            .checked_mul(62)
            .and_then(|m| m.checked_add(idx as u64))
            .ok_or_else(|| SessionError::DecodeError("base62 value overflows i64".to_owned()))?;
    }

    let value = if negative {
        -i128::from(magnitude)
    } else {
        i128::from(magnitude)
    };
    i64::try_from(value)
        .map_err(|_| SessionError::DecodeError("base62 value overflows i64".to_owned()))
}

/// Compares two byte strings without an early exit.
///
/// Runtime depends only on the longer input's length, not on where the
/// first mismatch is or whether the lengths agree.
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    let same_len = (a.len() as u64).ct_eq(&(b.len() as u64));
    let mut same_bytes = Choice::from(1);
    for i in 0..a.len().max(b.len()) {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        same_bytes &= x.ct_eq(&y);
    }
    (same_len & same_bytes).into()
}
