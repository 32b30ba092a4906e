//! Structured payload signing (`signing.dumps` / `signing.loads`).

use std::io::{Read, Write};

use chrono::{DateTime, Duration, Utc};
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use serde::Serialize;
use serde_json::{Map, Value};

use super::Signer;
use crate::SessionError;
use crate::codec::{b64_decode, b64_encode};

/// Leading marker on the encoded value when the JSON was zlib-compressed.
pub const COMPRESSED_MARKER: char = '.';

/// Decoded session payload: a JSON object.
pub type SessionObject = Map<String, Value>;

impl Signer {
    /// Serializes `object` to compact JSON, optionally compresses it, and
    /// signs the base64url result with the current timestamp.
    ///
    /// # Errors
    ///
    /// `SessionError::SerializationError` if `object` cannot be serialized,
    /// `SessionError::CompressionError` if zlib fails.
    pub fn sign_object<T>(&self, object: &T, compress: bool) -> Result<String, SessionError>
    where
        T: Serialize + ?Sized,
    {
        self.sign_object_at(object, compress, Utc::now())
    }

    /// Same as [`sign_object`](Self::sign_object) with an explicit timestamp.
    pub fn sign_object_at<T>(
        &self,
        object: &T,
        compress: bool,
        signed_at: DateTime<Utc>,
    ) -> Result<String, SessionError>
    where
        T: Serialize + ?Sized,
    {
        let json = serde_json::to_vec(object)
            .map_err(|e| SessionError::SerializationError(e.to_string()))?;

        let encoded = if compress {
            let compressed = zlib_compress(&json)?;
            format!("{COMPRESSED_MARKER}{}", b64_encode(&compressed))
        } else {
            b64_encode(&json)
        };

        Ok(self.sign_with_timestamp_at(&encoded, signed_at))
    }

    /// Verifies `token` and decodes the JSON object inside it.
    ///
    /// # Errors
    ///
    /// Propagates the first failure: `InvalidSignature`, `InvalidTimestamp`,
    /// `SessionExpired`, `DecodeError`, `DecompressionError`, then
    /// `DeserializationError` (also raised when the JSON is not an object).
    pub fn unsign_object(
        &self,
        token: &str,
        max_age: Option<Duration>,
    ) -> Result<SessionObject, SessionError> {
        self.unsign_object_at(token, max_age, Utc::now())
    }

    /// Same as [`unsign_object`](Self::unsign_object) with an explicit clock.
    pub fn unsign_object_at(
        &self,
        token: &str,
        max_age: Option<Duration>,
        now: DateTime<Utc>,
    ) -> Result<SessionObject, SessionError> {
        let encoded = self.unsign_with_timestamp_at(token, max_age, now)?;

        let (compressed, encoded) = match encoded.strip_prefix(COMPRESSED_MARKER) {
            Some(rest) => (true, rest),
            None => (false, encoded),
        };

        let mut data = b64_decode(encoded)?;
        if compressed {
            data = zlib_decompress(&data)?;
        }

        serde_json::from_slice(&data).map_err(|e| SessionError::DeserializationError(e.to_string()))
    }
}

fn zlib_compress(data: &[u8]) -> Result<Vec<u8>, SessionError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| SessionError::CompressionError(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| SessionError::CompressionError(e.to_string()))
}

fn zlib_decompress(data: &[u8]) -> Result<Vec<u8>, SessionError> {
    let mut decoder = ZlibDecoder::new(data);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| SessionError::DecompressionError(e.to_string()))?;
    Ok(out)
}
