//! Digest algorithms accepted by the signer.

use std::fmt;
use std::str::FromStr;

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256, Sha384, Sha512};

use crate::SessionError;

/// HMAC over `$message` with a concrete digest type.
///
/// HMAC accepts keys of any length, so key initialisation cannot fail.
macro_rules! hmac_bytes {
    ($digest:ty, $key:expr, $message:expr) => {{
        #[allow(clippy::expect_used)]
        let mut mac = <Hmac<$digest> as Mac>::new_from_slice($key)
            .expect("HMAC accepts keys of any size");
        mac.update($message);
        mac.finalize().into_bytes().to_vec()
    }};
}

/// Hash function used for both key derivation and the HMAC.
///
/// Names follow Python's `hashlib`, which is what the framework's
/// `SIGNING_BACKEND` settings use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DigestAlgorithm {
    #[default]
    Sha256,
    Sha384,
    Sha512,
}

impl DigestAlgorithm {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
        }
    }

    /// Plain digest of `data`.
    pub(crate) fn digest(self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha256 => <Sha256 as Digest>::digest(data).to_vec(),
            Self::Sha384 => <Sha384 as Digest>::digest(data).to_vec(),
            Self::Sha512 => <Sha512 as Digest>::digest(data).to_vec(),
        }
    }

    /// HMAC of `message` keyed with `key`.
    pub(crate) fn hmac(self, key: &[u8], message: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha256 => hmac_bytes!(Sha256, key, message),
            Self::Sha384 => hmac_bytes!(Sha384, key, message),
            Self::Sha512 => hmac_bytes!(Sha512, key, message),
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sha256" => Ok(Self::Sha256),
            "sha384" => Ok(Self::Sha384),
            "sha512" => Ok(Self::Sha512),
            other => Err(SessionError::ConfigurationError(format!(
                "unsupported digest algorithm: {other}"
            ))),
        }
    }
}
