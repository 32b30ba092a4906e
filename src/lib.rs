//! Validate and decode session cookies issued by Django.
//!
//! The crate reproduces Django's `django.core.signing` scheme byte for byte
//! (salted HMAC, base-62 timestamps, optional zlib compression) and layers a
//! two-phase session check on top of it:
//!
//! 1. [`SessionClient::get_raw_session`] looks the session key up in the
//!    session store and checks its expiry. The payload stays encoded.
//! 2. [`SessionClient::decode_identity_from_record`] verifies the payload
//!    signature and extracts `_auth_user_id`, only when the caller needs it.
//!
//! # Example
//!
//! ```rust
//! use djsession::{InMemorySessionStore, RawSession, SessionClient, SessionClientConfig, SecretString};
//! use djsession::session::encode_session_data;
//! use chrono::{Duration, Utc};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store = InMemorySessionStore::new();
//! let client = SessionClient::new(
//!     store.clone(),
//!     SessionClientConfig {
//!         secret_key: SecretString::new("django-insecure-secret"),
//!         ..Default::default()
//!     },
//! )
//! .unwrap();
//!
//! let payload = encode_session_data(client.signer(), "42", serde_json::Map::new(), true).unwrap();
//! store.insert(RawSession::new("abc123", payload, Utc::now() + Duration::hours(1)));
//!
//! let raw = client.get_raw_session("abc123").await.unwrap();
//! assert_eq!(client.decode_identity_from_record(&raw).unwrap(), "42");
//! # }
//! ```

#[cfg(feature = "axum")]
pub mod api;
pub mod codec;
#[cfg(feature = "sqlx_postgres")]
pub mod postgres;
mod secret;
pub mod session;
pub mod signing;
#[cfg(feature = "sqlx_sqlite")]
pub mod sqlite;

use std::fmt;

pub use secret::SecretString;
pub use session::{
    InMemorySessionStore, RawSession, SessionClient, SessionClientConfig, SessionStore,
};
pub use signing::{DigestAlgorithm, Signer};

/// Errors produced while validating or decoding a session.
///
/// Every variant is distinct so callers can tell "send the user back to the
/// login page" apart from "something is broken on our side".
#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    /// Missing or invalid configuration. Raised at construction time.
    ConfigurationError(String),
    /// Session key is empty, too long, or absent from the store.
    SessionNotFound,
    /// Store record or token timestamp is past its bound.
    SessionExpired,
    /// HMAC mismatch or malformed separator structure.
    InvalidSignature,
    /// Embedded timestamp is not valid base-62.
    InvalidTimestamp,
    DecodeError(String),
    CompressionError(String),
    DecompressionError(String),
    SerializationError(String),
    DeserializationError(String),
    /// Payload verified but carries no `_auth_user_id`.
    IdentityNotFound,
    /// `_auth_user_id` holds something other than a string or an integer.
    UnsupportedIdentityType(String),
    /// Session store failure. Never retried internally.
    StoreError(String),
}

impl SessionError {
    /// Returns true when the request should be treated as unauthenticated
    /// (redirect to login) rather than as a server-side failure.
    #[must_use]
    pub fn is_authentication_failure(&self) -> bool {
        !self.is_infrastructure_failure()
    }

    /// Returns true for failures that are not the client's fault.
    #[must_use]
    pub fn is_infrastructure_failure(&self) -> bool {
        matches!(
            self,
            Self::StoreError(_)
                | Self::ConfigurationError(_)
                | Self::CompressionError(_)
                | Self::SerializationError(_)
        )
    }
}

impl std::error::Error for SessionError {}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigurationError(msg) => write!(f, "Configuration error: {msg}"),
            Self::SessionNotFound => write!(f, "Session not found"),
            Self::SessionExpired => write!(f, "Session expired"),
            Self::InvalidSignature => write!(f, "Invalid session signature"),
            Self::InvalidTimestamp => write!(f, "Invalid signature timestamp"),
            Self::DecodeError(msg) => write!(f, "Decode error: {msg}"),
            Self::CompressionError(msg) => write!(f, "Compression error: {msg}"),
            Self::DecompressionError(msg) => write!(f, "Decompression error: {msg}"),
            Self::SerializationError(msg) => write!(f, "Serialization error: {msg}"),
            Self::DeserializationError(msg) => write!(f, "Deserialization error: {msg}"),
            Self::IdentityNotFound => write!(f, "_auth_user_id not found in session"),
            Self::UnsupportedIdentityType(kind) => {
                write!(f, "Unexpected user ID type: {kind}")
            }
            Self::StoreError(msg) => write!(f, "Session store error: {msg}"),
        }
    }
}
