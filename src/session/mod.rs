mod client;
mod config;
mod identity;
mod memory_store;
mod payload;
mod store;

use chrono::{DateTime, Utc};
pub use client::SessionClient;
pub use config::SessionClientConfig;
pub use identity::{IdentityValue, decode_identity};
pub use memory_store::InMemorySessionStore;
pub use payload::{decode_session_data, encode_session_data, update_session_data};
pub use store::SessionStore;

/// Key under which `django.contrib.auth` stores the logged-in user's id.
pub const AUTH_USER_ID_KEY: &str = "_auth_user_id";

/// Django's default `SESSION_COOKIE_NAME`.
pub const DEFAULT_COOKIE_NAME: &str = "sessionid";

/// Longest session key accepted before the store is queried.
pub const MAX_SESSION_KEY_LENGTH: usize = 255;

/// A row of the `django_session` table with its payload still encoded.
///
/// Fetching one costs a single store round-trip. Verifying and decoding
/// `session_data` is a separate, explicit step
/// ([`SessionClient::decode_identity_from_record`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSession {
    pub session_key: String,
    pub session_data: String,
    pub expire_date: DateTime<Utc>,
}

impl RawSession {
    pub fn new(
        session_key: impl Into<String>,
        session_data: impl Into<String>,
        expire_date: DateTime<Utc>,
    ) -> Self {
        Self {
            session_key: session_key.into(),
            session_data: session_data.into(),
            expire_date,
        }
    }

    /// A record is usable only while its expiry is strictly in the future.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expire_date
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}
