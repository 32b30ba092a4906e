//! Two-phase session validation.

use chrono::{Duration, Utc};

use super::identity::decode_identity;
use super::store::SessionStore;
use super::{MAX_SESSION_KEY_LENGTH, RawSession, SessionClientConfig};
use crate::SessionError;
use crate::signing::Signer;

/// Validates session keys against a [`SessionStore`] and, on demand,
/// decodes the signed payload.
///
/// The two steps are deliberately separate:
///
/// | Step | Cost | Method |
/// |------|------|--------|
/// | existence + expiry | one store query | [`get_raw_session`](Self::get_raw_session) |
/// | identity | HMAC verification + JSON parse | [`decode_identity_from_record`](Self::decode_identity_from_record) |
///
/// The client is immutable after construction and holds no caches; share it
/// behind an `Arc` across tasks.
pub struct SessionClient<S: SessionStore> {
    store: S,
    signer: Signer,
    max_age: Option<Duration>,
    cookie_name: String,
}

impl<S: SessionStore> SessionClient<S> {
    /// Creates a client.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::ConfigurationError` if the config is invalid.
    /// Nothing is constructed in that case.
    pub fn new(store: S, config: SessionClientConfig) -> Result<Self, SessionError> {
        config.validate()?;
        let signer = config.signer()?;
        let max_age = config.effective_max_age();

        Ok(Self {
            store,
            signer,
            max_age,
            cookie_name: config.cookie_name,
        })
    }

    /// Name of the cookie holding the session key.
    pub fn session_cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn signer(&self) -> &Signer {
        &self.signer
    }

    pub fn max_age(&self) -> Option<Duration> {
        self.max_age
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fetches a session and checks its expiry without touching the payload.
    ///
    /// Keys that are empty or longer than 255 bytes are rejected before the
    /// store is queried.
    ///
    /// # Errors
    ///
    /// - `SessionError::SessionNotFound` for a malformed or unknown key.
    /// - `SessionError::SessionExpired` if the record's expiry has passed.
    /// - `SessionError::StoreError` if the store fails.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, err))]
    pub async fn get_raw_session(&self, session_key: &str) -> Result<RawSession, SessionError> {
        if session_key.is_empty() || session_key.len() > MAX_SESSION_KEY_LENGTH {
            return Err(SessionError::SessionNotFound);
        }

        let session = self
            .store
            .find_session(session_key)
            .await?
            .ok_or(SessionError::SessionNotFound)?;

        if session.is_expired_at(Utc::now()) {
            return Err(SessionError::SessionExpired);
        }

        Ok(session)
    }

    /// Verifies a record's payload and returns its `_auth_user_id`.
    ///
    /// This is the only place the payload signature is checked. The
    /// configured max age, if any, is enforced against the payload's own
    /// timestamp.
    pub fn decode_identity_from_record(&self, record: &RawSession) -> Result<String, SessionError> {
        self.decode_session_user_id(&record.session_data)
    }

    /// Same as [`decode_identity_from_record`](Self::decode_identity_from_record)
    /// for a payload string obtained elsewhere.
    pub fn decode_session_user_id(&self, session_data: &str) -> Result<String, SessionError> {
        let object = self.signer.unsign_object(session_data, self.max_age)?;
        decode_identity(&object)
    }

    /// Runs both phases and returns the validated record with its identity.
    pub async fn authenticate(
        &self,
        session_key: &str,
    ) -> Result<(RawSession, String), SessionError> {
        let session = self.get_raw_session(session_key).await?;
        let identity = self.decode_identity_from_record(&session)?;
        Ok((session, identity))
    }
}
