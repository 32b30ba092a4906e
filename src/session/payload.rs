//! Helpers for minting and rewriting session payloads.
//!
//! These produce exactly what `SessionStore.encode` writes into
//! `django_session.session_data`, which is handy for fixtures and for
//! services that share sessions with a Django deployment.

use chrono::Duration;
use serde_json::{Map, Value};

use super::AUTH_USER_ID_KEY;
use super::identity::decode_identity;
use crate::SessionError;
use crate::signing::{SessionObject, Signer};

/// Verifies `session_data` and returns the user id stored in it.
pub fn decode_session_data(
    signer: &Signer,
    session_data: &str,
    max_age: Option<Duration>,
) -> Result<String, SessionError> {
    let object = signer.unsign_object(session_data, max_age)?;
    decode_identity(&object)
}

/// Builds a signed payload for `user_id` plus any extra fields.
///
/// `_auth_user_id` always wins over a same-named key in `extra`.
pub fn encode_session_data(
    signer: &Signer,
    user_id: &str,
    extra: Map<String, Value>,
    compress: bool,
) -> Result<String, SessionError> {
    let mut object = extra;
    object.insert(AUTH_USER_ID_KEY.to_owned(), Value::String(user_id.to_owned()));
    signer.sign_object(&object, compress)
}

/// Decodes an existing payload, applies `updates`, and signs it again.
///
/// A `null` update removes the key. The result carries a fresh timestamp.
/// The input payload's age is not checked.
pub fn update_session_data(
    signer: &Signer,
    session_data: &str,
    updates: Map<String, Value>,
    compress: bool,
) -> Result<String, SessionError> {
    let mut object: SessionObject = signer.unsign_object(session_data, None)?;

    for (key, value) in updates {
        if value.is_null() {
            object.remove(&key);
        } else {
            object.insert(key, value);
        }
    }

    signer.sign_object(&object, compress)
}
