//! Reproduction of Django's `django.core.signing` module.
//!
//! | Item | Django counterpart |
//! |------|--------------------|
//! | [`Signer::derive_key`] | the key step of `salted_hmac` |
//! | [`Signer::sign`] / [`Signer::unsign`] | `Signer.signature` / `Signer.unsign` |
//! | [`Signer::sign_with_timestamp`] / [`Signer::unsign_with_timestamp`] | `TimestampSigner.sign` / `.unsign` |
//! | [`Signer::sign_object`] / [`Signer::unsign_object`] | `signing.dumps` / `signing.loads` |
//!
//! Everything here is pure: no I/O, no logging, no shared state.

mod algorithm;
mod object;
mod signer;

pub use algorithm::DigestAlgorithm;
pub use object::{COMPRESSED_MARKER, SessionObject};
pub use signer::Signer;

/// Salt used by `django.contrib.sessions` backends.
pub const SESSION_SALT: &str = "django.contrib.sessions.SessionStore";

/// Salt used by `signing.dumps` when none is given.
pub const DEFAULT_SALT: &str = "django.core.signing";

/// Appended to the salt before key derivation (`Signer` namespacing).
pub const SIGNER_SALT_SUFFIX: &str = "signer";

pub const DEFAULT_SEPARATOR: &str = ":";
