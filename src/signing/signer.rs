//! Salted-HMAC signer compatible with `django.core.signing.TimestampSigner`.

use chrono::{DateTime, Duration, Utc};

use super::{DEFAULT_SEPARATOR, DigestAlgorithm, SESSION_SALT, SIGNER_SALT_SUFFIX};
use crate::codec::{b62_decode, b62_encode, b64_encode, constant_time_eq};
use crate::{SecretString, SessionError};

/// Signs and verifies values the way the framework's `TimestampSigner` does.
///
/// Key material is fixed at construction. A `Signer` holds no mutable state,
/// so one instance can be shared across threads and tasks.
///
/// # Wire format
///
/// ```text
/// value ":" base62(timestamp) ":" base64url_nopad(hmac(derive_key(salt + "signer"), value ":" base62(timestamp)))
/// ```
///
/// # Example
///
/// ```rust
/// use djsession::Signer;
///
/// let signer = Signer::new("s3cr3t").unwrap();
/// let token = signer.sign_with_timestamp("hello");
/// assert_eq!(signer.unsign_with_timestamp(&token, None).unwrap(), "hello");
/// ```
#[derive(Debug, Clone)]
pub struct Signer {
    secret: SecretString,
    salt: String,
    separator: String,
    algorithm: DigestAlgorithm,
}

impl Signer {
    /// Creates a signer using the session salt, `:` separator and SHA-256.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::ConfigurationError` if the secret is empty.
    pub fn new(secret: impl Into<SecretString>) -> Result<Self, SessionError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(SessionError::ConfigurationError(
                "secret key is required".to_owned(),
            ));
        }
        Ok(Self {
            secret,
            salt: SESSION_SALT.to_owned(),
            separator: DEFAULT_SEPARATOR.to_owned(),
            algorithm: DigestAlgorithm::default(),
        })
    }

    #[must_use]
    pub fn with_salt(mut self, salt: impl Into<String>) -> Self {
        self.salt = salt.into();
        self
    }

    /// Replaces the separator.
    ///
    /// # Errors
    ///
    /// The separator must contain at least one character outside the
    /// URL-safe base64 alphabet (`A-Za-z0-9-_=`), otherwise it could appear
    /// inside a signature or timestamp.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Result<Self, SessionError> {
        let separator = separator.into();
        let unsafe_only = separator
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '='));
        if unsafe_only {
            return Err(SessionError::ConfigurationError(format!(
                "unsafe signer separator: {separator:?} (cannot be empty or consist of only A-z0-9-_=)"
            )));
        }
        self.separator = separator;
        Ok(self)
    }

    #[must_use]
    pub fn with_algorithm(mut self, algorithm: DigestAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    #[must_use]
    pub fn salt(&self) -> &str {
        &self.salt
    }

    #[must_use]
    pub fn separator(&self) -> &str {
        &self.separator
    }

    #[must_use]
    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Derives the HMAC key as `digest(salt + secret)`.
    ///
    /// The signer never keys the HMAC with the raw secret.
    #[must_use]
    pub fn derive_key(&self, salt: &str) -> Vec<u8> {
        let mut material = String::with_capacity(salt.len() + self.secret.expose_secret().len());
        material.push_str(salt);
        material.push_str(self.secret.expose_secret());
        self.algorithm.digest(material.as_bytes())
    }

    /// Returns the base64url signature of `value`.
    #[must_use]
    pub fn sign(&self, value: &str) -> String {
        let key_salt = format!("{}{SIGNER_SALT_SUFFIX}", self.salt);
        let key = self.derive_key(&key_salt);
        b64_encode(&self.algorithm.hmac(&key, value.as_bytes()))
    }

    /// Returns `value`, the separator and its signature joined together.
    #[must_use]
    pub fn sign_value(&self, value: &str) -> String {
        format!("{value}{}{}", self.separator, self.sign(value))
    }

    /// Verifies `signed_value` and returns the part before the signature.
    ///
    /// Splits on the last separator, so the value itself may contain it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidSignature` if no separator is present
    /// or the signature does not match.
    pub fn unsign<'a>(&self, signed_value: &'a str) -> Result<&'a str, SessionError> {
        let (value, signature) = signed_value
            .rsplit_once(self.separator.as_str())
            .ok_or(SessionError::InvalidSignature)?;

        let expected = self.sign(value);
        if constant_time_eq(signature.as_bytes(), expected.as_bytes()) {
            Ok(value)
        } else {
            Err(SessionError::InvalidSignature)
        }
    }

    /// Signs `value` with the current time embedded.
    #[must_use]
    pub fn sign_with_timestamp(&self, value: &str) -> String {
        self.sign_with_timestamp_at(value, Utc::now())
    }

    /// Signs `value` with an explicit timestamp (whole seconds).
    #[must_use]
    pub fn sign_with_timestamp_at(&self, value: &str, signed_at: DateTime<Utc>) -> String {
        let timestamped = format!(
            "{value}{}{}",
            self.separator,
            b62_encode(signed_at.timestamp())
        );
        self.sign_value(&timestamped)
    }

    /// Verifies a timestamped token and optionally enforces its age.
    ///
    /// Age is measured against the wall clock at call time, so the same
    /// token can verify now and be rejected later.
    ///
    /// # Errors
    ///
    /// - `SessionError::InvalidSignature` if the signature check fails.
    /// - `SessionError::InvalidTimestamp` if the timestamp is missing or malformed.
    /// - `SessionError::SessionExpired` if the token is older than `max_age`.
    pub fn unsign_with_timestamp<'a>(
        &self,
        token: &'a str,
        max_age: Option<Duration>,
    ) -> Result<&'a str, SessionError> {
        self.unsign_with_timestamp_at(token, max_age, Utc::now())
    }

    /// Same as [`unsign_with_timestamp`](Self::unsign_with_timestamp) with
    /// an explicit clock.
    ///
    /// A token is expired when `now - signed_at > max_age`; an age of
    /// exactly `max_age` still verifies.
    pub fn unsign_with_timestamp_at<'a>(
        &self,
        token: &'a str,
        max_age: Option<Duration>,
        now: DateTime<Utc>,
    ) -> Result<&'a str, SessionError> {
        let timestamped = self.unsign(token)?;
        let (value, encoded_ts) = timestamped
            .rsplit_once(self.separator.as_str())
            .ok_or(SessionError::InvalidTimestamp)?;

        let timestamp = b62_decode(encoded_ts).map_err(|_| SessionError::InvalidTimestamp)?;

        if let Some(max_age) = max_age {
            let signed_at =
                DateTime::from_timestamp(timestamp, 0).ok_or(SessionError::InvalidTimestamp)?;
            if now - signed_at > max_age {
                return Err(SessionError::SessionExpired);
            }
        }

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "s3cr3t";

    fn fixed_time() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_new_rejects_empty_secret() {
        assert!(matches!(
            Signer::new(""),
            Err(SessionError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_defaults() {
        let signer = Signer::new(SECRET).unwrap();
        assert_eq!(signer.salt(), "django.contrib.sessions.SessionStore");
        assert_eq!(signer.separator(), ":");
        assert_eq!(signer.algorithm(), DigestAlgorithm::Sha256);
    }

    #[test]
    fn test_derive_key_matches_reference() {
        let signer = Signer::new(SECRET).unwrap();
        let key = signer.derive_key("django.contrib.sessions.SessionStoresigner");
        assert_eq!(
            hex::encode(key),
            "8ec91ef3c55920d9df6e11d476fbc5cc9c82d5bfc69565db798dfc4531895959"
        );
    }

    #[test]
    fn test_signature_matches_reference() {
        let signer = Signer::new(SECRET).unwrap();
        assert_eq!(
            signer.sign("hello"),
            "43A1j-cEkJTOQvZWOkmy5Ff-TveO0GMcAiEzG60TgOo"
        );

        let core = Signer::new(SECRET).unwrap().with_salt("django.core.signing");
        assert_eq!(
            core.sign("hello"),
            "pamgEl2fTwL4iif18HT3vIErLzx5X5VxwXT2TtrgDXw"
        );

        let sha512 = Signer::new(SECRET)
            .unwrap()
            .with_algorithm(DigestAlgorithm::Sha512);
        assert_eq!(
            sha512.sign("hello"),
            "Tz7U-gz5FgjNXuz6j2-jIMaknU3Qv2-Ag6zUA6NP8ie8yaJM8Kmiu3qKzTUw0O20Y8CJVz87OY_k-JVBJNx3qg"
        );
    }

    #[test]
    fn test_timestamp_token_matches_reference() {
        let signer = Signer::new(SECRET).unwrap();
        let token = signer.sign_with_timestamp_at("hello", fixed_time());
        assert_eq!(
            token,
            "hello:1r31eq:WcQToNeL0hIaV6O2fkd6xSm9_AeLcjPRpzfEthObrT0"
        );
    }

    #[test]
    fn test_unsign_roundtrip() {
        let signer = Signer::new(SECRET).unwrap();
        let signed = signer.sign_value("some value");
        assert_eq!(signer.unsign(&signed).unwrap(), "some value");
    }

    #[test]
    fn test_unsign_without_separator() {
        let signer = Signer::new(SECRET).unwrap();
        assert_eq!(
            signer.unsign("no-separator-here"),
            Err(SessionError::InvalidSignature)
        );
    }

    #[test]
    fn test_unsign_value_containing_separator() {
        let signer = Signer::new(SECRET).unwrap();
        let token = signer.sign_with_timestamp("a:b:c");
        assert_eq!(signer.unsign_with_timestamp(&token, None).unwrap(), "a:b:c");
    }

    #[test]
    fn test_unsign_wrong_secret() {
        let signer = Signer::new(SECRET).unwrap();
        let other = Signer::new("another-secret").unwrap();
        let token = signer.sign_with_timestamp("hello");
        assert_eq!(
            other.unsign_with_timestamp(&token, None),
            Err(SessionError::InvalidSignature)
        );
    }

    #[test]
    fn test_unsign_wrong_salt() {
        let signer = Signer::new(SECRET).unwrap();
        let other = Signer::new(SECRET).unwrap().with_salt("other.salt");
        let token = signer.sign_value("hello");
        assert_eq!(other.unsign(&token), Err(SessionError::InvalidSignature));
    }

    #[test]
    fn test_max_age_boundary() {
        let signer = Signer::new(SECRET).unwrap();
        let token = signer.sign_with_timestamp_at("hello", fixed_time());
        let max_age = Duration::seconds(60);

        let within = fixed_time() + Duration::seconds(59);
        let exact = fixed_time() + Duration::seconds(60);
        let past = fixed_time() + Duration::seconds(60) + Duration::milliseconds(1);

        assert_eq!(
            signer.unsign_with_timestamp_at(&token, Some(max_age), within),
            Ok("hello")
        );
        assert_eq!(
            signer.unsign_with_timestamp_at(&token, Some(max_age), exact),
            Ok("hello")
        );
        assert_eq!(
            signer.unsign_with_timestamp_at(&token, Some(max_age), past),
            Err(SessionError::SessionExpired)
        );
    }

    #[test]
    fn test_no_max_age_accepts_old_tokens() {
        let signer = Signer::new(SECRET).unwrap();
        let token = signer.sign_with_timestamp_at("hello", fixed_time());
        assert_eq!(signer.unsign_with_timestamp(&token, None), Ok("hello"));
    }

    #[test]
    fn test_invalid_timestamp() {
        let signer = Signer::new(SECRET).unwrap();

        // validly signed, but the timestamp segment is not base62
        let token = signer.sign_value("hello:not*base62");
        assert_eq!(
            signer.unsign_with_timestamp(&token, None),
            Err(SessionError::InvalidTimestamp)
        );

        // validly signed, but no timestamp segment at all
        let token = signer.sign_value("hello");
        assert_eq!(
            signer.unsign_with_timestamp(&token, None),
            Err(SessionError::InvalidTimestamp)
        );
    }

    #[test]
    fn test_custom_separator() {
        let signer = Signer::new(SECRET).unwrap().with_separator("/").unwrap();
        let token = signer.sign_with_timestamp_at("a:b", fixed_time());
        assert!(token.starts_with("a:b/1r31eq/"));
        assert_eq!(signer.unsign_with_timestamp(&token, None).unwrap(), "a:b");
    }

    #[test]
    fn test_unsafe_separator_rejected() {
        for sep in ["", "a", "-", "_", "=", "abc"] {
            assert!(
                Signer::new(SECRET).unwrap().with_separator(sep).is_err(),
                "{sep:?}"
            );
        }
    }
}
