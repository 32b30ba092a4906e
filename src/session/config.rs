use chrono::Duration;

use super::DEFAULT_COOKIE_NAME;
use crate::signing::{DEFAULT_SEPARATOR, DigestAlgorithm, SESSION_SALT, Signer};
use crate::{SecretString, SessionError};

pub const ENV_SECRET_KEY: &str = "DJANGO_SECRET_KEY";
pub const ENV_COOKIE_NAME: &str = "DJANGO_SESSION_COOKIE_NAME";
pub const ENV_SALT: &str = "DJANGO_SESSION_SALT";
pub const ENV_MAX_AGE: &str = "DJANGO_SESSION_MAX_AGE";
pub const ENV_ALGORITHM: &str = "DJANGO_SIGNING_ALGORITHM";

/// Settings for a [`SessionClient`](super::SessionClient).
///
/// Defaults match a stock Django project; only `secret_key` has to be set.
///
/// ```rust
/// use djsession::{SecretString, SessionClientConfig};
/// use chrono::Duration;
///
/// let config = SessionClientConfig {
///     secret_key: SecretString::new("django-insecure-abc"),
///     max_age: Some(Duration::weeks(2)),
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct SessionClientConfig {
    /// The framework's `SECRET_KEY`.
    pub secret_key: SecretString,
    /// Cookie carrying the session key. Default: `sessionid`.
    pub cookie_name: String,
    /// Signing salt. Default: `django.contrib.sessions.SessionStore`.
    pub salt: String,
    /// Default: `:`.
    pub separator: String,
    /// Default: SHA-256.
    pub algorithm: DigestAlgorithm,
    /// Maximum payload age. `None` or a non-positive duration disables the check.
    pub max_age: Option<Duration>,
}

impl Default for SessionClientConfig {
    fn default() -> Self {
        Self {
            secret_key: SecretString::default(),
            cookie_name: DEFAULT_COOKIE_NAME.to_owned(),
            salt: SESSION_SALT.to_owned(),
            separator: DEFAULT_SEPARATOR.to_owned(),
            algorithm: DigestAlgorithm::default(),
            max_age: None,
        }
    }
}

impl SessionClientConfig {
    /// Reads settings from the process environment.
    ///
    /// See [`from_lookup`](Self::from_lookup) for the variables consulted.
    pub fn from_env() -> Result<Self, SessionError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from a key lookup.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `DJANGO_SECRET_KEY` | `secret_key` (required) |
    /// | `DJANGO_SESSION_COOKIE_NAME` | `cookie_name` |
    /// | `DJANGO_SESSION_SALT` | `salt` |
    /// | `DJANGO_SESSION_MAX_AGE` | `max_age`, in seconds; `0` disables |
    /// | `DJANGO_SIGNING_ALGORITHM` | `algorithm` (`sha256`, `sha384`, `sha512`) |
    ///
    /// # Errors
    ///
    /// `SessionError::ConfigurationError` for a missing secret or an
    /// unparseable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SessionError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self {
            secret_key: lookup(ENV_SECRET_KEY)
                .map(SecretString::new)
                .unwrap_or_default(),
            ..Self::default()
        };

        if let Some(name) = lookup(ENV_COOKIE_NAME) {
            config.cookie_name = name;
        }
        if let Some(salt) = lookup(ENV_SALT) {
            config.salt = salt;
        }
        if let Some(algorithm) = lookup(ENV_ALGORITHM) {
            config.algorithm = algorithm.parse()?;
        }
        if let Some(max_age) = lookup(ENV_MAX_AGE) {
            let seconds: i64 = max_age.trim().parse().map_err(|_| {
                SessionError::ConfigurationError(format!(
                    "{ENV_MAX_AGE} must be a whole number of seconds, got {max_age:?}"
                ))
            })?;
            let max_age = Duration::try_seconds(seconds).ok_or_else(|| {
                SessionError::ConfigurationError(format!(
                    "{ENV_MAX_AGE} is out of range, got {seconds}"
                ))
            })?;
            config.max_age = Some(max_age);
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks the settings without building anything.
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.secret_key.is_empty() {
            return Err(SessionError::ConfigurationError(
                "secret key is required".to_owned(),
            ));
        }
        if self.cookie_name.is_empty() {
            return Err(SessionError::ConfigurationError(
                "cookie name must not be empty".to_owned(),
            ));
        }
        self.signer().map(|_| ())
    }

    /// The age bound to enforce, with zero and negative values treated as "off".
    pub fn effective_max_age(&self) -> Option<Duration> {
        self.max_age.filter(|age| *age > Duration::zero())
    }

    /// Builds the signer described by this config.
    pub fn signer(&self) -> Result<Signer, SessionError> {
        Signer::new(self.secret_key.clone())?
            .with_salt(self.salt.clone())
            .with_separator(self.separator.clone())
            .map(|signer| signer.with_algorithm(self.algorithm))
    }
}
