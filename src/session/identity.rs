//! Extraction of `_auth_user_id` from a decoded payload.

use serde_json::Value;

use super::AUTH_USER_ID_KEY;
use crate::SessionError;
use crate::signing::SessionObject;

/// The identity field as found in the JSON payload.
///
/// JSON numbers arrive either as exact integers or as floats; both shapes
/// are kept so normalisation can check a float for an integral value.
#[derive(Debug, Clone, PartialEq)]
pub enum IdentityValue<'a> {
    String(&'a str),
    Integer(i128),
    Float(f64),
    /// Any other JSON type, carrying its name for the error message.
    Other(&'static str),
}

impl<'a> IdentityValue<'a> {
    pub fn from_json(value: &'a Value) -> Self {
        match value {
            Value::String(s) => Self::String(s),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Integer(i128::from(i))
                } else if let Some(u) = n.as_u64() {
                    Self::Integer(i128::from(u))
                } else {
                    n.as_f64().map_or(Self::Other("number"), Self::Float)
                }
            }
            Value::Null => Self::Other("null"),
            Value::Bool(_) => Self::Other("bool"),
            Value::Array(_) => Self::Other("array"),
            Value::Object(_) => Self::Other("object"),
        }
    }

    /// Renders the identity as the string the framework would use.
    ///
    /// Integral floats render without a fractional part or exponent
    /// (`12345.0` becomes `"12345"`).
    ///
    /// # Errors
    ///
    /// `SessionError::UnsupportedIdentityType` for non-integral floats and
    /// every non-string, non-number type.
    pub fn normalize(&self) -> Result<String, SessionError> {
        match self {
            Self::String(s) => Ok((*s).to_owned()),
            Self::Integer(i) => Ok(i.to_string()),
            Self::Float(f) if f.is_finite() && f.fract() == 0.0 => Ok(format!("{f:.0}")),
            Self::Float(f) => Err(SessionError::UnsupportedIdentityType(format!(
                "non-integral number {f}"
            ))),
            Self::Other(kind) => Err(SessionError::UnsupportedIdentityType((*kind).to_owned())),
        }
    }
}

/// Returns the normalised `_auth_user_id` of a decoded session.
///
/// # Errors
///
/// `SessionError::IdentityNotFound` when the key is absent,
/// `SessionError::UnsupportedIdentityType` when its value cannot be
/// rendered as an identifier.
pub fn decode_identity(object: &SessionObject) -> Result<String, SessionError> {
    let value = object
        .get(AUTH_USER_ID_KEY)
        .ok_or(SessionError::IdentityNotFound)?;
    IdentityValue::from_json(value).normalize()
}
