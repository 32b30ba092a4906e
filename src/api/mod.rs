//! HTTP integrations.

#[cfg(feature = "axum")]
pub mod axum;
