//! Session store capability.

use async_trait::async_trait;

use super::RawSession;
use crate::SessionError;

/// Read-only access to the framework's session table.
///
/// Implementations:
/// - [`InMemorySessionStore`](super::InMemorySessionStore): in-process fake for tests
/// - `PostgresSessionStore` (feature `sqlx_postgres`)
/// - `SqliteSessionStore` (feature `sqlx_sqlite`)
///
/// Cancellation and timeouts belong to the caller: dropping the future
/// abandons the query.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Looks a session up by key.
    ///
    /// Returns `Ok(None)` when no row exists. Any other failure must be
    /// reported as `SessionError::StoreError`.
    async fn find_session(&self, session_key: &str) -> Result<Option<RawSession>, SessionError>;
}

#[async_trait]
impl<S> SessionStore for std::sync::Arc<S>
where
    S: SessionStore + ?Sized,
{
    async fn find_session(&self, session_key: &str) -> Result<Option<RawSession>, SessionError> {
        (**self).find_session(session_key).await
    }
}
