//! In-memory session storage.
//!
//! Stands in for the framework's session table in tests and local tools.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use super::RawSession;
use super::store::SessionStore;
use crate::SessionError;

/// In-memory session store.
///
/// Records live in a `HashMap` behind a `RwLock`, keyed by session key.
/// Clones share the same map, so a test can keep one handle to seed records
/// while the [`SessionClient`](super::SessionClient) owns another.
///
/// Every call to [`find_session`](SessionStore::find_session) is counted,
/// which lets tests assert that malformed keys never reach the store.
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, RawSession>>>,
    lookups: Arc<AtomicUsize>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a record.
    pub fn insert(&self, session: RawSession) {
        if let Ok(mut sessions) = self.sessions.write() {
            sessions.insert(session.session_key.clone(), session);
        }
    }

    /// Removes a record, returning it if present.
    pub fn remove(&self, session_key: &str) -> Option<RawSession> {
        self.sessions
            .write()
            .ok()
            .and_then(|mut sessions| sessions.remove(session_key))
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.sessions.read().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of lookups served so far.
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn find_session(&self, session_key: &str) -> Result<Option<RawSession>, SessionError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);

        let sessions = self
            .sessions
            .read()
            .map_err(|_| SessionError::StoreError("Lock poisoned".to_owned()))?;

        Ok(sessions.get(session_key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    fn record(key: &str) -> RawSession {
        RawSession::new(key, "payload", Utc::now() + Duration::hours(2))
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = InMemorySessionStore::new();
        store.insert(record("abc"));

        let found = store.find_session("abc").await.unwrap();
        assert_eq!(found.map(|s| s.session_key), Some("abc".to_owned()));
        assert_eq!(store.lookup_count(), 1);
    }

    #[tokio::test]
    async fn test_find_nonexistent() {
        let store = InMemorySessionStore::new();
        assert!(store.find_session("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = InMemorySessionStore::new();
        let handle = store.clone();
        handle.insert(record("abc"));

        assert_eq!(store.len(), 1);
        assert!(store.find_session("abc").await.unwrap().is_some());
        assert_eq!(handle.lookup_count(), 1);
    }

    #[tokio::test]
    async fn test_remove() {
        let store = InMemorySessionStore::new();
        store.insert(record("abc"));
        assert!(store.remove("abc").is_some());
        assert!(store.is_empty());
        assert!(store.find_session("abc").await.unwrap().is_none());
    }
}
