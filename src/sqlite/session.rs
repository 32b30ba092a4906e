use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::{FromRow, SqlitePool};

use crate::{RawSession, SessionError, SessionStore};

#[derive(Clone)]
pub struct SqliteSessionStore {
    pool: SqlitePool,
}

impl SqliteSessionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Django stores `expire_date` as naive UTC text
/// (`YYYY-MM-DD HH:MM:SS[.ffffff]`) on `SQLite`.
#[derive(FromRow)]
struct SessionRecord {
    session_key: String,
    session_data: String,
    expire_date: NaiveDateTime,
}

impl From<SessionRecord> for RawSession {
    fn from(row: SessionRecord) -> Self {
        Self {
            session_key: row.session_key,
            session_data: row.session_data,
            expire_date: row.expire_date.and_utc(),
        }
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, err))]
    async fn find_session(&self, session_key: &str) -> Result<Option<RawSession>, SessionError> {
        let row: Option<SessionRecord> = sqlx::query_as(
            r"SELECT session_key, session_data, expire_date
               FROM django_session WHERE session_key = ?",
        )
        .bind(session_key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            log::error!(target: "djsession", "msg=\"database error\", operation=\"find_session\", error=\"{e}\"");
            SessionError::StoreError(format!("database query failed: {e}"))
        })?;

        Ok(row.map(RawSession::from))
    }
}
