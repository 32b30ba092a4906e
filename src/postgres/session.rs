use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Row};

use crate::{RawSession, SessionError, SessionStore};

#[derive(Clone)]
pub struct PostgresSessionStore {
    pool: PgPool,
}

impl PostgresSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// `expire_date` is `timestamptz` under `USE_TZ = True` and a naive UTC
/// `timestamp` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExpireDate {
    Aware(DateTime<Utc>),
    Naive(NaiveDateTime),
}

impl ExpireDate {
    fn into_utc(self) -> DateTime<Utc> {
        match self {
            Self::Aware(at) => at,
            Self::Naive(at) => at.and_utc(),
        }
    }
}

struct SessionRecord {
    session_key: String,
    session_data: String,
    expire_date: ExpireDate,
}

impl<'r> FromRow<'r, PgRow> for SessionRecord {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let expire_date = match row.try_get::<DateTime<Utc>, _>("expire_date") {
            Ok(at) => ExpireDate::Aware(at),
            Err(sqlx::Error::ColumnDecode { .. }) => {
                ExpireDate::Naive(row.try_get::<NaiveDateTime, _>("expire_date")?)
            }
            Err(e) => return Err(e),
        };

        Ok(Self {
            session_key: row.try_get("session_key")?,
            session_data: row.try_get("session_data")?,
            expire_date,
        })
    }
}

impl From<SessionRecord> for RawSession {
    fn from(row: SessionRecord) -> Self {
        Self {
            session_key: row.session_key,
            session_data: row.session_data,
            expire_date: row.expire_date.into_utc(),
        }
    }
}

#[async_trait]
impl SessionStore for PostgresSessionStore {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, err))]
    async fn find_session(&self, session_key: &str) -> Result<Option<RawSession>, SessionError> {
        let row: Option<SessionRecord> = sqlx::query_as(
            r"SELECT session_key, session_data, expire_date
               FROM django_session WHERE session_key = $1",
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

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn record(expire_date: ExpireDate) -> SessionRecord {
        SessionRecord {
            session_key: "abc123".to_owned(),
            session_data: "payload".to_owned(),
            expire_date,
        }
    }

    #[test]
    fn test_naive_expire_date_is_utc() {
        let naive = NaiveDate::from_ymd_opt(2099, 1, 2)
            .and_then(|d| d.and_hms_micro_opt(3, 4, 5, 123_456))
            .unwrap();

        let session = RawSession::from(record(ExpireDate::Naive(naive)));
        assert_eq!(session.session_key, "abc123");
        assert_eq!(session.session_data, "payload");
        assert_eq!(session.expire_date.to_rfc3339(), "2099-01-02T03:04:05.123456+00:00");
        assert!(!session.is_expired());
    }

    #[test]
    fn test_aware_and_naive_agree() {
        let aware = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let naive = aware.naive_utc();

        let from_aware = RawSession::from(record(ExpireDate::Aware(aware)));
        let from_naive = RawSession::from(record(ExpireDate::Naive(naive)));
        assert_eq!(from_aware, from_naive);
        assert!(from_naive.is_expired());
    }
}
