//! Schema for the `django_session` table on `SQLite`.
//!
//! Mirrors Django's `sessions.0001_initial` so tests and local tools can
//! run without a Django checkout. Against a real Django database the table
//! already exists and every statement is a no-op.
//!
//! # Example
//!
//! ```rust,ignore
//! use djsession::sqlite::migrations;
//! use sqlx::SqlitePool;
//!
//! async fn setup_database(pool: &SqlitePool) -> Result<(), sqlx::Error> {
//!     migrations::run(pool).await?;
//!     Ok(())
//! }
//! ```

use sqlx::{Executor, SqlitePool};

const MIGRATIONS: &[(&str, &str)] = &[(
    "sessions_0001_initial",
    include_str!("../../migrations_sqlite/0001_initial_django_session.sql"),
)];

/// Creates the session table and its expiry index if they are missing.
pub async fn run(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for (name, sql) in MIGRATIONS {
        // SQLite runs one statement per execute; the bundled SQL has no
        // semicolons inside literals.
        for statement in sql.split(';') {
            let trimmed = statement.trim();
            if !trimmed.is_empty() {
                pool.execute(trimmed).await?;
            }
        }
        log::debug!(target: "djsession", "msg=\"migration applied\", name=\"{name}\"");
    }
    Ok(())
}
