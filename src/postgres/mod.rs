//! `PostgreSQL` session store.
//!
//! Reads the `django_session` table of an existing Django database. The
//! table is owned by Django's migrations; nothing here creates or writes it.

mod session;

pub use session::PostgresSessionStore;
