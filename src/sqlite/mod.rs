//! `SQLite` session store.
//!
//! Reads the `django_session` table written by Django's `SQLite` backend.
//! [`migrations::run`] creates the same table for local development and
//! tests.

pub mod migrations;
mod session;

pub use session::SqliteSessionStore;
