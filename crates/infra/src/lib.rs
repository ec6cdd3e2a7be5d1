//! Infrastructure adapters for Chorale
//!
//! Implements the ports defined in `chorale-core`: SQLite-backed storage,
//! the Google Calendar provider, the in-process sync lease, and the
//! configuration loader.

pub mod config;
pub mod database;
pub mod errors;
pub mod integrations;
pub mod sync_lease;

pub use database::{DbConnection, DbManager, SqliteEventRepository, SqliteMemberRepository, SqliteTokenRepository};
pub use errors::InfraError;
pub use integrations::google::GoogleCalendarProvider;
pub use sync_lease::InProcessSyncLease;
