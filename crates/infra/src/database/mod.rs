//! SQLite storage adapters

mod event_repository;
mod manager;
mod member_repository;
mod token_repository;

pub use event_repository::SqliteEventRepository;
pub use manager::{DbConnection, DbManager};
pub use member_repository::SqliteMemberRepository;
pub use token_repository::SqliteTokenRepository;
