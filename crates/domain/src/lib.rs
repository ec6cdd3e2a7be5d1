//! # Chorale Domain
//!
//! Business domain types and models for the Chorale backend.
//!
//! This crate contains:
//! - Domain data types (CalendarEvent, Member, OAuthTokenRecord, …)
//! - Domain error types and Result definitions
//! - Configuration structures
//! - The event-type classifier
//!
//! ## Architecture
//! - No dependencies on other Chorale crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod errors;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
// Re-export the classifier
pub use utils::classify::classify_event;
