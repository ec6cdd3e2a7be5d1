//! Domain types and models

pub mod calendar;
pub mod member;
pub mod token;

pub use calendar::{CalendarEvent, EventCategory, SyncStats};
pub use member::{Member, MemberRole};
pub use token::OAuthTokenRecord;
