//! Google Calendar integration

mod provider;

pub use provider::GoogleCalendarProvider;
