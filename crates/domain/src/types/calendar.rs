//! Calendar event types

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed set of event categories recognised by the club
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Rehearsal,
    Concert,
    Sectional,
    Tour,
    Special,
}

impl EventCategory {
    /// Stable text form used in the database
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rehearsal => "rehearsal",
            Self::Concert => "concert",
            Self::Sectional => "sectional",
            Self::Tour => "tour",
            Self::Special => "special",
        }
    }

    /// Parse the database text form; unknown values fall back to `Special`
    pub fn parse(value: &str) -> Self {
        match value {
            "rehearsal" => Self::Rehearsal,
            "concert" => Self::Concert,
            "sectional" => Self::Sectional,
            "tour" => Self::Tour,
            _ => Self::Special,
        }
    }
}

/// A club event stored locally
///
/// `provider_event_id` is null until the event has been pulled from or pushed
/// to the external calendar provider; once set, `synced_at` records the last
/// reconciliation touch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    /// Calendar day of the event
    pub date: NaiveDate,
    /// Wall-clock start time; absent for all-day events
    pub time: Option<NaiveTime>,
    pub category: EventCategory,
    pub all_day: bool,
    /// Member that created the record (or ran the sync that pulled it)
    pub created_by: Option<String>,
    /// The provider's own id for this event, when known
    pub provider_event_id: Option<String>,
    pub synced_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Aggregate counters returned by a full sync
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStats {
    /// Events read from the provider in the sync window
    pub events_fetched: usize,
    pub events_created_locally: usize,
    pub events_updated_locally: usize,
    /// Local-only events newly pushed to the provider
    pub events_pushed_to_provider: usize,
    /// Push attempts that failed (logged server-side, non-fatal)
    pub push_failures: usize,
}
