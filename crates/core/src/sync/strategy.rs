//! Conflict resolution between a stored event and its remote counterpart

use chorale_domain::{CalendarEvent, EventCategory};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

/// Content fields extracted from a remote event after classification
#[derive(Debug, Clone)]
pub struct RemoteEventFields {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub all_day: bool,
    pub category: EventCategory,
}

/// Decides how an already-stored event absorbs an incoming remote version
pub trait ConflictStrategy: Send + Sync {
    fn merge(
        &self,
        local: &CalendarEvent,
        incoming: &RemoteEventFields,
        synced_at: DateTime<Utc>,
    ) -> CalendarEvent;
}

/// The remote copy wins outright: every content field is overwritten while
/// local identity (id, creator, creation time, provider link) is preserved.
#[derive(Debug, Default, Clone, Copy)]
pub struct RemoteWinsStrategy;

impl ConflictStrategy for RemoteWinsStrategy {
    fn merge(
        &self,
        local: &CalendarEvent,
        incoming: &RemoteEventFields,
        synced_at: DateTime<Utc>,
    ) -> CalendarEvent {
        CalendarEvent {
            id: local.id.clone(),
            title: incoming.title.clone(),
            description: incoming.description.clone(),
            location: incoming.location.clone(),
            date: incoming.date,
            time: incoming.time,
            category: incoming.category,
            all_day: incoming.all_day,
            created_by: local.created_by.clone(),
            provider_event_id: local.provider_event_id.clone(),
            synced_at: Some(synced_at),
            created_at: local.created_at,
        }
    }
}
