//! SQLite-backed implementation of the EventRepository port.

use std::sync::Arc;

use async_trait::async_trait;
use chorale_domain::{CalendarEvent, ChoraleError, EventCategory, Result};
use chorale_core::EventRepository;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rusqlite::{OptionalExtension, Row, ToSql};
use tracing::{debug, instrument};

use super::manager::{map_sql_error, DbManager};

const DATE_FMT: &str = "%Y-%m-%d";
const TIME_FMT: &str = "%H:%M";

const EVENT_COLUMNS: &str = "id, title, description, location, date, time, category, all_day, \
                             created_by, provider_event_id, synced_at, created_at";

/// SQLite implementation of EventRepository
pub struct SqliteEventRepository {
    db: Arc<DbManager>,
}

impl SqliteEventRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EventRepository for SqliteEventRepository {
    #[instrument(skip(self))]
    async fn find_by_provider_id(&self, provider_event_id: &str) -> Result<Option<CalendarEvent>> {
        let conn = self.db.get_connection()?;

        conn.query_row(
            &format!(
                "SELECT {EVENT_COLUMNS} FROM calendar_events WHERE provider_event_id = ?1"
            ),
            [provider_event_id],
            row_to_event,
        )
        .optional()
        .map_err(map_sql_error)
    }

    #[instrument(skip(self, event), fields(event_id = %event.id))]
    async fn insert(&self, event: &CalendarEvent) -> Result<()> {
        let conn = self.db.get_connection()?;
        let stored = StoredEvent::from(event);

        conn.execute(
            "INSERT INTO calendar_events (
                id, title, description, location, date, time, category, all_day,
                created_by, provider_event_id, synced_at, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            stored.params().as_ref(),
        )
        .map_err(map_sql_error)?;

        debug!(event_id = %event.id, "inserted calendar event");
        Ok(())
    }

    #[instrument(skip(self, event), fields(event_id = %event.id))]
    async fn update(&self, event: &CalendarEvent) -> Result<()> {
        let conn = self.db.get_connection()?;
        let stored = StoredEvent::from(event);

        let changed = conn
            .execute(
                "UPDATE calendar_events SET
                    title = ?2, description = ?3, location = ?4, date = ?5, time = ?6,
                    category = ?7, all_day = ?8, created_by = ?9, provider_event_id = ?10,
                    synced_at = ?11, created_at = ?12
                 WHERE id = ?1",
                stored.params().as_ref(),
            )
            .map_err(map_sql_error)?;

        if changed == 0 {
            return Err(ChoraleError::NotFound(format!("calendar event {}", event.id)));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_unpushed_since(&self, date: NaiveDate) -> Result<Vec<CalendarEvent>> {
        let conn = self.db.get_connection()?;

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {EVENT_COLUMNS} FROM calendar_events
                 WHERE provider_event_id IS NULL AND date >= ?1
                 ORDER BY date, time"
            ))
            .map_err(map_sql_error)?;

        let events = stmt
            .query_map([date.format(DATE_FMT).to_string()], row_to_event)
            .map_err(map_sql_error)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(map_sql_error)?;

        Ok(events)
    }

    #[instrument(skip(self))]
    async fn mark_pushed(
        &self,
        event_id: &str,
        provider_event_id: &str,
        synced_at: DateTime<Utc>,
    ) -> Result<()> {
        let conn = self.db.get_connection()?;

        let changed = conn
            .execute(
                "UPDATE calendar_events SET provider_event_id = ?2, synced_at = ?3 WHERE id = ?1",
                [&event_id as &dyn ToSql, &provider_event_id, &synced_at.timestamp()].as_ref(),
            )
            .map_err(map_sql_error)?;

        if changed == 0 {
            return Err(ChoraleError::NotFound(format!("calendar event {event_id}")));
        }
        Ok(())
    }
}

/// Column-shaped view of an event, holding the formatted values so that
/// parameter slices can borrow them.
struct StoredEvent<'a> {
    event: &'a CalendarEvent,
    date: String,
    time: Option<String>,
    category: &'static str,
    synced_at: Option<i64>,
    created_at: i64,
}

impl<'a> From<&'a CalendarEvent> for StoredEvent<'a> {
    fn from(event: &'a CalendarEvent) -> Self {
        Self {
            event,
            date: event.date.format(DATE_FMT).to_string(),
            time: event.time.map(|t| t.format(TIME_FMT).to_string()),
            category: event.category.as_str(),
            synced_at: event.synced_at.map(|t| t.timestamp()),
            created_at: event.created_at.timestamp(),
        }
    }
}

impl StoredEvent<'_> {
    fn params(&self) -> [&dyn ToSql; 12] {
        [
            &self.event.id,
            &self.event.title,
            &self.event.description,
            &self.event.location,
            &self.date,
            &self.time,
            &self.category,
            &self.event.all_day,
            &self.event.created_by,
            &self.event.provider_event_id,
            &self.synced_at,
            &self.created_at,
        ]
    }
}

fn row_to_event(row: &Row<'_>) -> rusqlite::Result<CalendarEvent> {
    let date_raw: String = row.get(4)?;
    let date = NaiveDate::parse_from_str(&date_raw, DATE_FMT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let time_raw: Option<String> = row.get(5)?;
    let time = match time_raw {
        Some(raw) => Some(NaiveTime::parse_from_str(&raw, TIME_FMT).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
        })?),
        None => None,
    };

    let category_raw: String = row.get(6)?;
    let synced_at: Option<i64> = row.get(10)?;
    let created_at: i64 = row.get(11)?;

    Ok(CalendarEvent {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        location: row.get(3)?,
        date,
        time,
        category: EventCategory::parse(&category_raw),
        all_day: row.get(7)?,
        created_by: row.get(8)?,
        provider_event_id: row.get(9)?,
        synced_at: synced_at.and_then(|ts| DateTime::from_timestamp(ts, 0)),
        created_at: DateTime::from_timestamp(created_at, 0).unwrap_or_default(),
    })
}
