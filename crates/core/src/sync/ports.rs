//! Port interfaces for the calendar synchronizer
//!
//! Infrastructure adapters (database, Google API, lease manager) implement
//! these traits; the sync service and reconciler depend only on them.

use async_trait::async_trait;
use chorale_domain::{CalendarEvent, Member, OAuthTokenRecord, Result, SyncConfig};
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, Utc};

/// Time window and page cap for a provider read
#[derive(Debug, Clone, Copy)]
pub struct SyncWindow {
    pub time_min: DateTime<Utc>,
    pub time_max: DateTime<Utc>,
    /// Single-page result cap; events beyond it are not fetched
    pub max_results: u32,
}

impl SyncWindow {
    /// Build the configured lookback/lookahead window around `now`
    pub fn around(now: DateTime<Utc>, config: &SyncConfig) -> Self {
        Self {
            time_min: now - Duration::days(config.lookback_days),
            time_max: now + Duration::days(config.lookahead_days),
            max_results: config.max_results,
        }
    }

    /// Calendar day of the window's lower bound; local-only events older than
    /// this are not pushed
    pub fn lower_bound_date(&self) -> NaiveDate {
        self.time_min.date_naive()
    }
}

/// When an incoming remote event takes place
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteWhen {
    /// Date range with an exclusive end, per calendar convention
    AllDay { start: NaiveDate, end: NaiveDate },
    /// Timezone-qualified start; the end is absent on some providers
    Timed { start: DateTime<FixedOffset>, end: Option<DateTime<FixedOffset>> },
}

/// An event as read from the external provider
#[derive(Debug, Clone)]
pub struct RemoteEvent {
    pub id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub when: RemoteWhen,
}

/// When an outgoing draft takes place
///
/// Timed drafts carry naive datetimes; the provider adapter attaches the
/// configured timezone on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftWhen {
    /// Date range with an exclusive end (end = start + 1 day for one-day events)
    AllDay { start: NaiveDate, end: NaiveDate },
    Timed { start: NaiveDateTime, end: NaiveDateTime },
}

/// A local-only event shaped for creation on the provider
#[derive(Debug, Clone)]
pub struct RemoteEventDraft {
    pub summary: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub when: DraftWhen,
}

/// Result of exchanging a refresh token
#[derive(Debug, Clone)]
pub struct TokenRefresh {
    pub access_token: String,
    /// Lifetime of the new access token in seconds
    pub expires_in: i64,
}

/// External calendar provider operations
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    /// Fetch all events in the window, recurring events expanded, capped at
    /// `window.max_results`
    async fn list_events(&self, access_token: &str, window: &SyncWindow)
        -> Result<Vec<RemoteEvent>>;

    /// Create an event on the provider and return its provider id
    async fn create_event(&self, access_token: &str, draft: &RemoteEventDraft) -> Result<String>;

    /// Exchange a refresh token for a new access token
    async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenRefresh>;
}

/// Local event storage
#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn find_by_provider_id(&self, provider_event_id: &str) -> Result<Option<CalendarEvent>>;

    async fn insert(&self, event: &CalendarEvent) -> Result<()>;

    /// Overwrite an existing row in full (keyed by `event.id`)
    async fn update(&self, event: &CalendarEvent) -> Result<()>;

    /// Events with no provider id dated on or after `date`
    async fn find_unpushed_since(&self, date: NaiveDate) -> Result<Vec<CalendarEvent>>;

    /// Record a successful push: provider id plus sync timestamp
    async fn mark_pushed(
        &self,
        event_id: &str,
        provider_event_id: &str,
        synced_at: DateTime<Utc>,
    ) -> Result<()>;
}

/// Stored OAuth grants, one per member
#[async_trait]
pub trait TokenRepository: Send + Sync {
    async fn find_for_member(&self, member_id: &str) -> Result<Option<OAuthTokenRecord>>;

    async fn update_access_token(
        &self,
        member_id: &str,
        access_token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()>;
}

/// Member lookup for authentication and authorization
#[async_trait]
pub trait MemberRepository: Send + Sync {
    async fn find_by_api_token(&self, api_token: &str) -> Result<Option<Member>>;

    /// The member the super-admin override token authenticates as
    async fn find_super_admin(&self) -> Result<Option<Member>>;
}

/// Held for the duration of one sync; released on drop, including error paths
pub trait SyncLease: Send + std::fmt::Debug {}

/// Per-member mutual exclusion around the whole sync
///
/// Acquiring a lease that is already held fails fast with a `Conflict` error
/// rather than queueing.
pub trait SyncLeaseManager: Send + Sync {
    fn acquire(&self, member_id: &str) -> Result<Box<dyn SyncLease>>;
}
