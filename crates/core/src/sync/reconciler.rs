//! Two-way reconciliation between local events and provider events
//!
//! Pull: every remote event either overwrites its stored counterpart (matched
//! by provider id, remote copy wins) or is inserted fresh. Push: local events
//! that have never been pushed and fall inside the window are created on the
//! provider; individual push failures are logged and counted, never fatal.

use std::sync::Arc;

use chorale_domain::{classify_event, CalendarEvent, SyncStats};
use chrono::{Duration, Utc};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::ports::{
    CalendarProvider, DraftWhen, EventRepository, RemoteEvent, RemoteEventDraft, RemoteWhen,
    SyncWindow,
};
use super::strategy::{ConflictStrategy, RemoteEventFields};

pub struct EventReconciler {
    events: Arc<dyn EventRepository>,
    provider: Arc<dyn CalendarProvider>,
    strategy: Arc<dyn ConflictStrategy>,
    push_concurrency: usize,
}

impl EventReconciler {
    pub fn new(
        events: Arc<dyn EventRepository>,
        provider: Arc<dyn CalendarProvider>,
        strategy: Arc<dyn ConflictStrategy>,
        push_concurrency: usize,
    ) -> Self {
        Self { events, provider, strategy, push_concurrency: push_concurrency.max(1) }
    }

    /// Run the pull then push phases and report what happened
    #[instrument(skip(self, access_token, remote_events), fields(remote_count = remote_events.len()))]
    pub async fn reconcile(
        &self,
        caller_id: &str,
        access_token: &str,
        remote_events: Vec<RemoteEvent>,
        window: &SyncWindow,
    ) -> chorale_domain::Result<SyncStats> {
        let mut stats = SyncStats { events_fetched: remote_events.len(), ..Default::default() };

        for remote in remote_events {
            self.apply_remote(caller_id, remote, &mut stats).await?;
        }

        self.push_local_only(access_token, window, &mut stats).await?;

        Ok(stats)
    }

    async fn apply_remote(
        &self,
        caller_id: &str,
        remote: RemoteEvent,
        stats: &mut SyncStats,
    ) -> chorale_domain::Result<()> {
        let fields = remote_fields(&remote);
        let now = Utc::now();

        match self.events.find_by_provider_id(&remote.id).await? {
            Some(local) => {
                let merged = self.strategy.merge(&local, &fields, now);
                self.events.update(&merged).await?;
                stats.events_updated_locally += 1;
            }
            None => {
                let event = CalendarEvent {
                    id: Uuid::new_v4().to_string(),
                    title: fields.title,
                    description: fields.description,
                    location: fields.location,
                    date: fields.date,
                    time: fields.time,
                    category: fields.category,
                    all_day: fields.all_day,
                    created_by: Some(caller_id.to_string()),
                    provider_event_id: Some(remote.id),
                    synced_at: Some(now),
                    created_at: now,
                };
                self.events.insert(&event).await?;
                stats.events_created_locally += 1;
            }
        }

        Ok(())
    }

    async fn push_local_only(
        &self,
        access_token: &str,
        window: &SyncWindow,
        stats: &mut SyncStats,
    ) -> chorale_domain::Result<()> {
        let candidates = self.events.find_unpushed_since(window.lower_bound_date()).await?;
        debug!(count = candidates.len(), "local-only events eligible for push");

        for chunk in candidates.chunks(self.push_concurrency) {
            let pushes = chunk.iter().map(|event| self.push_one(access_token, event));
            for outcome in futures::future::join_all(pushes).await {
                match outcome {
                    Ok(()) => stats.events_pushed_to_provider += 1,
                    Err(()) => stats.push_failures += 1,
                }
            }
        }

        Ok(())
    }

    /// Push a single event; failures are logged here and reduced to a unit
    /// error so one bad event cannot abort the batch.
    async fn push_one(
        &self,
        access_token: &str,
        event: &CalendarEvent,
    ) -> std::result::Result<(), ()> {
        let draft = draft_for(event);

        let provider_id = match self.provider.create_event(access_token, &draft).await {
            Ok(id) => id,
            Err(e) => {
                warn!(event_id = %event.id, title = %event.title, error = %e, "failed to push event to provider");
                return Err(());
            }
        };

        if let Err(e) =
            self.events.mark_pushed(&event.id, &provider_id, Utc::now()).await
        {
            warn!(event_id = %event.id, error = %e, "pushed event but failed to record provider id");
            return Err(());
        }

        Ok(())
    }
}

/// Classify a remote event and flatten its schedule into local fields
fn remote_fields(remote: &RemoteEvent) -> RemoteEventFields {
    let title = remote.summary.clone().unwrap_or_default();
    let category = classify_event(&title, remote.description.as_deref().unwrap_or(""));

    let (date, time, all_day) = match &remote.when {
        RemoteWhen::AllDay { start, .. } => (*start, None, true),
        RemoteWhen::Timed { start, .. } => (start.date_naive(), Some(start.time()), false),
    };

    RemoteEventFields {
        title,
        description: remote.description.clone(),
        location: remote.location.clone(),
        date,
        time,
        all_day,
        category,
    }
}

/// Shape a local event for creation on the provider
fn draft_for(event: &CalendarEvent) -> RemoteEventDraft {
    let when = match event.time {
        Some(time) if !event.all_day => {
            let start = event.date.and_time(time);
            DraftWhen::Timed { start, end: start + Duration::hours(1) }
        }
        _ => DraftWhen::AllDay { start: event.date, end: event.date + Duration::days(1) },
    };

    RemoteEventDraft {
        summary: event.title.clone(),
        description: event.description.clone(),
        location: event.location.clone(),
        when,
    }
}
