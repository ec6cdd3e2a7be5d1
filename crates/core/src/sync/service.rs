//! Sync orchestration

use std::sync::Arc;

use chorale_domain::{ChoraleError, Member, Result, SyncConfig, SyncStats};
use chrono::Utc;
use tracing::{info, instrument};

use super::ports::{CalendarProvider, SyncLeaseManager, SyncWindow, TokenRepository};
use super::reconciler::EventReconciler;
use super::token::TokenRefresher;

/// Runs a full two-way sync on behalf of an admin member
pub struct SyncService {
    provider: Arc<dyn CalendarProvider>,
    tokens: Arc<dyn TokenRepository>,
    leases: Arc<dyn SyncLeaseManager>,
    refresher: TokenRefresher,
    reconciler: EventReconciler,
    config: SyncConfig,
}

impl SyncService {
    pub fn new(
        provider: Arc<dyn CalendarProvider>,
        tokens: Arc<dyn TokenRepository>,
        leases: Arc<dyn SyncLeaseManager>,
        refresher: TokenRefresher,
        reconciler: EventReconciler,
        config: SyncConfig,
    ) -> Self {
        Self { provider, tokens, leases, refresher, reconciler, config }
    }

    /// Pull the provider window into local storage, then push local-only
    /// events out. Admin-only; one sync per member at a time.
    #[instrument(skip(self, caller), fields(member_id = %caller.id))]
    pub async fn full_sync(&self, caller: &Member) -> Result<SyncStats> {
        if !caller.is_admin() {
            return Err(ChoraleError::Forbidden(
                "Only admins can trigger a calendar sync".to_string(),
            ));
        }

        // Held until this function returns, covering both phases
        let _lease = self.leases.acquire(&caller.id)?;

        let record = self.tokens.find_for_member(&caller.id).await?.ok_or_else(|| {
            ChoraleError::Config(
                "No calendar connection found; please connect your Google account".to_string(),
            )
        })?;

        let now = Utc::now();
        let access_token = self.refresher.ensure_fresh(&record, now).await?;

        let window = SyncWindow::around(now, &self.config);
        let remote_events = self.provider.list_events(&access_token, &window).await?;
        if remote_events.len() >= window.max_results as usize {
            tracing::warn!(
                max_results = window.max_results,
                "provider returned a full page; events beyond the cap were not fetched"
            );
        }

        let stats =
            self.reconciler.reconcile(&caller.id, &access_token, remote_events, &window).await?;

        info!(
            fetched = stats.events_fetched,
            created = stats.events_created_locally,
            updated = stats.events_updated_locally,
            pushed = stats.events_pushed_to_provider,
            push_failures = stats.push_failures,
            "calendar sync complete"
        );

        Ok(stats)
    }
}
