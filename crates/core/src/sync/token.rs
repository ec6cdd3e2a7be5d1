//! Access token freshness

use std::sync::Arc;

use chorale_domain::{ChoraleError, OAuthTokenRecord, Result};
use chrono::{DateTime, Duration, Utc};
use tracing::{info, instrument};

use super::ports::{CalendarProvider, TokenRepository};

/// Returns a usable access token, refreshing and persisting it when the
/// stored one has expired.
pub struct TokenRefresher {
    provider: Arc<dyn CalendarProvider>,
    tokens: Arc<dyn TokenRepository>,
    threshold_seconds: i64,
}

impl TokenRefresher {
    pub fn new(
        provider: Arc<dyn CalendarProvider>,
        tokens: Arc<dyn TokenRepository>,
        threshold_seconds: i64,
    ) -> Self {
        Self { provider, tokens, threshold_seconds }
    }

    /// Hand back the stored access token if still valid, otherwise exchange
    /// the refresh token and persist the result.
    ///
    /// A missing or rejected refresh token surfaces as a configuration error
    /// asking the member to reconnect their calendar.
    #[instrument(skip(self, record), fields(member_id = %record.member_id))]
    pub async fn ensure_fresh(
        &self,
        record: &OAuthTokenRecord,
        now: DateTime<Utc>,
    ) -> Result<String> {
        if !record.is_expired_at(now, self.threshold_seconds) {
            return Ok(record.access_token.clone());
        }

        let refresh_token = record.refresh_token.as_deref().ok_or_else(|| {
            ChoraleError::Config(
                "Calendar access expired and no refresh token is stored; please reconnect"
                    .to_string(),
            )
        })?;

        let refreshed =
            self.provider.refresh_access_token(refresh_token).await.map_err(|e| {
                ChoraleError::Config(format!("Failed to refresh calendar access: {e}"))
            })?;

        let expires_at = now + Duration::seconds(refreshed.expires_in);
        self.tokens
            .update_access_token(&record.member_id, &refreshed.access_token, expires_at)
            .await?;

        info!(member_id = %record.member_id, "refreshed calendar access token");
        Ok(refreshed.access_token)
    }
}
