//! OAuth token record types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored OAuth grant for one member's provider connection
///
/// Some grants omit the refresh token; such a connection cannot outlive its
/// access token and must be re-established by the member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthTokenRecord {
    pub member_id: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl OAuthTokenRecord {
    /// Whether the access token is stale at `now`, with an optional margin
    pub fn is_expired_at(&self, now: DateTime<Utc>, threshold_seconds: i64) -> bool {
        now + chrono::Duration::seconds(threshold_seconds) >= self.expires_at
    }
}
