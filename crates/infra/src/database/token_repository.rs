//! SQLite-backed implementation of the TokenRepository port.

use std::sync::Arc;

use async_trait::async_trait;
use chorale_domain::{ChoraleError, OAuthTokenRecord, Result};
use chorale_core::TokenRepository;
use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, ToSql};
use tracing::instrument;

use super::manager::{map_sql_error, DbManager};

/// SQLite implementation of TokenRepository
pub struct SqliteTokenRepository {
    db: Arc<DbManager>,
}

impl SqliteTokenRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Store or replace a member's OAuth grant.
    ///
    /// Used by the account connection flow and by test fixtures.
    pub fn upsert(&self, record: &OAuthTokenRecord) -> Result<()> {
        let conn = self.db.get_connection()?;
        let now = Utc::now().timestamp();
        let expires_at = record.expires_at.timestamp();

        conn.execute(
            "INSERT INTO oauth_tokens (member_id, access_token, refresh_token, expires_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(member_id) DO UPDATE SET
                access_token = excluded.access_token,
                refresh_token = excluded.refresh_token,
                expires_at = excluded.expires_at,
                updated_at = excluded.updated_at",
            [
                &record.member_id as &dyn ToSql,
                &record.access_token,
                &record.refresh_token,
                &expires_at,
                &now,
            ]
            .as_ref(),
        )
        .map_err(map_sql_error)?;
        Ok(())
    }
}

#[async_trait]
impl TokenRepository for SqliteTokenRepository {
    #[instrument(skip(self))]
    async fn find_for_member(&self, member_id: &str) -> Result<Option<OAuthTokenRecord>> {
        let conn = self.db.get_connection()?;

        conn.query_row(
            "SELECT member_id, access_token, refresh_token, expires_at
             FROM oauth_tokens WHERE member_id = ?1",
            [member_id],
            |row| {
                let expires_at: i64 = row.get(3)?;
                Ok(OAuthTokenRecord {
                    member_id: row.get(0)?,
                    access_token: row.get(1)?,
                    refresh_token: row.get(2)?,
                    expires_at: DateTime::from_timestamp(expires_at, 0).unwrap_or_default(),
                })
            },
        )
        .optional()
        .map_err(map_sql_error)
    }

    #[instrument(skip(self, access_token))]
    async fn update_access_token(
        &self,
        member_id: &str,
        access_token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        let conn = self.db.get_connection()?;
        let now = Utc::now().timestamp();

        let changed = conn
            .execute(
                "UPDATE oauth_tokens
                 SET access_token = ?2, expires_at = ?3, updated_at = ?4
                 WHERE member_id = ?1",
                [&member_id as &dyn ToSql, &access_token, &expires_at.timestamp(), &now].as_ref(),
            )
            .map_err(map_sql_error)?;

        if changed == 0 {
            return Err(ChoraleError::NotFound(format!("oauth token for member {member_id}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use tempfile::TempDir;

    use super::*;

    fn repo() -> (TempDir, SqliteTokenRepository) {
        let temp_dir = TempDir::new().expect("temp dir created");
        let db = Arc::new(DbManager::new(temp_dir.path().join("test.db"), 2).unwrap());
        db.run_migrations().unwrap();
        (temp_dir, SqliteTokenRepository::new(db))
    }

    fn record(member_id: &str) -> OAuthTokenRecord {
        OAuthTokenRecord {
            member_id: member_id.to_string(),
            access_token: "access".to_string(),
            refresh_token: Some("refresh".to_string()),
            expires_at: Utc::now() + Duration::hours(1),
        }
    }

    #[tokio::test]
    async fn upsert_and_find() {
        let (_dir, repo) = repo();
        let stored = record("member-1");
        repo.upsert(&stored).unwrap();

        let found = repo.find_for_member("member-1").await.unwrap().expect("token found");
        assert_eq!(found.access_token, "access");
        assert_eq!(found.refresh_token.as_deref(), Some("refresh"));
        assert_eq!(found.expires_at.timestamp(), stored.expires_at.timestamp());

        assert!(repo.find_for_member("member-2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_access_token_preserves_refresh_token() {
        let (_dir, repo) = repo();
        repo.upsert(&record("member-1")).unwrap();

        let new_expiry = Utc::now() + Duration::hours(2);
        repo.update_access_token("member-1", "fresh", new_expiry).await.unwrap();

        let found = repo.find_for_member("member-1").await.unwrap().unwrap();
        assert_eq!(found.access_token, "fresh");
        assert_eq!(found.refresh_token.as_deref(), Some("refresh"));
        assert_eq!(found.expires_at.timestamp(), new_expiry.timestamp());
    }

    #[tokio::test]
    async fn update_for_unknown_member_is_not_found() {
        let (_dir, repo) = repo();
        let err =
            repo.update_access_token("missing", "tok", Utc::now()).await.unwrap_err();
        assert!(matches!(err, ChoraleError::NotFound(_)));
    }
}
