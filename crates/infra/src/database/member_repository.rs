//! SQLite-backed implementation of the MemberRepository port.

use std::sync::Arc;

use async_trait::async_trait;
use chorale_domain::{Member, MemberRole, Result};
use chorale_core::MemberRepository;
use chrono::Utc;
use rusqlite::{OptionalExtension, Row, ToSql};
use tracing::instrument;

use super::manager::{map_sql_error, DbManager};

/// SQLite implementation of MemberRepository
pub struct SqliteMemberRepository {
    db: Arc<DbManager>,
}

impl SqliteMemberRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Insert a member with an optional API token.
    ///
    /// Used by the roster import flow and by test fixtures.
    pub fn insert(&self, member: &Member, api_token: Option<&str>) -> Result<()> {
        let conn = self.db.get_connection()?;
        let now = Utc::now().timestamp();

        conn.execute(
            "INSERT INTO members (id, email, name, role, api_token, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            [
                &member.id as &dyn ToSql,
                &member.email,
                &member.name,
                &member.role.as_str(),
                &api_token,
                &now,
            ]
            .as_ref(),
        )
        .map_err(map_sql_error)?;
        Ok(())
    }
}

#[async_trait]
impl MemberRepository for SqliteMemberRepository {
    #[instrument(skip(self, api_token))]
    async fn find_by_api_token(&self, api_token: &str) -> Result<Option<Member>> {
        let conn = self.db.get_connection()?;

        conn.query_row(
            "SELECT id, email, name, role FROM members WHERE api_token = ?1",
            [api_token],
            row_to_member,
        )
        .optional()
        .map_err(map_sql_error)
    }

    #[instrument(skip(self))]
    async fn find_super_admin(&self) -> Result<Option<Member>> {
        let conn = self.db.get_connection()?;

        conn.query_row(
            "SELECT id, email, name, role FROM members
             WHERE role = 'super-admin' ORDER BY created_at LIMIT 1",
            [],
            row_to_member,
        )
        .optional()
        .map_err(map_sql_error)
    }
}

fn row_to_member(row: &Row<'_>) -> rusqlite::Result<Member> {
    let role_raw: String = row.get(3)?;
    Ok(Member {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        role: MemberRole::parse(&role_raw),
    })
}
