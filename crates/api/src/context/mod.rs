//! Application context - dependency injection container

use std::sync::Arc;

use chorale_core::{
    EventReconciler, MemberRepository, RemoteWinsStrategy, SyncService, TokenRefresher,
};
use chorale_domain::{Config, Result};
use chorale_infra::{
    DbManager, GoogleCalendarProvider, InProcessSyncLease, SqliteEventRepository,
    SqliteMemberRepository, SqliteTokenRepository,
};

/// Shared application state handed to every request handler.
#[derive(Clone)]
pub struct AppContext {
    pub members: Arc<dyn MemberRepository>,
    pub sync: Arc<SyncService>,
    pub db: Arc<DbManager>,
    /// Override token that authenticates as the super-admin member
    pub super_admin_token: Option<String>,
}

impl AppContext {
    /// Wire up the full adapter stack from configuration.
    ///
    /// Opens the database, runs migrations, and builds the sync service with
    /// the Google provider behind it.
    pub fn new(config: &Config) -> Result<Self> {
        let db = Arc::new(DbManager::new(&config.database.path, config.database.pool_size)?);
        db.run_migrations()?;

        let members = Arc::new(SqliteMemberRepository::new(db.clone()));
        let events = Arc::new(SqliteEventRepository::new(db.clone()));
        let tokens = Arc::new(SqliteTokenRepository::new(db.clone()));
        let provider = Arc::new(GoogleCalendarProvider::new(config.google.clone()));
        let leases = Arc::new(InProcessSyncLease::new());

        let refresher = TokenRefresher::new(
            provider.clone(),
            tokens.clone(),
            config.sync.refresh_threshold_seconds,
        );
        let reconciler = EventReconciler::new(
            events,
            provider.clone(),
            Arc::new(RemoteWinsStrategy),
            config.sync.push_concurrency,
        );
        let sync = Arc::new(SyncService::new(
            provider,
            tokens,
            leases,
            refresher,
            reconciler,
            config.sync.clone(),
        ));

        Ok(Self {
            members,
            sync,
            db,
            super_admin_token: config.server.super_admin_token.clone(),
        })
    }
}
