//! Application configuration structures
//!
//! Provider endpoints and credentials are injected through these structs at
//! construction time; business logic never reads the environment directly.

use serde::{Deserialize, Serialize};

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub google: GoogleConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

/// Database settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    pub path: String,
    /// Connection pool size
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: "chorale.db".to_string(), pool_size: 8 }
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the HTTP listener
    pub bind_addr: String,
    /// Override token that authenticates as the super-admin member
    #[serde(default)]
    pub super_admin_token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_addr: "127.0.0.1:8787".to_string(), super_admin_token: None }
    }
}

/// Google Calendar provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Calendar API base, overridable for tests
    pub api_base_url: String,
    /// OAuth token endpoint, overridable for tests
    pub token_url: String,
    /// Calendar to sync against
    pub calendar_id: String,
    /// IANA timezone attached to timed events pushed to the provider
    pub timezone: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            api_base_url: "https://www.googleapis.com/calendar/v3".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            calendar_id: "primary".to_string(),
            timezone: "UTC".to_string(),
        }
    }
}

/// Calendar sync settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Days in the past included in the read window
    pub lookback_days: i64,
    /// Days in the future included in the read window
    pub lookahead_days: i64,
    /// Maximum events fetched per sync (single page)
    pub max_results: u32,
    /// Concurrency limit for the local-to-remote push queue
    pub push_concurrency: usize,
    /// Refresh the access token this many seconds before expiry
    pub refresh_threshold_seconds: i64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            lookback_days: 30,
            lookahead_days: 180,
            max_results: 2500,
            push_concurrency: 1,
            refresh_threshold_seconds: 0,
        }
    }
}
