//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `CHORALE_DB_PATH`: Database file path (required)
//! - `CHORALE_DB_POOL_SIZE`: Connection pool size
//! - `CHORALE_BIND_ADDR`: HTTP listen address
//! - `CHORALE_SUPER_ADMIN_TOKEN`: Override token for the super admin
//! - `CHORALE_GOOGLE_CLIENT_ID`: OAuth client id (required)
//! - `CHORALE_GOOGLE_CLIENT_SECRET`: OAuth client secret (required)
//! - `CHORALE_GOOGLE_API_BASE_URL`: Calendar API base
//! - `CHORALE_GOOGLE_TOKEN_URL`: OAuth token endpoint
//! - `CHORALE_GOOGLE_CALENDAR_ID`: Calendar to sync against
//! - `CHORALE_GOOGLE_TIMEZONE`: Timezone attached to pushed timed events
//! - `CHORALE_SYNC_LOOKBACK_DAYS` / `CHORALE_SYNC_LOOKAHEAD_DAYS`: Read window
//! - `CHORALE_SYNC_MAX_RESULTS`: Single-page event cap
//! - `CHORALE_SYNC_PUSH_CONCURRENCY`: Push queue width
//! - `CHORALE_SYNC_REFRESH_THRESHOLD`: Seconds before expiry to refresh
//!
//! ## File Locations
//! The loader probes `config.{json,toml}` and `chorale.{json,toml}` in the
//! current directory, up to two parent directories, and next to the
//! executable.

use std::path::{Path, PathBuf};

use chorale_domain::{
    ChoraleError, Config, DatabaseConfig, GoogleConfig, Result, ServerConfig, SyncConfig,
};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `ChoraleError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// The database path and Google OAuth client credentials are required;
/// everything else falls back to the defaults in [`Config`].
///
/// # Errors
/// Returns `ChoraleError::Config` if required variables are missing or have
/// invalid values.
pub fn load_from_env() -> Result<Config> {
    let defaults = Config::default();

    let db_path = env_var("CHORALE_DB_PATH")?;
    let db_pool_size = env_parse("CHORALE_DB_POOL_SIZE", defaults.database.pool_size)?;

    let bind_addr =
        std::env::var("CHORALE_BIND_ADDR").unwrap_or_else(|_| defaults.server.bind_addr.clone());
    let super_admin_token = std::env::var("CHORALE_SUPER_ADMIN_TOKEN").ok();

    let client_id = env_var("CHORALE_GOOGLE_CLIENT_ID")?;
    let client_secret = env_var("CHORALE_GOOGLE_CLIENT_SECRET")?;
    let api_base_url = std::env::var("CHORALE_GOOGLE_API_BASE_URL")
        .unwrap_or_else(|_| defaults.google.api_base_url.clone());
    let token_url = std::env::var("CHORALE_GOOGLE_TOKEN_URL")
        .unwrap_or_else(|_| defaults.google.token_url.clone());
    let calendar_id = std::env::var("CHORALE_GOOGLE_CALENDAR_ID")
        .unwrap_or_else(|_| defaults.google.calendar_id.clone());
    let timezone = std::env::var("CHORALE_GOOGLE_TIMEZONE")
        .unwrap_or_else(|_| defaults.google.timezone.clone());

    let lookback_days = env_parse("CHORALE_SYNC_LOOKBACK_DAYS", defaults.sync.lookback_days)?;
    let lookahead_days = env_parse("CHORALE_SYNC_LOOKAHEAD_DAYS", defaults.sync.lookahead_days)?;
    let max_results = env_parse("CHORALE_SYNC_MAX_RESULTS", defaults.sync.max_results)?;
    let push_concurrency =
        env_parse("CHORALE_SYNC_PUSH_CONCURRENCY", defaults.sync.push_concurrency)?;
    let refresh_threshold_seconds =
        env_parse("CHORALE_SYNC_REFRESH_THRESHOLD", defaults.sync.refresh_threshold_seconds)?;

    Ok(Config {
        database: DatabaseConfig { path: db_path, pool_size: db_pool_size },
        server: ServerConfig { bind_addr, super_admin_token },
        google: GoogleConfig {
            client_id,
            client_secret,
            api_base_url,
            token_url,
            calendar_id,
            timezone,
        },
        sync: SyncConfig {
            lookback_days,
            lookahead_days,
            max_results,
            push_concurrency,
            refresh_threshold_seconds,
        },
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `ChoraleError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ChoraleError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            ChoraleError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ChoraleError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| ChoraleError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ChoraleError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(ChoraleError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches the current working directory, up to two parent directories, and
/// the executable's directory, in that order.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(vec![
            cwd.join("config.json"),
            cwd.join("config.toml"),
            cwd.join("chorale.json"),
            cwd.join("chorale.toml"),
            cwd.join("../config.json"),
            cwd.join("../config.toml"),
            cwd.join("../../config.json"),
            cwd.join("../../config.toml"),
        ]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(vec![
                exe_dir.join("config.json"),
                exe_dir.join("config.toml"),
                exe_dir.join("chorale.json"),
                exe_dir.join("chorale.toml"),
            ]);
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| ChoraleError::Config(format!("Missing required environment variable: {}", key)))
}

/// Parse an optional numeric environment variable, falling back to `default`
fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| ChoraleError::Config(format!("Invalid value for {}: {}", key, e))),
        Err(_) => Ok(default),
    }
}
