//! Application configuration management.

use std::path::PathBuf;

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Remote store behaviour.
    #[serde(default)]
    pub remote: RemoteConfig,
    /// Local cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Business calendar configuration.
    #[serde(default)]
    pub business: BusinessConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Connect timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout() -> u64 {
    5
}

/// Remote store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    /// Upper bound for a single remote call, in milliseconds.
    #[serde(default = "default_remote_timeout")]
    pub timeout_ms: u64,
    /// Create through the `insert_financial_transaction` procedure.
    #[serde(default = "default_use_insert_procedure")]
    pub use_insert_procedure: bool,
}

fn default_remote_timeout() -> u64 {
    5_000
}

fn default_use_insert_procedure() -> bool {
    true
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_remote_timeout(),
            use_insert_procedure: default_use_insert_procedure(),
        }
    }
}

/// Local cache configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Directory holding the cache snapshot.
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,
    /// Storage key of the snapshot (file stem).
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(".vitrine")
}

fn default_storage_key() -> String {
    "financial_transactions".to_string()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
            storage_key: default_storage_key(),
        }
    }
}

/// Business calendar configuration.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct BusinessConfig {
    /// Fixed business timezone offset in minutes east of UTC.
    #[serde(default = "default_utc_offset_minutes")]
    pub utc_offset_minutes: i32,
}

fn default_utc_offset_minutes() -> i32 {
    -180 // Brasília time, no DST
}

impl Default for BusinessConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: default_utc_offset_minutes(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("VITRINE").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    /// Parses configuration from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or misses required keys.
    pub fn from_toml(document: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(document, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied() {
        let config = AppConfig::from_toml(
            r#"
            [database]
            url = "postgres://localhost/vitrine"
            "#,
        )
        .unwrap();

        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.database.min_connections, 1);
        assert_eq!(config.remote.timeout_ms, 5_000);
        assert!(config.remote.use_insert_procedure);
        assert_eq!(config.cache.storage_key, "financial_transactions");
        assert_eq!(config.cache.dir, PathBuf::from(".vitrine"));
        assert_eq!(config.business.utc_offset_minutes, -180);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_toml(
            r#"
            [database]
            url = "postgres://db/vitrine"
            max_connections = 4

            [remote]
            timeout_ms = 250
            use_insert_procedure = false

            [cache]
            dir = "/var/lib/vitrine"

            [business]
            utc_offset_minutes = 60
            "#,
        )
        .unwrap();

        assert_eq!(config.database.max_connections, 4);
        assert_eq!(config.remote.timeout_ms, 250);
        assert!(!config.remote.use_insert_procedure);
        assert_eq!(config.cache.dir, PathBuf::from("/var/lib/vitrine"));
        assert_eq!(config.business.utc_offset_minutes, 60);
    }

    #[test]
    fn test_missing_database_rejected() {
        assert!(AppConfig::from_toml("[remote]\ntimeout_ms = 10\n").is_err());
    }
}
