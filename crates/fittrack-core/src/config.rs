//! Configuration resolution for `FitTrack`.
//!
//! Implements hierarchical config resolution:
//! 1. Built-in defaults
//! 2. Global config (`settings.json` in the platform config directory)
//! 3. Environment variables
//! 4. CLI arguments (highest priority, applied by the binary)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Scope tag carried by tokens issued at login.
pub const SCOPE_AUTHENTICATION: &str = "authentication";

/// Complete `FitTrack` configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DatabaseConfig {
    /// Path to the `SQLite` file. `None` means [`database_path`].
    pub path: Option<PathBuf>,
}

/// Token issuance configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Lifetime of tokens issued at login (seconds).
    pub token_ttl_secs: u64,
    /// Scope tag for login tokens.
    pub token_scope: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_ttl_secs: 24 * 60 * 60, // 24 hours
            token_scope: SCOPE_AUTHENTICATION.to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default `RUST_LOG` filter.
    pub filter: String,
    /// Emit JSON log lines.
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "fittrack=info,fittrack_store=info".to_string(),
            json: false,
        }
    }
}

/// Load configuration with hierarchical resolution.
pub fn load_config() -> Result<Config> {
    let mut config = Config::default();

    if let Some(global_path) = global_config_path() {
        if global_path.exists() {
            config = load_config_file(&global_path)?;
        }
    }

    apply_env_overrides(&mut config);

    Ok(config)
}

/// Platform config directory (`$XDG_CONFIG_HOME/fittrack` on Linux).
fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("fittrack"))
}

/// Get the global config file path.
pub fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("settings.json"))
}

/// Get the default database path.
pub fn database_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("fittrack.db"))
}

/// Read a single JSON config file. Missing sections fall back to defaults.
pub fn load_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| Error::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(val) = std::env::var("FITTRACK_DB_PATH") {
        config.database.path = Some(PathBuf::from(val));
    }
    if let Ok(val) = std::env::var("FITTRACK_TOKEN_TTL_SECS") {
        if let Ok(n) = val.parse() {
            config.auth.token_ttl_secs = n;
        }
    }
    if let Ok(val) = std::env::var("FITTRACK_LOG") {
        config.log.filter = val;
    }
    if let Ok(val) = std::env::var("FITTRACK_LOG_JSON") {
        config.log.json = matches!(val.as_str(), "1" | "true" | "yes");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_token_ttl_is_one_day() {
        let config = Config::default();
        assert_eq!(config.auth.token_ttl_secs, 86_400);
        assert_eq!(config.auth.token_scope, SCOPE_AUTHENTICATION);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"database": {"path": "/tmp/ft.db"}}"#).unwrap();

        let config = load_config_file(&path).unwrap();
        assert_eq!(config.database.path, Some(PathBuf::from("/tmp/ft.db")));
        assert_eq!(config.auth.token_ttl_secs, 86_400);
        assert!(!config.log.json);
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = load_config_file(&path).unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
        assert!(err.to_string().contains("settings.json"));
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = load_config_file(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, Error::ConfigRead { .. }));
    }
}
