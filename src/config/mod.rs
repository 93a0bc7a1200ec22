//! Service configuration
//!
//! Loaded from TOML with environment overrides for secrets and models.
//!
//! ## Loading Order
//!
//! 1. Explicit path (`--config`)
//! 2. `SEARCHSPELL_CONFIG` environment variable (path to TOML file)
//! 3. `searchspell.toml` in the current working directory
//! 4. Built-in defaults
//!
//! Environment overrides (`DATABASE_URL`, `GOOGLE_API_KEY`, `GEMINI_MODEL`,
//! `GEMINI_EMBED_MODEL`, `LISTEN_ADDR`) are applied on top of whichever
//! source won. The resulting `AppConfig` is passed explicitly to the store,
//! the Gemini client and the pipeline; nothing reads it globally.

pub mod validation;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Env var naming the config file
pub const CONFIG_ENV_VAR: &str = "SEARCHSPELL_CONFIG";
/// Config file looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "searchspell.toml";

// ============================================================================
// Sections
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address; `:8080` binds all interfaces
    pub listen_addr: String,
    /// Maximum accepted request body in bytes
    pub max_body_bytes: usize,
    /// Allowed cross-origin callers; empty means same-origin only
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            max_body_bytes: 64 * 1024,
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// `:8080` (Go-style) becomes `0.0.0.0:8080`.
    pub fn bind_address(&self) -> String {
        if self.listen_addr.starts_with(':') {
            format!("0.0.0.0{}", self.listen_addr)
        } else {
            self.listen_addr.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL (usually from `DATABASE_URL`)
    pub url: String,
    /// Table holding the embedded records
    pub table: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub max_lifetime_secs: u64,
    pub idle_timeout_secs: u64,
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            table: "spells".to_string(),
            max_connections: 10,
            min_connections: 0,
            max_lifetime_secs: 30 * 60,
            idle_timeout_secs: 10 * 60,
            acquire_timeout_secs: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// Usually from `GOOGLE_API_KEY`
    pub api_key: String,
    pub base_url: String,
    pub generation_model: String,
    pub embedding_model: String,
    pub connect_timeout_ms: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            generation_model: "gemini-2.5-flash".to_string(),
            embedding_model: "text-embedding-004".to_string(),
            connect_timeout_ms: 5_000,
        }
    }
}

/// Per-stage budgets. Stage budgets are capped by the request budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub request_ms: u64,
    pub embed_ms: u64,
    pub search_ms: u64,
    pub generate_ms: u64,
    pub health_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_ms: 60_000,
            embed_ms: 20_000,
            search_ms: 15_000,
            generate_ms: 30_000,
            health_ms: 2_000,
        }
    }
}

impl TimeoutConfig {
    pub fn request(&self) -> Duration {
        Duration::from_millis(self.request_ms)
    }

    pub fn embed(&self) -> Duration {
        Duration::from_millis(self.embed_ms)
    }

    pub fn search(&self) -> Duration {
        Duration::from_millis(self.search_ms)
    }

    pub fn generate(&self) -> Duration {
        Duration::from_millis(self.generate_ms)
    }

    pub fn health(&self) -> Duration {
        Duration::from_millis(self.health_ms)
    }
}

// ============================================================================
// AppConfig
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub gemini: GeminiConfig,
    pub timeouts: TimeoutConfig,
}

impl AppConfig {
    /// Load using the standard search order, then apply process env overrides.
    ///
    /// An explicit path must load; implicit sources fall back with a warning.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => {
                let config = Self::load_from_file(path)?;
                info!(path = %path.display(), "Loaded config from --config");
                config
            }
            None => Self::load_implicit(),
        };
        config.apply_env_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    fn load_implicit() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded config from {CONFIG_ENV_VAR}");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {CONFIG_ENV_VAR}, falling back");
                    }
                }
            } else {
                warn!(path = %path, "{CONFIG_ENV_VAR} points to non-existent file, falling back");
            }
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded config from ./{LOCAL_CONFIG_FILE}");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{LOCAL_CONFIG_FILE}, using defaults");
                }
            }
        }

        info!("No config file found, using built-in defaults");
        Self::default()
    }

    /// Load and validate a specific TOML file. Unknown keys only warn.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Toml(source) => ConfigError::Parse(path.to_path_buf(), source),
            other => other,
        })
    }

    /// Parse and validate TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }
        let config: Self = toml::from_str(contents).map_err(ConfigError::Toml)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an env-like lookup. Empty values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("DATABASE_URL") {
            self.database.url = v;
        }
        if let Some(v) = get("GOOGLE_API_KEY") {
            self.gemini.api_key = v;
        }
        if let Some(v) = get("GEMINI_MODEL") {
            self.gemini.generation_model = v;
        }
        if let Some(v) = get("GEMINI_EMBED_MODEL") {
            self.gemini.embedding_model = v;
        }
        if let Some(v) = get("LISTEN_ADDR") {
            self.server.listen_addr = v;
        }
    }

    /// Structural checks. Credentials are checked separately.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (errors, warnings) = validation::validate_ranges(self);
        for w in &warnings {
            warn!("{}", w);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Both external credentials must be present to serve requests.
    pub fn require_credentials(&self) -> Result<(), ConfigError> {
        let mut missing = Vec::new();
        if self.database.url.trim().is_empty() {
            missing.push("DATABASE_URL".to_string());
        }
        if self.gemini.api_key.trim().is_empty() {
            missing.push("GOOGLE_API_KEY".to_string());
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::MissingCredentials(missing))
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {}", .0.display(), .1)]
    Io(PathBuf, std::io::Error),
    #[error("Config parse error ({}): {}", .0.display(), .1)]
    Parse(PathBuf, toml::de::Error),
    #[error("Config parse error: {0}")]
    Toml(toml::de::Error),
    #[error("Config validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
    #[error("Missing required settings: {}", .0.join(", "))]
    MissingCredentials(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml_str("[timeouts]\nembed_ms = 1500\n").unwrap();
        assert_eq!(config.timeouts.embed_ms, 1500);
        assert_eq!(config.timeouts.search_ms, 15_000);
        assert_eq!(config.database.table, "spells");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("DATABASE_URL", "postgres://db/spells"),
            ("GOOGLE_API_KEY", "k-123"),
            ("GEMINI_MODEL", "gemini-x"),
            ("LISTEN_ADDR", ":9090"),
            ("GEMINI_EMBED_MODEL", "  "),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_env_overrides(|k| env.get(k).map(|v| (*v).to_string()));

        assert_eq!(config.database.url, "postgres://db/spells");
        assert_eq!(config.gemini.api_key, "k-123");
        assert_eq!(config.gemini.generation_model, "gemini-x");
        assert_eq!(config.gemini.embedding_model, "text-embedding-004");
        assert_eq!(config.server.bind_address(), "0.0.0.0:9090");
    }

    #[test]
    fn test_require_credentials_lists_missing() {
        let err = AppConfig::default().require_credentials().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("DATABASE_URL"));
        assert!(msg.contains("GOOGLE_API_KEY"));
    }

    #[test]
    fn test_invalid_table_rejected() {
        let err = AppConfig::from_toml_str("[database]\ntable = \"spells;--\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }
}
