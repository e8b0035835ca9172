//! Configuration loading, validation, and management for Notewise.
//!
//! Loads configuration from `~/.notewise/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Budget used when neither config nor caller supplies one.
pub const DEFAULT_TOKEN_BUDGET: usize = 2000;

/// The root configuration structure.
///
/// Maps directly to `~/.notewise/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Skill injection settings
    #[serde(default)]
    pub skills: SkillsConfig,

    /// Skill store settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillsConfig {
    /// When false, callers skip skill matching entirely.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Ceiling on estimated tokens injected per prompt.
    #[serde(default = "default_token_budget")]
    pub token_budget: usize,
}

fn default_true() -> bool {
    true
}
fn default_token_budget() -> usize {
    DEFAULT_TOKEN_BUDGET
}

impl Default for SkillsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            token_budget: default_token_budget(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// `sqlite`, `file`, or `memory`
    #[serde(default = "default_store_backend")]
    pub backend: String,

    /// Database or snapshot path; a per-backend default under the config dir
    /// is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

fn default_store_backend() -> String {
    "sqlite".into()
}

const STORE_BACKENDS: &[&str] = &["sqlite", "file", "memory"];

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            path: None,
        }
    }
}

impl StoreConfig {
    /// The effective store location for the configured backend.
    pub fn resolved_path(&self) -> PathBuf {
        match &self.path {
            Some(p) => PathBuf::from(p),
            None if self.backend == "file" => AppConfig::config_dir().join("skills.json"),
            None => AppConfig::config_dir().join("notewise.sqlite"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path, then apply env overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply `NOTEWISE_*` overrides read through `lookup`.
    fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("NOTEWISE_SKILLS_ENABLED") {
            self.skills.enabled = parse_flag(&raw).ok_or_else(|| {
                ConfigError::ValidationError(format!(
                    "NOTEWISE_SKILLS_ENABLED must be a boolean, got '{raw}'"
                ))
            })?;
        }

        if let Some(raw) = lookup("NOTEWISE_SKILL_TOKEN_BUDGET") {
            self.skills.token_budget = raw.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "NOTEWISE_SKILL_TOKEN_BUDGET must be a positive integer, got '{raw}'"
                ))
            })?;
        }

        if let Some(backend) = lookup("NOTEWISE_STORE_BACKEND") {
            self.store.backend = backend.trim().to_ascii_lowercase();
        }

        if let Some(path) = lookup("NOTEWISE_STORE_PATH") {
            self.store.path = Some(path);
        }

        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".notewise")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.skills.token_budget == 0 {
            return Err(ConfigError::ValidationError(
                "skills.token_budget must be > 0".into(),
            ));
        }

        if !STORE_BACKENDS.contains(&self.store.backend.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "store.backend must be one of {}, got '{}'",
                STORE_BACKENDS.join(", "),
                self.store.backend
            )));
        }

        Ok(())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.skills.enabled);
        assert_eq!(config.skills.token_budget, 2000);
        assert_eq!(config.store.backend, "sqlite");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.skills.token_budget, config.skills.token_budget);
        assert_eq!(parsed.store.backend, config.store.backend);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: AppConfig = toml::from_str("[skills]\ntoken_budget = 700\n").unwrap();
        assert_eq!(parsed.skills.token_budget, 700);
        assert!(parsed.skills.enabled);
        assert_eq!(parsed.logging.level, "info");
    }

    #[test]
    fn zero_budget_rejected() {
        let mut config = AppConfig::default();
        config.skills.token_budget = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_backend_rejected() {
        let mut config = AppConfig::default();
        config.store.backend = "postgres".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_ok());
        assert_eq!(result.unwrap().skills.token_budget, DEFAULT_TOKEN_BUDGET);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[skills]\nenabled = false\n\n[store]\nbackend = \"file\"\npath = \"/tmp/s.json\"\n",
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert!(!config.skills.enabled);
        assert_eq!(config.store.resolved_path(), PathBuf::from("/tmp/s.json"));
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[skills\ntoken_budget = ").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = AppConfig::default();
        config
            .apply_env_overrides(env(&[
                ("NOTEWISE_SKILLS_ENABLED", "off"),
                ("NOTEWISE_SKILL_TOKEN_BUDGET", "700"),
                ("NOTEWISE_STORE_BACKEND", "Memory"),
            ]))
            .unwrap();
        assert!(!config.skills.enabled);
        assert_eq!(config.skills.token_budget, 700);
        assert_eq!(config.store.backend, "memory");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn bad_env_budget_rejected() {
        let mut config = AppConfig::default();
        let result = config.apply_env_overrides(env(&[("NOTEWISE_SKILL_TOKEN_BUDGET", "lots")]));
        assert!(result.is_err());
    }

    #[test]
    fn default_store_paths_follow_backend() {
        let sqlite = StoreConfig::default();
        assert!(sqlite.resolved_path().ends_with("notewise.sqlite"));

        let file = StoreConfig {
            backend: "file".into(),
            path: None,
        };
        assert!(file.resolved_path().ends_with("skills.json"));
    }

    #[test]
    fn default_toml_generation() {
        let toml = AppConfig::default_toml();
        assert!(toml.contains("token_budget"));
        assert!(toml.contains("backend"));
    }
}
