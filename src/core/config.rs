//! Configuration management for vsxreg.
//!
//! Handles loading and saving configuration from TOML files.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Default registry base URL.
pub const DEFAULT_REGISTRY_URL: &str = "https://open-vsx.org";

/// Environment variable that overrides the configured registry URL.
pub const REGISTRY_URL_ENV: &str = "VSX_REGISTRY_URL";

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Registry settings
    pub registry: RegistryConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Registry connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Base URL of the registry; the API lives under `<url>/api`
    pub url: String,

    /// Custom User-Agent header (defaults to `vsxreg/<version>`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `--verbose` is not given
    pub filter: String,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Looks for config in:
    /// 1. `.vsxreg.toml` in current directory
    /// 2. `~/.config/vsxreg/config.toml`
    /// 3. Falls back to defaults
    ///
    /// `VSX_REGISTRY_URL` is applied on top of whichever source was used.
    pub fn load() -> anyhow::Result<Self> {
        let mut config = Self::load_without_env()?;
        config.apply_env();
        Ok(config)
    }

    fn load_without_env() -> anyhow::Result<Self> {
        // Try local config first
        let local_config = PathBuf::from(".vsxreg.toml");
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        // Try global config
        if let Some(config_dir) = Self::config_dir() {
            let global_config = config_dir.join("config.toml");
            if global_config.exists() {
                return Self::load_from_file(&global_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Override settings from the environment.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(REGISTRY_URL_ENV) {
            let url = url.trim();
            if !url.is_empty() {
                tracing::debug!(url = url, "Registry URL overridden from environment");
                self.registry.url = url.to_string();
            }
        }
    }

    /// Save configuration to the global config file.
    pub fn save(&self) -> anyhow::Result<()> {
        let config_dir = Self::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        self.save_to_file(&config_dir.join("config.toml"))
    }

    /// Save configuration to a specific file, creating parent directories.
    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the config directory path.
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("vsxreg"))
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self { url: DEFAULT_REGISTRY_URL.to_string(), user_agent: None }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: "warn".to_string() }
    }
}
