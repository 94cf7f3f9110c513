//! Configuration management for the application.
//!
//! This module handles loading, validating, and saving application configuration
//! in TOML format with platform-specific directory resolution.

use crate::constants::{CONFIG_DIR_NAME, DEFAULT_FILENAME};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that overrides the config directory.
pub const CONFIG_DIR_ENV: &str = "VORONCONF_CONFIG_DIR";

/// Longest reference fetch timeout accepted.
const MAX_TIMEOUT_SECS: u64 = 60;

/// Web server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,
    /// TCP port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Reference config fetching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceConfig {
    /// Upper bound on one remote fetch, in seconds
    pub timeout_secs: u64,
    /// Base URL serving the same paths as raw.githubusercontent.com
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mirror: Option<String>,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            mirror: None,
        }
    }
}

impl ReferenceConfig {
    /// The fetch timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Generated file settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// File name suggested for downloads and used by `generate --out <dir>`
    pub filename: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            filename: DEFAULT_FILENAME.to_string(),
        }
    }
}

/// Application configuration.
///
/// # File Location
///
/// - Linux: `~/.config/VoronConfigurator/config.toml`
/// - macOS: `~/Library/Application Support/VoronConfigurator/config.toml`
/// - Windows: `%APPDATA%\VoronConfigurator\config.toml`
///
/// # Validation
///
/// - `server.host` must not be empty
/// - `reference.timeout_secs` must be between 1 and 60
/// - `reference.mirror`, when set, must be an http(s) URL
/// - `output.filename` must be a bare file name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Web server settings
    pub server: ServerConfig,
    /// Reference config fetching
    pub reference: ReferenceConfig,
    /// Output settings
    pub output: OutputConfig,
}

impl Config {
    /// Creates a new Config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks if the config file exists on disk.
    #[must_use]
    pub fn exists() -> bool {
        Self::config_file_path()
            .map(|path| path.exists())
            .unwrap_or(false)
    }

    /// Gets the platform-specific config directory path.
    ///
    /// `VORONCONF_CONFIG_DIR` overrides the platform location.
    pub fn config_dir() -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join(CONFIG_DIR_NAME);

        Ok(config_dir)
    }

    /// Gets the full path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Loads configuration from the default location.
    ///
    /// If the file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Loads configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }

    /// Saves configuration to the default location using atomic write.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Saves configuration to a specific file.
    ///
    /// Uses temp file + rename pattern for atomic writes.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).context(format!(
                "Failed to create config directory: {}",
                dir.display()
            ))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        let temp_path = path.with_extension("toml.tmp");

        fs::write(&temp_path, content).context(format!(
            "Failed to write temp config file: {}",
            temp_path.display()
        ))?;

        fs::rename(&temp_path, path).context(format!(
            "Failed to rename temp config file to: {}",
            path.display()
        ))?;

        Ok(())
    }

    /// Validates configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            anyhow::bail!("server.host must not be empty");
        }

        let timeout = self.reference.timeout_secs;
        if timeout == 0 || timeout > MAX_TIMEOUT_SECS {
            anyhow::bail!(
                "reference.timeout_secs must be between 1 and {MAX_TIMEOUT_SECS}, got {timeout}"
            );
        }

        if let Some(mirror) = &self.reference.mirror {
            if !(mirror.starts_with("http://") || mirror.starts_with("https://")) {
                anyhow::bail!("reference.mirror must be an http(s) URL, got '{mirror}'");
            }
        }

        let filename = &self.output.filename;
        let bare = Path::new(filename).file_name().and_then(|n| n.to_str());
        if filename.trim().is_empty() || bare != Some(filename.as_str()) {
            anyhow::bail!("output.filename must be a plain file name, got '{filename}'");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_new() {
        let config = Config::new();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.reference.timeout(), Duration::from_secs(10));
        assert_eq!(config.output.filename, "printer.cfg");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validate() {
        let mut config = Config::new();
        config.reference.timeout_secs = 0;
        assert!(config.validate().is_err());
        config.reference.timeout_secs = 61;
        assert!(config.validate().is_err());
        config.reference.timeout_secs = 60;
        assert!(config.validate().is_ok());

        config.server.host = "  ".to_string();
        assert!(config.validate().is_err());
        config.server.host = "0.0.0.0".to_string();

        config.output.filename = "../printer.cfg".to_string();
        assert!(config.validate().is_err());
        config.output.filename = "voron.cfg".to_string();
        assert!(config.validate().is_ok());

        config.reference.mirror = Some("ftp://mirror.local".to_string());
        assert!(config.validate().is_err());
        config.reference.mirror = Some("http://127.0.0.1:8000/".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::new();
        config.server.port = 8080;
        config.save_to(&config_file).unwrap();
        assert!(!config_file.with_extension("toml.tmp").exists());

        let loaded = Config::load_from(&config_file).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let loaded = Config::load_from(&temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[server]\nport = 9000\n").unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.server.port, 9000);
        assert_eq!(loaded.server.host, "127.0.0.1");
        assert_eq!(loaded.reference.timeout_secs, 10);
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[reference]\ntimeout_secs = 0\n").unwrap();
        assert!(Config::load_from(&path).is_err());

        fs::write(&path, "not toml [").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
