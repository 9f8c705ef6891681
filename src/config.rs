use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::envfile::store::DEFAULT_LOCATION;
use crate::envfile::{EnvStore, StoreOptions};

/// Main envfile configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub envfile: EnvFileConfig,
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EnvFileConfig {
    /// Location of the shared record
    pub path: PathBuf,
    /// Hold an advisory lock while merging
    pub lock: bool,
    pub lock_timeout_ms: u64,
    /// Write via temp file and rename
    pub atomic_write: bool,
}

impl Default for EnvFileConfig {
    fn default() -> Self {
        let options = StoreOptions::default();
        Self {
            path: PathBuf::from(DEFAULT_LOCATION),
            lock: options.lock,
            lock_timeout_ms: options.lock_timeout.as_millis() as u64,
            atomic_write: options.atomic_write,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }

    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Trace => log::LevelFilter::Trace,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Off => log::LevelFilter::Off,
        }
    }
}

impl Config {
    /// Load configuration with fallback chain, then apply `ENVFILE_PATH`
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let config = Self::load_chain(config_path)?;
        Ok(config.with_path_override(std::env::var_os("ENVFILE_PATH").map(PathBuf::from)))
    }

    fn load_chain(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Check ENVFILE_CONFIG env var
        if let Ok(env_path) = std::env::var("ENVFILE_CONFIG") {
            let path = PathBuf::from(env_path);
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from ENVFILE_CONFIG: {}", e);
                    }
                }
            }
        }

        // Try ENVFILE_DIR/envfile.yaml, then ~/.config/envfile/envfile.yaml
        let user_config = Self::envfile_dir().join("envfile.yaml");
        if user_config.exists() {
            match Self::load_from_file(&user_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", user_config.display(), e);
                }
            }
        }

        // Try ./envfile.yaml (for development)
        let local_config = PathBuf::from("envfile.yaml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load local config: {}", e);
                }
            }
        }

        // No config file found, use defaults
        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Replace the record location when an override is given
    pub fn with_path_override(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path.filter(|p| !p.as_os_str().is_empty()) {
            self.envfile.path = path;
        }
        self
    }

    /// Directory holding the user config (`$ENVFILE_DIR` or ~/.config/envfile)
    pub fn envfile_dir() -> PathBuf {
        std::env::var("ENVFILE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join("envfile"))
    }

    /// Expand a path that may contain ~ or env vars
    pub fn expand_path(path: &Path) -> PathBuf {
        let path_str = path.to_string_lossy();
        let expanded = shellexpand::full(&path_str).unwrap_or_else(|_| path_str.clone());
        PathBuf::from(expanded.as_ref())
    }

    /// Expanded location of the record
    pub fn store_path(&self) -> PathBuf {
        Self::expand_path(&self.envfile.path)
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            lock: self.envfile.lock,
            lock_timeout: Duration::from_millis(self.envfile.lock_timeout_ms),
            atomic_write: self.envfile.atomic_write,
        }
    }

    /// Store for the configured location
    pub fn store(&self) -> EnvStore {
        EnvStore::with_options(self.store_path(), self.store_options())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.envfile.path, PathBuf::from("/etc/envfile.json"));
        assert!(config.envfile.lock);
        assert!(config.envfile.atomic_write);
        assert_eq!(config.envfile.lock_timeout_ms, 5000);
        assert_eq!(config.log_level, LogLevel::Info);
    }

    #[test]
    fn test_store_options_from_config() {
        let mut config = Config::default();
        config.envfile.lock = false;
        config.envfile.lock_timeout_ms = 250;
        config.envfile.atomic_write = false;

        let options = config.store_options();
        assert!(!options.lock);
        assert_eq!(options.lock_timeout, Duration::from_millis(250));
        assert!(!options.atomic_write);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: Config = serde_yaml::from_str("envfile:\n  path: /tmp/x.json\nlog_level: debug\n").unwrap();
        assert_eq!(config.envfile.path, PathBuf::from("/tmp/x.json"));
        assert!(config.envfile.lock);
        assert_eq!(config.log_level, LogLevel::Debug);
    }

    #[test]
    fn test_load_from_explicit_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("envfile.yaml");
        fs::write(&path, "envfile:\n  atomic_write: false\n").unwrap();

        let config = Config::load_chain(Some(&path)).unwrap();
        assert!(!config.envfile.atomic_write);
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing.yaml");
        assert!(Config::load_chain(Some(&path)).is_err());
    }

    #[test]
    fn test_path_override() {
        let config = Config::default().with_path_override(Some(PathBuf::from("/run/envfile.json")));
        assert_eq!(config.envfile.path, PathBuf::from("/run/envfile.json"));

        let config = Config::default().with_path_override(Some(PathBuf::new()));
        assert_eq!(config.envfile.path, PathBuf::from(DEFAULT_LOCATION));

        let config = Config::default().with_path_override(None);
        assert_eq!(config.envfile.path, PathBuf::from(DEFAULT_LOCATION));
    }

    #[test]
    fn test_expand_path_no_expansion() {
        let path = PathBuf::from("/usr/local/bin");
        assert_eq!(Config::expand_path(&path), PathBuf::from("/usr/local/bin"));
    }

    #[test]
    fn test_expand_path_with_env_var() {
        // SAFETY: env var is test-specific
        unsafe {
            std::env::set_var("ENVFILE_CONFIG_TEST_VAR", "/custom/path");
        }
        let path = PathBuf::from("$ENVFILE_CONFIG_TEST_VAR/envfile.json");
        assert_eq!(Config::expand_path(&path), PathBuf::from("/custom/path/envfile.json"));
        unsafe {
            std::env::remove_var("ENVFILE_CONFIG_TEST_VAR");
        }
    }

    #[test]
    fn test_log_level_filters() {
        assert_eq!(LogLevel::Warn.as_filter(), "warn");
        assert_eq!(LogLevel::Off.to_level_filter(), log::LevelFilter::Off);
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = Config::default();
        let yaml_str = serde_yaml::to_string(&config).expect("Failed to serialize");
        let parsed: Config = serde_yaml::from_str(&yaml_str).expect("Failed to deserialize");
        assert_eq!(parsed.envfile.path, config.envfile.path);
        assert_eq!(parsed.log_level, config.log_level);
    }
}
