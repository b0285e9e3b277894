//! Configuration loader
//!
//! Handles loading configuration from TOML files and merging with defaults.

use super::defaults::default_config;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// File read when no path is given on the command line
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_scanner")]
    pub scanner: ScannerConfig,

    #[serde(default = "default_tracker")]
    pub tracker: TrackerConfig,

    #[serde(default = "default_logging")]
    pub logging: LoggingConfig,
}

/// Scanner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    #[serde(default = "default_max_threads")]
    pub max_threads: usize,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    #[serde(default = "default_include_copy_on_write")]
    pub include_copy_on_write: bool,
}

/// Target selection and loop timing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Executable name polled by the process watcher
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_name: Option<String>,
    /// Fixed target; takes precedence over `process_name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_pid: Option<u32>,
    #[serde(default = "default_cycle_interval_ms")]
    pub cycle_interval_ms: u64,
    #[serde(default = "default_process_poll_interval_ms")]
    pub process_poll_interval_ms: u64,
}

impl TrackerConfig {
    pub fn cycle_interval(&self) -> Duration {
        Duration::from_millis(self.cycle_interval_ms)
    }

    pub fn process_poll_interval(&self) -> Duration {
        Duration::from_millis(self.process_poll_interval_ms)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Configuration loader
pub struct ConfigLoader {
    config_path: PathBuf,
}

impl ConfigLoader {
    /// Creates a new configuration loader
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        ConfigLoader {
            config_path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Loads configuration from file
    pub fn load(&self) -> Result<Config, ConfigError> {
        if !self.config_path.exists() {
            return Err(ConfigError::FileNotFound(
                self.config_path.display().to_string(),
            ));
        }

        let contents = fs::read_to_string(&self.config_path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Loads configuration, falling back to defaults only when the file is absent
    pub fn load_or_default(&self) -> Result<Config, ConfigError> {
        match self.load() {
            Err(ConfigError::FileNotFound(_)) => Ok(Config::default()),
            other => other,
        }
    }

    /// Saves configuration to file
    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, contents)?;
        Ok(())
    }
}

/// Loads configuration from `path`, or defaults if the file doesn't exist
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    ConfigLoader::new(path).load_or_default()
}

// Default functions for serde
fn default_scanner() -> ScannerConfig {
    let defaults = default_config();
    ScannerConfig {
        max_threads: defaults.scanner.max_threads,
        chunk_size: defaults.scanner.chunk_size,
        parallel: defaults.scanner.parallel,
        include_copy_on_write: defaults.scanner.include_copy_on_write,
    }
}

fn default_tracker() -> TrackerConfig {
    let defaults = default_config();
    TrackerConfig {
        process_name: None,
        target_pid: None,
        cycle_interval_ms: defaults.tracker.cycle_interval_ms,
        process_poll_interval_ms: defaults.tracker.process_poll_interval_ms,
    }
}

fn default_logging() -> LoggingConfig {
    LoggingConfig {
        level: default_config().logging.level,
    }
}

// Individual field defaults
fn default_max_threads() -> usize {
    default_config().scanner.max_threads
}

fn default_chunk_size() -> usize {
    default_config().scanner.chunk_size
}

fn default_parallel() -> bool {
    default_config().scanner.parallel
}

fn default_include_copy_on_write() -> bool {
    default_config().scanner.include_copy_on_write
}

fn default_cycle_interval_ms() -> u64 {
    default_config().tracker.cycle_interval_ms
}

fn default_process_poll_interval_ms() -> u64 {
    default_config().tracker.process_poll_interval_ms
}

fn default_log_level() -> String {
    default_config().logging.level
}

impl Default for Config {
    fn default() -> Self {
        Config {
            scanner: default_scanner(),
            tracker: default_tracker(),
            logging: default_logging(),
        }
    }
}
