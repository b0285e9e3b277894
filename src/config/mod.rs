//! Configuration module
//!
//! Provides configuration loading, validation, and default settings for the
//! scanner and the tracking loops.

mod defaults;
mod loader;
mod validator;

pub use defaults::{default_config, ConfigDefaults};
pub use loader::{load_config, ConfigLoader, DEFAULT_CONFIG_PATH};
pub use validator::{validate_config, ConfigValidator};

pub use loader::{Config, LoggingConfig, ScannerConfig, TrackerConfig};

pub use loader::ConfigError;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_load_config_missing_file_gives_defaults() {
        let config = load_config("does-not-exist.toml").unwrap();
        assert_eq!(config.scanner.chunk_size, default_config().scanner.chunk_size);
    }

    #[test]
    fn test_config_error_from_io() {
        use std::io;
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let config_error: ConfigError = io_error.into();
        assert!(matches!(config_error, ConfigError::Io(_)));
    }
}
