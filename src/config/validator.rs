//! Configuration validator
//!
//! Validates configuration values to ensure they are within acceptable ranges.

use super::loader::{Config, ConfigError, LoggingConfig, ScannerConfig, TrackerConfig};

const MIN_CHUNK_SIZE: usize = 4 * 1024;
const MAX_CHUNK_SIZE: usize = 1024 * 1024;

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates the entire configuration
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        Self::validate_scanner(&config.scanner)?;
        Self::validate_tracker(&config.tracker)?;
        Self::validate_logging(&config.logging)?;
        Ok(())
    }

    /// Validates scanner configuration
    fn validate_scanner(scanner: &ScannerConfig) -> Result<(), ConfigError> {
        if scanner.max_threads == 0 {
            return Err(ConfigError::Invalid(
                "Scanner threads must be at least 1".to_string(),
            ));
        }

        if scanner.max_threads > 128 {
            return Err(ConfigError::Invalid(
                "Scanner threads cannot exceed 128".to_string(),
            ));
        }

        if !scanner.chunk_size.is_power_of_two() {
            return Err(ConfigError::Invalid(
                "Chunk size must be a power of 2".to_string(),
            ));
        }

        if !(MIN_CHUNK_SIZE..=MAX_CHUNK_SIZE).contains(&scanner.chunk_size) {
            return Err(ConfigError::Invalid(format!(
                "Chunk size must be between {} and {} bytes",
                MIN_CHUNK_SIZE, MAX_CHUNK_SIZE
            )));
        }

        Ok(())
    }

    /// Validates tracker configuration
    fn validate_tracker(tracker: &TrackerConfig) -> Result<(), ConfigError> {
        if tracker.cycle_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "Cycle interval must be greater than 0".to_string(),
            ));
        }

        if tracker.process_poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "Process poll interval must be greater than 0".to_string(),
            ));
        }

        if tracker.target_pid == Some(0) {
            return Err(ConfigError::Invalid(
                "Target PID cannot be 0".to_string(),
            ));
        }

        if tracker
            .process_name
            .as_deref()
            .is_some_and(|name| name.trim().is_empty())
        {
            return Err(ConfigError::Invalid(
                "Process name cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Validates logging configuration
    fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::Invalid(format!(
                "Invalid log level: {}. Must be one of: {:?}",
                logging.level, valid_levels
            )));
        }

        Ok(())
    }
}

/// Validates a configuration
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    ConfigValidator::validate(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_invalid_thread_count() {
        let mut config = Config::default();
        config.scanner.max_threads = 0;
        assert!(validate_config(&config).is_err());

        config.scanner.max_threads = 129;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_invalid_chunk_size() {
        let mut config = Config::default();
        config.scanner.chunk_size = 0;
        assert!(validate_config(&config).is_err());

        config.scanner.chunk_size = 5000; // Not power of 2
        let result = validate_config(&config);
        assert!(result.unwrap_err().to_string().contains("power of 2"));

        config.scanner.chunk_size = 2048;
        assert!(validate_config(&config).is_err());

        config.scanner.chunk_size = 2 * 1024 * 1024;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_invalid_intervals() {
        let mut config = Config::default();
        config.tracker.cycle_interval_ms = 0;
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.tracker.process_poll_interval_ms = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_invalid_target() {
        let mut config = Config::default();
        config.tracker.target_pid = Some(0);
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.tracker.process_name = Some("  ".to_string());
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "invalid".to_string();
        let result = validate_config(&config);
        assert!(result.unwrap_err().to_string().contains("log level"));
    }

    #[test]
    fn test_edge_cases() {
        let mut config = Config::default();
        config.scanner.max_threads = 1;
        config.scanner.chunk_size = 4096;
        config.tracker.cycle_interval_ms = 1;
        assert!(validate_config(&config).is_ok());

        config.scanner.max_threads = 128;
        config.scanner.chunk_size = 1024 * 1024;
        config.logging.level = "DEBUG".to_string();
        assert!(validate_config(&config).is_ok());
    }
}
