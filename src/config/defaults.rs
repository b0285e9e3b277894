//! Default configuration values

use serde::{Deserialize, Serialize};

/// Default configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigDefaults {
    pub scanner: ScannerDefaults,
    pub tracker: TrackerDefaults,
    pub logging: LoggingDefaults,
}

/// Default scanner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerDefaults {
    pub max_threads: usize,
    pub chunk_size: usize,
    pub parallel: bool,
    pub include_copy_on_write: bool,
}

/// Default tracker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerDefaults {
    pub cycle_interval_ms: u64,
    pub process_poll_interval_ms: u64,
}

/// Default logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingDefaults {
    pub level: String,
}

/// Returns the default configuration
pub fn default_config() -> ConfigDefaults {
    ConfigDefaults {
        scanner: ScannerDefaults {
            max_threads: num_cpus::get().min(8),
            chunk_size: 65536, // 64KB
            parallel: true,
            include_copy_on_write: false,
        },
        tracker: TrackerDefaults {
            cycle_interval_ms: 1000,
            process_poll_interval_ms: 1000,
        },
        logging: LoggingDefaults {
            level: "info".to_string(),
        },
    }
}
