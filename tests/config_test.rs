//! Loading and validating configuration files

use std::fs;
use tempfile::TempDir;
use value_tracker::config::{load_config, validate_config, ConfigError, ConfigLoader};
use value_tracker::ScanOptions;

#[test]
fn test_load_full_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
            [scanner]
            max_threads = 2
            chunk_size = 16384
            parallel = false
            include_copy_on_write = true

            [tracker]
            process_name = "game.exe"
            cycle_interval_ms = 500

            [logging]
            level = "debug"
        "#,
    )
    .unwrap();

    let config = load_config(&path).unwrap();
    assert!(validate_config(&config).is_ok());
    assert_eq!(config.tracker.process_name.as_deref(), Some("game.exe"));
    assert_eq!(config.tracker.process_poll_interval_ms, 1000);

    let options = ScanOptions::from(&config.scanner);
    assert_eq!(options.chunk_size, 16384);
    assert_eq!(options.max_threads, 2);
    assert!(!options.parallel);
    assert!(options.include_copy_on_write);
}

#[test]
fn test_invalid_values_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[scanner]\nchunk_size = 1000\n").unwrap();

    let config = load_config(&path).unwrap();
    assert!(matches!(validate_config(&config), Err(ConfigError::Invalid(_))));
}

#[test]
fn test_save_round_trip_through_loader() {
    let dir = TempDir::new().unwrap();
    let loader = ConfigLoader::new(dir.path().join("saved.toml"));

    let mut config = load_config(dir.path().join("missing.toml")).unwrap();
    config.tracker.target_pid = Some(31337);
    loader.save(&config).unwrap();

    let loaded = loader.load().unwrap();
    assert_eq!(loaded.tracker.target_pid, Some(31337));
    assert!(validate_config(&loaded).is_ok());
}
