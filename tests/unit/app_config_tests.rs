/*!
 * Tests for configuration loading, saving and validation
 */

use lexipure::app_config::{Config, LogLevel};

#[test]
fn test_config_saveAndLoad_shouldRoundTrip() {
    let mut config = Config::default();
    config.scheduler.max_concurrent = 3;
    config.cache.capacity = 250;
    config.log_level = LogLevel::Debug;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conf.json");
    config.save_to_file(&path).unwrap();

    let loaded = Config::from_file(&path).unwrap();
    assert_eq!(loaded.scheduler.max_concurrent, 3);
    assert_eq!(loaded.cache.capacity, 250);
    assert_eq!(loaded.log_level, LogLevel::Debug);
}

#[test]
fn test_config_fromFile_partialJson_shouldFillDefaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("partial.json");
    std::fs::write(
        &path,
        r#"{ "cache": { "capacity": 50 }, "log_level": "warn" }"#,
    )
    .unwrap();

    let config = Config::from_file(&path).unwrap();
    assert_eq!(config.cache.capacity, 50);
    assert_eq!(config.log_level, LogLevel::Warn);
    assert_eq!(config.scheduler.max_concurrent, 5);
    assert_eq!(config.scheduler.queue_capacity(), 50);
    assert!(config.pipeline.zero_tolerance);
    assert_eq!(config.max_text_length, 20_000);
}

#[test]
fn test_config_fromFile_invalidValues_shouldFailValidation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("invalid.json");
    std::fs::write(&path, r#"{ "scheduler": { "max_concurrent": 0 } }"#).unwrap();

    assert!(Config::from_file(&path).is_err());
}

#[test]
fn test_config_fromFile_missingFile_shouldFail() {
    let dir = tempfile::tempdir().unwrap();
    assert!(Config::from_file(dir.path().join("absent.json")).is_err());
}

#[test]
fn test_config_validate_shouldRejectOutOfRangeThresholds() {
    let mut config = Config::default();
    config.cache.purity_threshold = 150.0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.cache.low_confidence_threshold = 1.5;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.cache.decay_rate_per_hour = -0.1;
    assert!(config.validate().is_err());
}

#[test]
fn test_logLevel_toLevelFilter_shouldMap() {
    assert_eq!(LogLevel::Error.to_level_filter(), log::LevelFilter::Error);
    assert_eq!(LogLevel::Trace.to_level_filter(), log::LevelFilter::Trace);
    assert_eq!(LogLevel::default().to_level_filter(), log::LevelFilter::Info);
}
