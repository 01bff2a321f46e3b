/*!
 * Tests for run configuration loading and validation
 */

use doctrans::app_config::Config;
use doctrans::errors::ConfigError;

use crate::common;

#[test]
fn test_config_validate_withDefaultsAndExistingSource_shouldPass() {
    let workspace = common::workspace_with_pages(&["page one"], 8);
    assert!(workspace.config.validate().is_ok());
}

#[test]
fn test_config_validate_withUnknownLanguage_shouldFail() {
    let workspace = common::workspace_with_pages(&["page one"], 8);
    let mut config = workspace.config;
    config.target_language = "klingon".to_string();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::UnknownLanguage(_))
    ));
}

#[test]
fn test_config_validate_withMissingSource_shouldFail() {
    let workspace = common::workspace_with_pages(&["page one"], 8);
    let mut config = workspace.config;
    config.source_text = workspace.dir.path().join("nope.txt");
    assert!(matches!(
        config.validate(),
        Err(ConfigError::MissingSource(_))
    ));
}

#[test]
fn test_config_validate_withZeroPagesPerBatch_shouldFail() {
    let workspace = common::workspace_with_pages(&["page one"], 8);
    let mut config = workspace.config;
    config.pages_per_batch = 0;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidValue { field, .. }) if field == "pages_per_batch"
    ));
}

#[test]
fn test_config_validate_withZeroRetryAttempts_shouldFail() {
    let workspace = common::workspace_with_pages(&["page one"], 8);
    let mut config = workspace.config;
    config.retry.max_attempts = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_config_validate_withOutOfRangeDriftThreshold_shouldFail() {
    let workspace = common::workspace_with_pages(&["page one"], 8);
    let mut config = workspace.config;
    config.validation.drift_threshold = 0.0;
    assert!(config.validate().is_err());
    config.validation.drift_threshold = 1.5;
    assert!(config.validate().is_err());
}

#[test]
fn test_config_roundTrip_throughJson_shouldPreserveFields() {
    let workspace = common::workspace_with_pages(&["page one"], 8);
    let mut config = workspace.config;
    config
        .glossary
        .insert("Khun".to_string(), "Khun".to_string());

    let json = serde_json::to_string_pretty(&config).unwrap();
    let parsed: Config = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed.pages_per_batch, config.pages_per_batch);
    assert_eq!(parsed.glossary.get("Khun"), Some(&"Khun".to_string()));
    assert_eq!(parsed.retry.max_attempts, config.retry.max_attempts);
}

#[test]
fn test_config_fromPartialJson_shouldFillDefaults() {
    let json = r#"{
        "source_language": "en",
        "target_language": "fr",
        "source_text": "book.txt"
    }"#;
    let config: Config = serde_json::from_str(json).unwrap();
    assert_eq!(config.pages_per_batch, 8);
    assert_eq!(config.validation.drift_threshold, 0.2);
    assert_eq!(config.validation.dropped_ceiling, 10);
    assert_eq!(config.retry.max_attempts, 3);
    assert_eq!(config.stitching.max_borrow, 1000);
}
