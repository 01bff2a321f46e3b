use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::default::Default;
use std::path::PathBuf;

use crate::errors::ConfigError;
use crate::language_utils;

/// Application configuration module
/// This module handles the run configuration including loading,
/// validating and saving configuration settings.
/// Represents the run configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code (ISO)
    pub source_language: String,

    /// Target language code (ISO)
    pub target_language: String,

    /// Pre-extracted source text, pages separated by form feeds
    pub source_text: PathBuf,

    /// Directory receiving all run artifacts
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// File name of the assembled document
    #[serde(default = "default_document_name")]
    pub document_name: String,

    /// Pages per oracle request
    #[serde(default = "default_pages_per_batch")]
    pub pages_per_batch: usize,

    /// Delay between consecutive batches in milliseconds
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,

    /// Oracle endpoint configuration
    #[serde(default)]
    pub oracle: OracleConfig,

    /// Retry policy for oracle dispatch
    #[serde(default)]
    pub retry: RetryConfig,

    /// Alignment validation thresholds
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Sentence stitching bounds
    #[serde(default)]
    pub stitching: StitchConfig,

    /// Preconfigured glossary terms, source -> target. These always win
    /// over terms learned from oracle responses.
    #[serde(default)]
    pub glossary: BTreeMap<String, String>,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Oracle service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OracleConfig {
    // @field: Chat-completions endpoint URL
    #[serde(default = "default_oracle_endpoint")]
    pub endpoint: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Model name
    #[serde(default = "default_oracle_model")]
    pub model: String,

    // @field: Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    // @field: Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Completion token ceiling per request
    #[serde(default = "default_max_completion_tokens")]
    pub max_completion_tokens: u32,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            endpoint: default_oracle_endpoint(),
            api_key: String::new(),
            model: default_oracle_model(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            max_completion_tokens: default_max_completion_tokens(),
        }
    }
}

/// Retry configuration for oracle dispatch
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RetryConfig {
    // @field: Maximum attempts per dispatch
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    // @field: Base backoff in milliseconds for exponential backoff
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    // @field: Backoff ceiling in milliseconds
    #[serde(default = "default_backoff_cap_ms")]
    pub backoff_cap_ms: u64,

    // @field: Whether to add random jitter to backoff delays
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
            backoff_cap_ms: default_backoff_cap_ms(),
            jitter: default_true(),
        }
    }
}

/// Alignment validation thresholds
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ValidationConfig {
    // @field: Drift fraction above which a batch is suspect
    #[serde(default = "default_drift_threshold")]
    pub drift_threshold: f64,

    // @field: Dropped segment count above which a batch is suspect
    #[serde(default = "default_dropped_ceiling")]
    pub dropped_ceiling: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            drift_threshold: default_drift_threshold(),
            dropped_ceiling: default_dropped_ceiling(),
        }
    }
}

/// Sentence stitching bounds
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StitchConfig {
    // @field: Maximum characters borrowed from the next batch
    #[serde(default = "default_max_borrow")]
    pub max_borrow: usize,
}

impl Default for StitchConfig {
    fn default() -> Self {
        Self {
            max_borrow: default_max_borrow(),
        }
    }
}

/// Log level for the application
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_document_name() -> String {
    "translated_document.md".to_string()
}

fn default_pages_per_batch() -> usize {
    8
}

fn default_throttle_ms() -> u64 {
    1000
}

fn default_oracle_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_oracle_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_max_completion_tokens() -> u32 {
    8000
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    1000
}

fn default_backoff_cap_ms() -> u64 {
    30_000
}

fn default_true() -> bool {
    true
}

fn default_drift_threshold() -> f64 {
    0.2
}

fn default_dropped_ceiling() -> usize {
    10
}

fn default_max_borrow() -> usize {
    1000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_language: "en".to_string(),
            target_language: "zh".to_string(),
            source_text: PathBuf::from("source.txt"),
            output_dir: default_output_dir(),
            document_name: default_document_name(),
            pages_per_batch: default_pages_per_batch(),
            throttle_ms: default_throttle_ms(),
            oracle: OracleConfig::default(),
            retry: RetryConfig::default(),
            validation: ValidationConfig::default(),
            stitching: StitchConfig::default(),
            glossary: BTreeMap::new(),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    // @validates: Run parameters before any batch is processed
    pub fn validate(&self) -> Result<(), ConfigError> {
        language_utils::validate_language_code(&self.source_language)?;
        language_utils::validate_language_code(&self.target_language)?;

        if !self.source_text.exists() {
            return Err(ConfigError::MissingSource(
                self.source_text.display().to_string(),
            ));
        }

        if self.pages_per_batch == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pages_per_batch",
                message: "must be at least 1".to_string(),
            });
        }

        if self.retry.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "retry.max_attempts",
                message: "must be at least 1".to_string(),
            });
        }

        if !(self.validation.drift_threshold > 0.0 && self.validation.drift_threshold <= 1.0) {
            return Err(ConfigError::InvalidValue {
                field: "validation.drift_threshold",
                message: format!(
                    "must be in (0, 1], got {}",
                    self.validation.drift_threshold
                ),
            });
        }

        if self.stitching.max_borrow == 0 {
            return Err(ConfigError::InvalidValue {
                field: "stitching.max_borrow",
                message: "must be at least 1".to_string(),
            });
        }

        if self.oracle.endpoint.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "oracle.endpoint",
                message: "must not be empty".to_string(),
            });
        }

        Ok(())
    }
}
