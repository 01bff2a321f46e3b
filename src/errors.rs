/*!
 * Error types for the doctrans application.
 *
 * This module contains custom error types for different parts of the pipeline,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors in the run configuration. These are fatal and abort the run
/// before any batch is processed.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A language code that isolang does not recognize
    #[error("unknown language code: {0}")]
    UnknownLanguage(String),

    /// The configured source text file does not exist
    #[error("source text not found: {0}")]
    MissingSource(String),

    /// A numeric or structural parameter is out of range
    #[error("invalid value for {field}: {message}")]
    InvalidValue {
        /// Configuration field name
        field: &'static str,
        /// What is wrong with it
        message: String,
    },
}

/// Errors that can occur when talking to the translation oracle
#[derive(Error, Debug)]
pub enum OracleError {
    /// Error when sending the request fails (network, DNS, TLS)
    #[error("oracle request failed: {0}")]
    RequestFailed(String),

    /// The request timed out
    #[error("oracle request timed out after {0}s")]
    Timeout(u64),

    /// Error returned by the service itself
    #[error("oracle responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the service
        message: String,
    },

    /// Error when parsing the response body fails
    #[error("failed to parse oracle response: {0}")]
    ParseError(String),

    /// The oracle answered with no usable content
    #[error("oracle returned empty content")]
    EmptyResponse,

    /// All retry attempts were used up
    #[error("oracle gave no usable response after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        /// How many attempts were made
        attempts: u32,
        /// The error from the final attempt
        last_error: String,
    },
}

/// Batch-scoped failures. A batch that hits one of these is marked failed
/// and the run continues with the next batch.
#[derive(Error, Debug)]
pub enum BatchError {
    /// The input collaborator could not produce text for the batch range
    #[error("source extraction failed: {0}")]
    Extraction(String),

    /// Error from the oracle, after retries
    #[error("oracle error: {0}")]
    Oracle(#[from] OracleError),

    /// The validator stripped the response down to nothing
    #[error("validator produced no usable text")]
    EmptyResult,

    /// Reading or writing a batch artifact failed
    #[error("artifact error: {0}")]
    Artifact(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error in the run configuration
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error scoped to a single batch
    #[error("batch error: {0}")]
    Batch(#[from] BatchError),

    /// Error from a file operation
    #[error("file error: {0}")]
    File(String),

    /// Any other error
    #[error("unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
