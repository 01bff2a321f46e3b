/*!
 * # doctrans - segmented-batch document translation
 *
 * A Rust library for translating long documents through an external LLM
 * oracle while guaranteeing structural fidelity: every input paragraph is
 * accounted for in the output, terminology stays consistent across
 * thousands of independent oracle calls, sentence boundaries survive
 * arbitrary batch cut points, and a multi-hour run is resumable after
 * partial failure.
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `extraction`: Input collaborator contract for pre-extracted page text
 * - `translation`: The batch pipeline:
 *   - `translation::segmenter`: Tag grammar and segmentation
 *   - `translation::stitcher`: Cross-batch sentence stitching
 *   - `translation::dispatcher`: Oracle dispatch with bounded retry
 *   - `translation::validator`: Alignment validation and drift detection
 *   - `translation::glossary`: First-writer-wins terminology store
 *   - `translation::artifacts`: Batch caching and resumability
 *   - `translation::report`: Quality reporting
 * - `oracle`: Clients for the external translation service
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod extraction;
pub mod language_utils;
pub mod oracle;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, RunSummary};
pub use errors::{AppError, BatchError, ConfigError, OracleError};
pub use extraction::{PageSource, PlainTextSource};
pub use oracle::{Oracle, OracleRequest, OracleResponse};
pub use translation::{
    ArtifactStore, Batch, BatchStatus, Dispatcher, GlossaryStore, QualityReporter, RetryPolicy,
    Segment, SegmentStatus, Segmenter, Stitcher, Validator,
};
