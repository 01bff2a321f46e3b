/*!
 * The segmented-batch translation pipeline.
 *
 * This module contains the pipeline stages, leaves first:
 * - `segmenter`: tag grammar and blank-line segmentation
 * - `stitcher`: cross-batch sentence boundary stitching
 * - `retry`: reusable retry policy for oracle dispatch
 * - `dispatcher`: request assembly and oracle dispatch
 * - `validator`: output alignment validation and drift detection
 * - `glossary`: first-writer-wins terminology store
 * - `style`: once-per-run style profile
 * - `artifacts`: batch-level caching and resumability
 * - `batch`: batch planning and state
 * - `report`: quality reporting and retry scope
 */

pub mod artifacts;
pub mod batch;
pub mod dispatcher;
pub mod glossary;
pub mod report;
pub mod retry;
pub mod segmenter;
pub mod stitcher;
pub mod style;
pub mod validator;

pub use artifacts::ArtifactStore;
pub use batch::{Batch, BatchStatus};
pub use dispatcher::Dispatcher;
pub use glossary::GlossaryStore;
pub use report::QualityReporter;
pub use retry::RetryPolicy;
pub use segmenter::{Segment, SegmentStatus, Segmenter};
pub use stitcher::Stitcher;
pub use validator::Validator;
