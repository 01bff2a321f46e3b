/*!
 * Batch planning and state.
 *
 * A batch is a contiguous `[start, end)` page range processed as one
 * oracle request. Batches carry 1-based ids and are processed strictly in
 * increasing id order.
 */

use std::ops::Range;

use crate::translation::segmenter::Segment;

/// Lifecycle state of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    /// Not yet looked at
    Unprocessed,
    /// Reused from a non-empty persisted artifact, no dispatch
    Cached,
    /// Dispatch underway
    InProgress,
    /// Fully reconciled without defects
    Completed,
    /// Reconciled, but with missing/dropped segments or drift
    CompletedWithWarnings,
    /// Terminal failure; the run continues with the next batch
    Failed,
}

/// A contiguous page range processed as one oracle request.
#[derive(Debug, Clone)]
pub struct Batch {
    /// 1-based batch id
    pub id: usize,

    /// Half-open 1-based page range `[start, end)`
    pub source_range: Range<usize>,

    /// Ordered segments, populated by the segmenter
    pub segments: Vec<Segment>,

    /// Lifecycle state
    pub status: BatchStatus,
}

impl Batch {
    /// First and last page covered, inclusive, for display.
    pub fn page_span(&self) -> (usize, usize) {
        (self.source_range.start, self.source_range.end - 1)
    }
}

/// Plan fixed-size batches over a paged source.
pub fn plan_batches(page_count: usize, pages_per_batch: usize) -> Vec<Batch> {
    let total = page_count.div_ceil(pages_per_batch);
    (1..=total)
        .map(|id| {
            let start = (id - 1) * pages_per_batch + 1;
            let end = (id * pages_per_batch).min(page_count) + 1;
            Batch {
                id,
                source_range: start..end,
                segments: Vec::new(),
                status: BatchStatus::Unprocessed,
            }
        })
        .collect()
}
