/*!
 * Output alignment validation.
 *
 * The oracle gives no compliance guarantee: units may come back out of
 * order, marked missing, flagged as boilerplate, or not at all. The
 * validator reconciles the tagged response against the input indices,
 * classifies every segment, and measures drift between input and output
 * unit counts.
 */

use log::warn;
use std::collections::HashMap;

use crate::app_config::ValidationConfig;
use crate::errors::BatchError;
use crate::translation::segmenter::{
    self, BOILERPLATE_MARKER, MISSING_MARKER, PARAGRAPH_SEPARATOR, Segment, SegmentStatus,
};

/// Result of reconciling one oracle response.
#[derive(Debug, Clone)]
pub struct ValidationOutcome {
    /// Rendered segments joined in input order, missing/suppressed excluded
    pub cleaned_text: String,

    /// Number of rendered segments
    pub rendered: usize,

    /// Indices classified missing, explicit placeholders and dropped alike
    pub missing: Vec<usize>,

    /// Indices absent from the output entirely; always a subset of
    /// `missing`
    pub dropped: Vec<usize>,

    /// Indices classified as boilerplate or returned empty
    pub suppressed: Vec<usize>,

    /// Fractional mismatch between input and echoed unit counts
    pub drift: f64,

    /// Whether drift or dropped count exceeded the configured thresholds
    pub suspect: bool,
}

impl ValidationOutcome {
    /// Whether reconciliation found any defect worth a warning.
    pub fn has_defects(&self) -> bool {
        !self.missing.is_empty() || !self.suppressed.is_empty() || self.suspect
    }
}

/// Reconciles oracle output against input indices.
pub struct Validator {
    drift_threshold: f64,
    dropped_ceiling: usize,
}

impl Validator {
    /// Create a validator with the configured thresholds.
    pub fn new(config: &ValidationConfig) -> Self {
        Self {
            drift_threshold: config.drift_threshold,
            dropped_ceiling: config.dropped_ceiling,
        }
    }

    /// Reconcile a tagged oracle response against the batch's segments.
    ///
    /// Segment statuses and rendered text are updated in place. Every
    /// input index ends up classified as exactly one of rendered, missing
    /// or suppressed; indices the oracle dropped are force-classified
    /// missing. An entirely empty cleaned result is a hard failure,
    /// distinct from a partial-but-nonempty one.
    pub fn validate(
        &self,
        response: &str,
        segments: &mut [Segment],
    ) -> Result<ValidationOutcome, BatchError> {
        let decoded = segmenter::decode(response);
        let echoed_count = decoded.len();

        // First occurrence wins when the oracle repeats an index.
        let mut by_index: HashMap<usize, String> = HashMap::with_capacity(decoded.len());
        for (index, content) in decoded {
            by_index.entry(index).or_insert(content);
        }

        let mut rendered_parts = Vec::new();
        let mut missing = Vec::new();
        let mut dropped = Vec::new();
        let mut suppressed = Vec::new();

        for segment in segments.iter_mut() {
            match by_index.remove(&segment.index) {
                Some(content) if content == MISSING_MARKER => {
                    segment.status = SegmentStatus::Missing;
                    missing.push(segment.index);
                }
                Some(content) if content.is_empty() || content == BOILERPLATE_MARKER => {
                    segment.status = SegmentStatus::Suppressed;
                    suppressed.push(segment.index);
                }
                Some(content) => {
                    segment.status = SegmentStatus::Rendered;
                    segment.rendered_text = Some(content.clone());
                    rendered_parts.push(content);
                }
                None => {
                    segment.status = SegmentStatus::Missing;
                    dropped.push(segment.index);
                    missing.push(segment.index);
                }
            }
        }

        let input_count = segments.len();
        let drift = if input_count > 0 {
            (input_count as f64 - echoed_count as f64).abs() / input_count as f64
        } else {
            0.0
        };

        let suspect = drift > self.drift_threshold || dropped.len() > self.dropped_ceiling;
        if suspect {
            warn!(
                "Suspect batch output: {} input vs {} echoed units (drift {:.1}%), {} dropped",
                input_count,
                echoed_count,
                drift * 100.0,
                dropped.len()
            );
        }

        let cleaned_text = rendered_parts.join(PARAGRAPH_SEPARATOR);
        if input_count > 0 && cleaned_text.trim().is_empty() {
            return Err(BatchError::EmptyResult);
        }

        Ok(ValidationOutcome {
            cleaned_text,
            rendered: rendered_parts.len(),
            missing,
            dropped,
            suppressed,
            drift,
            suspect,
        })
    }
}
