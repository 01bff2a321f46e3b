/*!
 * Quality reporting.
 *
 * Per-batch outcomes accumulate into a final report plus an auto-generated
 * retry scope containing only the failed batch ids. Batch failures never
 * abort the run; they surface here.
 */

use serde::{Deserialize, Serialize};

use crate::translation::batch::BatchStatus;

/// Outcome of one batch after reconciliation (or failure).
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// Batch id
    pub id: usize,

    /// Terminal status for this run
    pub status: BatchStatus,

    /// Indices classified missing, dropped ones included
    pub missing: Vec<usize>,

    /// Indices the oracle dropped entirely
    pub dropped: Vec<usize>,

    /// Drift fraction between input and echoed unit counts
    pub drift: f64,

    /// Whether the batch was flagged suspect
    pub suspect: bool,

    /// Failure reason or other annotation
    pub note: Option<String>,
}

impl BatchOutcome {
    /// Outcome for a batch that failed outright.
    pub fn failed(id: usize, note: impl Into<String>) -> Self {
        Self {
            id,
            status: BatchStatus::Failed,
            missing: Vec::new(),
            dropped: Vec::new(),
            drift: 0.0,
            suspect: false,
            note: Some(note.into()),
        }
    }
}

/// Retry scope listing the batches worth another attempt.
#[derive(Debug, Serialize, Deserialize)]
pub struct RetryScope {
    /// Ids of batches that failed this run
    pub failed_batches: Vec<usize>,
}

/// Aggregates per-batch outcomes into the final report.
#[derive(Debug, Default)]
pub struct QualityReporter {
    outcomes: Vec<BatchOutcome>,
}

impl QualityReporter {
    /// Create an empty reporter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one batch outcome.
    pub fn record(&mut self, outcome: BatchOutcome) {
        self.outcomes.push(outcome);
    }

    /// Ids of failed batches, ascending.
    pub fn failed_ids(&self) -> Vec<usize> {
        let mut ids: Vec<usize> = self
            .outcomes
            .iter()
            .filter(|o| o.status == BatchStatus::Failed)
            .map(|o| o.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Ids of suspect batches, ascending.
    pub fn suspect_ids(&self) -> Vec<usize> {
        let mut ids: Vec<usize> = self
            .outcomes
            .iter()
            .filter(|o| o.suspect)
            .map(|o| o.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Number of batches that produced a usable artifact.
    pub fn succeeded_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status != BatchStatus::Failed)
            .count()
    }

    /// Whether at least one batch produced a usable artifact.
    pub fn is_partial_success(&self) -> bool {
        self.succeeded_count() > 0
    }

    /// The auto-generated retry scope.
    pub fn retry_scope(&self) -> RetryScope {
        RetryScope {
            failed_batches: self.failed_ids(),
        }
    }

    /// One-line run summary.
    pub fn summary_line(&self) -> String {
        format!(
            "{} succeeded, {} failed, {} suspect of {} batches",
            self.succeeded_count(),
            self.failed_ids().len(),
            self.suspect_ids().len(),
            self.outcomes.len()
        )
    }

    /// Render the full quality report.
    pub fn render(&self) -> String {
        let mut lines = vec![
            "# Translation quality report".to_string(),
            format!(
                "Generated: {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
            ),
            format!("Batches: {}", self.outcomes.len()),
            format!("Succeeded: {}", self.succeeded_count()),
            format!("Failed: {}", self.failed_ids().len()),
            format!("Suspect: {}", self.suspect_ids().len()),
        ];

        let failed: Vec<&BatchOutcome> = self
            .outcomes
            .iter()
            .filter(|o| o.status == BatchStatus::Failed)
            .collect();
        if !failed.is_empty() {
            lines.push(String::new());
            lines.push("## Failed batches".to_string());
            for outcome in failed {
                lines.push(format!(
                    "- batch {}: {}",
                    outcome.id,
                    outcome.note.as_deref().unwrap_or("unknown failure")
                ));
            }
        }

        let defective: Vec<&BatchOutcome> = self
            .outcomes
            .iter()
            .filter(|o| {
                o.status == BatchStatus::CompletedWithWarnings || o.suspect
            })
            .collect();
        if !defective.is_empty() {
            lines.push(String::new());
            lines.push("## Batches with warnings".to_string());
            for outcome in defective {
                let mut detail = Vec::new();
                if !outcome.missing.is_empty() {
                    detail.push(format!("missing {:?}", outcome.missing));
                }
                if !outcome.dropped.is_empty() {
                    detail.push(format!("dropped {:?}", outcome.dropped));
                }
                if outcome.suspect {
                    detail.push(format!("suspect (drift {:.1}%)", outcome.drift * 100.0));
                }
                lines.push(format!("- batch {}: {}", outcome.id, detail.join(", ")));
            }
        }

        lines.push(String::new());
        lines.push(format!("Summary: {}", self.summary_line()));
        lines.join("\n")
    }
}
