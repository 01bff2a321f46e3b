use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::ops::Range;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::Config;
use crate::extraction::{PageSource, PlainTextSource};
use crate::language_utils;
use crate::oracle::Oracle;
use crate::oracle::chat::ChatOracle;
use crate::translation::batch::{self, Batch, BatchStatus};
use crate::translation::report::BatchOutcome;
use crate::translation::style::StyleProfile;
use crate::translation::{
    ArtifactStore, Dispatcher, GlossaryStore, QualityReporter, RetryPolicy, Segmenter, Stitcher,
    Validator,
};

// @module: Application controller for the batch translation pipeline

/// Counts and artifact locations for a finished run.
#[derive(Debug)]
pub struct RunSummary {
    /// Batches that produced a usable artifact
    pub succeeded: usize,

    /// Batches that failed terminally
    pub failed: usize,

    /// Batches accepted with a suspect flag
    pub suspect: usize,

    /// The assembled document
    pub document_path: PathBuf,
}

// Pipeline collaborators shared by every batch of one run.
struct PipelineCtx<'a> {
    source: &'a PlainTextSource,
    store: &'a ArtifactStore,
    dispatcher: &'a Dispatcher,
    validator: &'a Validator,
    stitcher: &'a Stitcher,
}

/// Main application controller for document translation
pub struct Controller {
    // @field: Run configuration
    config: Config,

    // @field: Injected oracle handle
    oracle: Arc<dyn Oracle>,
}

impl Controller {
    // @method: Create a controller with the production chat oracle
    pub fn new(config: Config) -> Self {
        let oracle = Arc::new(ChatOracle::new(&config.oracle));
        Self::with_oracle(config, oracle)
    }

    // @method: Create a controller with an injected oracle (tests)
    pub fn with_oracle(config: Config, oracle: Arc<dyn Oracle>) -> Self {
        Self { config, oracle }
    }

    fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(
            self.oracle.clone(),
            RetryPolicy::from(&self.config.retry),
            self.config.oracle.temperature,
        )
    }

    /// Run (or resume) a full translation over every planned batch.
    pub async fn run(&self) -> Result<RunSummary> {
        let source = PlainTextSource::from_path(&self.config.source_text)?;
        let store = ArtifactStore::new(&self.config.output_dir)?;
        store.check_fingerprint(source.fingerprint())?;

        let mut batches = batch::plan_batches(source.page_count(), self.config.pages_per_batch);
        info!(
            "Translating {} pages in {} batches of up to {} pages",
            source.page_count(),
            batches.len(),
            self.config.pages_per_batch
        );

        let summary = self
            .process_batches(&source, &store, &mut batches, false)
            .await?;

        Ok(summary)
    }

    /// Retranslate an explicit list of batch ids. Prior artifacts are
    /// renamed to backups, never deleted.
    pub async fn retranslate(&self, ids: &[usize]) -> Result<RunSummary> {
        let source = PlainTextSource::from_path(&self.config.source_text)?;
        let store = ArtifactStore::new(&self.config.output_dir)?;
        store.check_fingerprint(source.fingerprint())?;

        let mut requested: Vec<usize> = ids.to_vec();
        requested.sort_unstable();
        requested.dedup();

        let mut batches = batch::plan_batches(source.page_count(), self.config.pages_per_batch);
        let total_planned = batches.len();
        for id in &requested {
            if *id == 0 || *id > total_planned {
                warn!("Ignoring batch id {id}: the source plans {total_planned} batches");
            }
        }
        batches.retain(|b| requested.contains(&b.id));
        if batches.is_empty() {
            info!("Nothing to retranslate");
            return Ok(RunSummary {
                succeeded: 0,
                failed: 0,
                suspect: 0,
                document_path: store.document_path(&self.config.document_name),
            });
        }

        info!("Retranslating {} batches: {:?}", batches.len(), requested);
        for b in &batches {
            store.backup_artifact(b.id)?;
        }

        self.process_batches(&source, &store, &mut batches, true)
            .await
    }

    /// Rescan persisted batches for paragraph-count drift and retranslate
    /// the suspect ones.
    pub async fn retranslate_suspect(&self) -> Result<RunSummary> {
        let store = ArtifactStore::new(&self.config.output_dir)?;
        let suspects = self.find_suspect_batches(&store);
        if suspects.is_empty() {
            info!("No suspect batches found");
            return Ok(RunSummary {
                succeeded: 0,
                failed: 0,
                suspect: 0,
                document_path: store.document_path(&self.config.document_name),
            });
        }
        info!("Found {} suspect batches: {:?}", suspects.len(), suspects);
        self.retranslate(&suspects).await
    }

    /// Regenerate the assembled document from existing artifacts, without
    /// any oracle calls.
    pub fn assemble(&self) -> Result<PathBuf> {
        let store = ArtifactStore::new(&self.config.output_dir)?;
        let total = match PlainTextSource::from_path(&self.config.source_text) {
            Ok(source) => {
                batch::plan_batches(source.page_count(), self.config.pages_per_batch).len()
            }
            Err(_) => store.persisted_batch_ids().into_iter().max().unwrap_or(0),
        };
        self.assemble_document(&store, total)
    }

    // Sequential batch loop. Batches run strictly in increasing id order;
    // glossary updates from batch K are visible to batch K+1.
    async fn process_batches(
        &self,
        source: &PlainTextSource,
        store: &ArtifactStore,
        batches: &mut [Batch],
        skip_report: bool,
    ) -> Result<RunSummary> {
        let dispatcher = self.dispatcher();
        let validator = Validator::new(&self.config.validation);
        let stitcher = Stitcher::new(self.config.stitching.max_borrow);
        let ctx = PipelineCtx {
            source,
            store,
            dispatcher: &dispatcher,
            validator: &validator,
            stitcher: &stitcher,
        };

        let mut glossary = GlossaryStore::load(&store.glossary_path())?;
        glossary.seed(&self.config.glossary);
        let mut style: Option<StyleProfile> = None;
        let mut reporter = QualityReporter::new();

        let progress = ProgressBar::new(batches.len() as u64);
        progress.set_style(
            ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        let next_ranges: Vec<Option<Range<usize>>> = (0..batches.len())
            .map(|i| batches.get(i + 1).map(|b| b.source_range.clone()))
            .collect();

        for (i, batch) in batches.iter_mut().enumerate() {
            progress.set_message(format!("batch {}", batch.id));
            let outcome = self
                .process_batch(&ctx, batch, next_ranges[i].clone(), &mut glossary, &mut style)
                .await;

            // Cache hits are free; everything else touched the oracle and
            // respects the inter-batch throttle.
            if outcome.status != BatchStatus::Cached && self.config.throttle_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.config.throttle_ms)).await;
            }

            progress.inc(1);
            reporter.record(outcome);
        }
        progress.finish_and_clear();

        glossary
            .save(&store.glossary_path())
            .context("Failed to persist glossary")?;

        if !skip_report {
            std::fs::write(store.report_path(), reporter.render())
                .context("Failed to write quality report")?;
            let failed = reporter.failed_ids();
            if failed.is_empty() {
                let _ = std::fs::remove_file(store.retry_scope_path());
            } else {
                let scope = serde_json::to_string_pretty(&reporter.retry_scope())?;
                std::fs::write(store.retry_scope_path(), scope)
                    .context("Failed to write retry scope")?;
                warn!("Failed batches recorded for retry: {:?}", failed);
            }
        }

        let total_planned =
            batch::plan_batches(source.page_count(), self.config.pages_per_batch).len();
        let document_path = self.assemble_document(store, total_planned)?;

        info!("Run finished: {}", reporter.summary_line());
        Ok(RunSummary {
            succeeded: reporter.succeeded_count(),
            failed: reporter.failed_ids().len(),
            suspect: reporter.suspect_ids().len(),
            document_path,
        })
    }

    // One batch through the pipeline: cache check, extraction, stitching,
    // segmentation, dispatch, validation, glossary merge, persistence.
    async fn process_batch(
        &self,
        ctx: &PipelineCtx<'_>,
        batch: &mut Batch,
        next_range: Option<Range<usize>>,
        glossary: &mut GlossaryStore,
        style: &mut Option<StyleProfile>,
    ) -> BatchOutcome {
        let id = batch.id;

        if ctx.store.cached_artifact(id).is_some() {
            batch.status = BatchStatus::Cached;
            info!("Batch {id}: cached artifact reused, dispatch skipped");
            return BatchOutcome {
                id,
                status: BatchStatus::Cached,
                missing: Vec::new(),
                dropped: Vec::new(),
                drift: 0.0,
                suspect: false,
                note: Some("reused cached artifact".to_string()),
            };
        }

        batch.status = BatchStatus::InProgress;
        let (start, end) = (batch.source_range.start, batch.source_range.end);
        info!("Batch {id}: pages {}-{}", start, end - 1);

        let mut raw = match ctx.store.cached_raw(id) {
            Some(text) => text,
            None => match ctx.source.text_for_range(start, end) {
                Ok(text) => {
                    if let Err(error) = ctx.store.store_raw(id, &text) {
                        warn!("Batch {id}: failed to cache raw text: {error}");
                    }
                    text
                }
                Err(error) => {
                    batch.status = BatchStatus::Failed;
                    error!("Batch {id}: extraction failed: {error}");
                    return BatchOutcome::failed(id, error.to_string());
                }
            },
        };

        if let Some(next) = next_range {
            match self.next_batch_preview(ctx, id + 1, &next) {
                Some(preview) => raw = ctx.stitcher.stitch(&raw, &preview),
                None => warn!("Batch {id}: no preview of the next batch, skipping stitching"),
            }
        }

        batch.segments = Segmenter::segment(&raw);
        if batch.segments.is_empty() {
            warn!("Batch {id}: no segments in input, nothing to dispatch");
            batch.status = BatchStatus::Completed;
            if let Err(error) = ctx.store.store_artifact(id, "") {
                warn!("Batch {id}: failed to store empty artifact: {error}");
            }
            return BatchOutcome {
                id,
                status: BatchStatus::Completed,
                missing: Vec::new(),
                dropped: Vec::new(),
                drift: 0.0,
                suspect: false,
                note: Some("empty input".to_string()),
            };
        }

        if style.is_none() {
            *style = Some(StyleProfile::load_or_generate(ctx.dispatcher, ctx.store, &raw).await);
        }
        let style_block = style
            .as_ref()
            .map(|profile| profile.text().to_string())
            .unwrap_or_default();

        let instructions = Dispatcher::build_instructions(
            &language_utils::language_name(&self.config.source_language),
            &language_utils::language_name(&self.config.target_language),
            &glossary.prompt_block(),
            &style_block,
        );
        let payload = Segmenter::tagged_payload(&batch.segments);

        let response = match ctx.dispatcher.dispatch(&instructions, &payload).await {
            Ok(text) => text,
            Err(error) => {
                batch.status = BatchStatus::Failed;
                error!("Batch {id}: {error}");
                return BatchOutcome::failed(id, error.to_string());
            }
        };

        let outcome = match ctx.validator.validate(&response, &mut batch.segments) {
            Ok(outcome) => outcome,
            Err(error) => {
                batch.status = BatchStatus::Failed;
                error!("Batch {id}: {error}");
                return BatchOutcome::failed(id, error.to_string());
            }
        };

        let learned = glossary.merge_response(&response);
        if learned > 0 {
            info!("Batch {id}: {learned} new glossary terms");
        }

        if let Err(error) = ctx.store.store_artifact(id, &outcome.cleaned_text) {
            batch.status = BatchStatus::Failed;
            error!("Batch {id}: failed to persist artifact: {error}");
            return BatchOutcome::failed(id, error.to_string());
        }

        // Durable resume point: the glossary lands on disk before the run
        // advances past this batch.
        if let Err(error) = glossary.save(&ctx.store.glossary_path()) {
            warn!("Batch {id}: failed to persist glossary: {error}");
        }

        let status = if outcome.has_defects() {
            warn!(
                "Batch {id}: completed with warnings ({} missing, {} dropped, drift {:.1}%)",
                outcome.missing.len(),
                outcome.dropped.len(),
                outcome.drift * 100.0
            );
            BatchStatus::CompletedWithWarnings
        } else {
            BatchStatus::Completed
        };
        batch.status = status;

        BatchOutcome {
            id,
            status,
            missing: outcome.missing,
            dropped: outcome.dropped,
            drift: outcome.drift,
            suspect: outcome.suspect,
            note: None,
        }
    }

    // Bounded preview of the next batch's raw text, cached for its own
    // turn through the loop.
    fn next_batch_preview(
        &self,
        ctx: &PipelineCtx<'_>,
        next_id: usize,
        next_range: &Range<usize>,
    ) -> Option<String> {
        if let Some(cached) = ctx.store.cached_raw(next_id) {
            return Some(cached);
        }
        match ctx.source.text_for_range(next_range.start, next_range.end) {
            Ok(text) => {
                if let Err(error) = ctx.store.store_raw(next_id, &text) {
                    warn!("Batch {next_id}: failed to cache raw text: {error}");
                }
                Some(text)
            }
            Err(error) => {
                warn!("Batch {next_id}: preview extraction failed: {error}");
                None
            }
        }
    }

    // Recompute paragraph-count drift for every persisted batch from its
    // cached raw text and artifact.
    fn find_suspect_batches(&self, store: &ArtifactStore) -> Vec<usize> {
        let mut suspects = Vec::new();
        for id in store.persisted_batch_ids() {
            let Some(raw) = store.cached_raw(id) else {
                warn!("Batch {id}: no raw text cache, cannot assess drift");
                continue;
            };
            let Some(artifact) = store.cached_artifact(id) else {
                continue;
            };

            let original = Segmenter::segment(&raw).len();
            if original == 0 {
                continue;
            }
            let translated = Segmenter::segment(&artifact).len();
            let diff = original.abs_diff(translated);
            let ratio = diff as f64 / original as f64;

            if ratio > self.config.validation.drift_threshold
                || diff > self.config.validation.dropped_ceiling
            {
                warn!(
                    "Batch {id}: paragraph counts diverge ({original} source vs {translated} translated, {:.1}%)",
                    ratio * 100.0
                );
                suspects.push(id);
            }
        }
        suspects
    }

    // Concatenate artifacts in id order under a fixed header. A batch
    // without an artifact file leaves a visible placeholder.
    fn assemble_document(&self, store: &ArtifactStore, total: usize) -> Result<PathBuf> {
        let mut parts = Vec::new();
        let mut present = 0;
        for id in 1..=total {
            match store.cached_artifact(id) {
                Some(text) => {
                    present += 1;
                    parts.push(text.trim().to_string());
                }
                None if store.artifact_exists(id) => {
                    // Legitimately empty batch; contributes nothing.
                    present += 1;
                }
                None => {
                    parts.push(format!(
                        "> Batch {id} is unavailable: translation failed or was never produced."
                    ));
                }
            }
        }

        let header = format!(
            "# Translated document\n\n> Generated: {} | batches: {present}/{total}\n\n---\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        );
        let body: Vec<String> = parts.into_iter().filter(|p| !p.is_empty()).collect();
        let content = format!("{header}\n{}\n", body.join("\n\n"));

        let path = store.document_path(&self.config.document_name);
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write document: {}", path.display()))?;
        info!("Document assembled: {}", path.display());
        Ok(path)
    }
}
