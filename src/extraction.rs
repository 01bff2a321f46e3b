/*!
 * Input collaborator contract.
 *
 * The pipeline never parses source documents itself. It consumes text that
 * an upstream extractor has already produced, through the `PageSource`
 * trait: pages with paragraph breaks preserved, addressed by `[start, end)`
 * page ranges. The bundled implementation reads a plain-text file with
 * form-feed page separators, which is what common PDF text extractors emit.
 */

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

use crate::errors::BatchError;

/// A provider of raw source text, addressed by page range.
pub trait PageSource: Send + Sync {
    /// Total number of pages available.
    fn page_count(&self) -> usize;

    /// Concatenated raw text for the half-open 1-based page range
    /// `[start, end)`, paragraph breaks preserved.
    fn text_for_range(&self, start: usize, end: usize) -> Result<String, BatchError>;
}

/// Page source backed by pre-extracted plain text with form-feed
/// page separators.
pub struct PlainTextSource {
    pages: Vec<String>,
    fingerprint: String,
}

impl PlainTextSource {
    /// Load a source text file from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read source text: {}", path.display()))?;
        if text.trim().is_empty() {
            anyhow::bail!("Source text is empty: {}", path.display());
        }
        Ok(Self::from_text(&text))
    }

    /// Build a source from in-memory text. Pages are split on form feeds;
    /// a trailing empty page from a final separator is discarded.
    pub fn from_text(text: &str) -> Self {
        let mut pages: Vec<String> = text.split('\u{c}').map(|p| p.to_string()).collect();
        if pages.last().is_some_and(|p| p.is_empty()) {
            pages.pop();
        }

        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        let fingerprint = format!("{:x}", hasher.finalize());

        Self { pages, fingerprint }
    }

    /// Content fingerprint of the whole source, used to invalidate stale
    /// raw-text caches.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

impl PageSource for PlainTextSource {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn text_for_range(&self, start: usize, end: usize) -> Result<String, BatchError> {
        if start == 0 || start >= end || end > self.pages.len() + 1 {
            return Err(BatchError::Extraction(format!(
                "page range [{start}, {end}) out of bounds for {} pages",
                self.pages.len()
            )));
        }
        Ok(self.pages[(start - 1)..(end - 1)].join("\n\n"))
    }
}
