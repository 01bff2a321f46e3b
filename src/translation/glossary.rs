/*!
 * Glossary consistency store.
 *
 * Terminology must stay consistent across thousands of independent oracle
 * calls. The store holds the shared source -> target mapping, read by every
 * dispatch and extended from the fenced term blocks the oracle proposes.
 * Merge rule: first-writer-wins. Preconfigured terms are seeded over
 * whatever was loaded from disk and can never be displaced by learning.
 */

use anyhow::{Context, Result};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

// Fenced block of proposed terms in an oracle response.
static TERM_BLOCK_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```glossary(.*?)```").unwrap());

/// How a glossary entry came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermOrigin {
    /// Declared in the run configuration; always wins
    Preconfigured,
    /// Proposed by the oracle during the run
    Learned,
}

/// One glossary mapping.
#[derive(Debug, Clone)]
pub struct GlossaryEntry {
    /// Target-language rendering
    pub target: String,

    /// Where the mapping came from
    pub origin: TermOrigin,
}

/// The shared term map. Single writer, single reader per run.
#[derive(Debug, Default)]
pub struct GlossaryStore {
    entries: BTreeMap<String, GlossaryEntry>,
}

impl GlossaryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store from a TSV file of `source<TAB>target` lines. Entries
    /// loaded from disk count as learned. A missing file yields an empty
    /// store.
    pub fn load(path: &Path) -> Result<Self> {
        let mut store = Self::new();
        if !path.exists() {
            return Ok(store);
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read glossary: {}", path.display()))?;
        for line in content.lines() {
            if let Some((source, target)) = line.split_once('\t') {
                store.insert(source, target, TermOrigin::Learned);
            }
        }
        debug!("Glossary loaded, {} entries", store.len());
        Ok(store)
    }

    /// Persist the store as sorted `source<TAB>target` lines.
    pub fn save(&self, path: &Path) -> Result<()> {
        let lines: Vec<String> = self
            .entries
            .iter()
            .map(|(source, entry)| format!("{source}\t{}", entry.target))
            .collect();
        fs::write(path, lines.join("\n"))
            .with_context(|| format!("Failed to write glossary: {}", path.display()))
    }

    /// Seed preconfigured terms. These overwrite anything already present
    /// and are immune to later merges.
    pub fn seed(&mut self, terms: &BTreeMap<String, String>) {
        for (source, target) in terms {
            self.entries.insert(
                source.clone(),
                GlossaryEntry {
                    target: target.clone(),
                    origin: TermOrigin::Preconfigured,
                },
            );
        }
    }

    /// Merge one learned term. Returns true if it was added; an existing
    /// key is never overwritten.
    pub fn merge_learned(&mut self, source: &str, target: &str) -> bool {
        let source = source.trim();
        let target = target.trim();
        if source.is_empty() || target.is_empty() {
            return false;
        }
        if let Some(existing) = self.entries.get(source) {
            if existing.target != target {
                warn!(
                    "Glossary conflict for '{}': keeping '{}', ignoring '{}'",
                    source, existing.target, target
                );
            }
            return false;
        }
        self.insert(source, target, TermOrigin::Learned);
        true
    }

    /// Merge every term proposed in the fenced glossary blocks of an
    /// oracle response. Lines use `source⇢target` or `source<TAB>target`.
    /// Returns how many new terms were added.
    pub fn merge_response(&mut self, response: &str) -> usize {
        let mut added = 0;
        for block in TERM_BLOCK_REGEX.captures_iter(response) {
            let Some(body) = block.get(1) else { continue };
            for line in body.as_str().lines() {
                let pair = line
                    .split_once('\u{21e2}')
                    .or_else(|| line.split_once('\t'));
                if let Some((source, target)) = pair {
                    if self.merge_learned(source, target) {
                        added += 1;
                    }
                }
            }
        }
        added
    }

    /// Rendering of the store for the oracle instructions: sorted
    /// `source<TAB>target` lines.
    pub fn prompt_block(&self) -> String {
        self.entries
            .iter()
            .map(|(source, entry)| format!("{source}\t{}", entry.target))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Target rendering for a source term, if present.
    pub fn get(&self, source: &str) -> Option<&GlossaryEntry> {
        self.entries.get(source)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, source: &str, target: &str, origin: TermOrigin) {
        self.entries.insert(
            source.trim().to_string(),
            GlossaryEntry {
                target: target.trim().to_string(),
                origin,
            },
        );
    }
}
