/*!
 * Batch-level caching and resumability.
 *
 * Every completed batch is durably persisted before the run advances, so a
 * multi-hour run can be stopped between batches and resumed. Raw extracted
 * text is cached separately from translated output, keyed by batch id;
 * a translated artifact is trusted only when non-empty, and explicit
 * retranslation renames the prior artifact to a backup instead of
 * deleting it.
 */

use anyhow::{Context, Result};
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

static ARTIFACT_NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^batch_(\d{3})\.md$").unwrap());

/// On-disk layout of a run's artifacts under one output directory.
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Open (and bootstrap) the artifact tree under `root`.
    pub fn new(root: &Path) -> Result<Self> {
        let store = Self {
            root: root.to_path_buf(),
        };
        fs::create_dir_all(store.raw_dir())
            .with_context(|| format!("Failed to create {}", store.raw_dir().display()))?;
        fs::create_dir_all(store.batches_dir())
            .with_context(|| format!("Failed to create {}", store.batches_dir().display()))?;
        Ok(store)
    }

    fn raw_dir(&self) -> PathBuf {
        self.root.join("raw")
    }

    fn batches_dir(&self) -> PathBuf {
        self.root.join("batches")
    }

    fn raw_path(&self, id: usize) -> PathBuf {
        self.raw_dir().join(format!("batch_{id:03}_source.txt"))
    }

    fn artifact_path(&self, id: usize) -> PathBuf {
        self.batches_dir().join(format!("batch_{id:03}.md"))
    }

    fn fingerprint_path(&self) -> PathBuf {
        self.raw_dir().join("source.fingerprint")
    }

    /// Path of the persisted glossary.
    pub fn glossary_path(&self) -> PathBuf {
        self.root.join("glossary.tsv")
    }

    /// Path of the cached style profile.
    pub fn style_path(&self) -> PathBuf {
        self.root.join("style_profile.txt")
    }

    /// Path of the quality report.
    pub fn report_path(&self) -> PathBuf {
        self.root.join("report.txt")
    }

    /// Path of the auto-generated retry scope.
    pub fn retry_scope_path(&self) -> PathBuf {
        self.root.join("retry.json")
    }

    /// Path of the assembled document.
    pub fn document_path(&self, document_name: &str) -> PathBuf {
        self.root.join(document_name)
    }

    /// Cached raw text for a batch, if present and non-empty.
    pub fn cached_raw(&self, id: usize) -> Option<String> {
        read_non_empty(&self.raw_path(id))
    }

    /// Persist a batch's raw text.
    pub fn store_raw(&self, id: usize, text: &str) -> Result<()> {
        let path = self.raw_path(id);
        fs::write(&path, text).with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Cached translated artifact for a batch. Only a non-empty artifact
    /// is trusted; an empty or unreadable one forces full retranslation.
    pub fn cached_artifact(&self, id: usize) -> Option<String> {
        read_non_empty(&self.artifact_path(id))
    }

    /// Whether any artifact file exists for a batch, even an empty one.
    /// Empty artifacts are legitimate for batches with no input text.
    pub fn artifact_exists(&self, id: usize) -> bool {
        self.artifact_path(id).exists()
    }

    /// Persist a batch's translated artifact.
    pub fn store_artifact(&self, id: usize, text: &str) -> Result<()> {
        let path = self.artifact_path(id);
        fs::write(&path, text).with_context(|| format!("Failed to write {}", path.display()))?;
        debug!("Artifact stored: {}", path.display());
        Ok(())
    }

    /// Rename a batch's artifact to its backup sibling, superseding it.
    /// Returns true when there was an artifact to back up. An existing
    /// backup is replaced.
    pub fn backup_artifact(&self, id: usize) -> Result<bool> {
        let path = self.artifact_path(id);
        if !path.exists() {
            return Ok(false);
        }
        let backup = path.with_extension("md.backup");
        fs::rename(&path, &backup)
            .with_context(|| format!("Failed to back up {}", path.display()))?;
        info!("Prior artifact backed up: {}", backup.display());
        Ok(true)
    }

    /// Compare the stored source fingerprint with the current one. On
    /// mismatch the raw-text caches are stale and get cleared; translated
    /// artifacts are left untouched for explicit retranslation.
    pub fn check_fingerprint(&self, fingerprint: &str) -> Result<()> {
        let path = self.fingerprint_path();
        let stored = fs::read_to_string(&path).ok();

        if stored.as_deref() == Some(fingerprint) {
            return Ok(());
        }

        if stored.is_some() {
            warn!("Source text changed since last run, clearing raw-text caches");
            for entry in fs::read_dir(self.raw_dir())? {
                let entry = entry?;
                if entry.file_name() != "source.fingerprint" {
                    fs::remove_file(entry.path())?;
                }
            }
        }

        fs::write(&path, fingerprint)
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Ids of all persisted translated artifacts, sorted ascending.
    pub fn persisted_batch_ids(&self) -> Vec<usize> {
        let mut ids: Vec<usize> = WalkDir::new(self.batches_dir())
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().to_string();
                ARTIFACT_NAME_REGEX
                    .captures(&name)
                    .and_then(|caps| caps.get(1))
                    .and_then(|m| m.as_str().parse().ok())
            })
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Cached style profile, if present and non-empty.
    pub fn load_style(&self) -> Option<String> {
        read_non_empty(&self.style_path())
    }

    /// Cache the style profile.
    pub fn save_style(&self, profile: &str) -> Result<()> {
        let path = self.style_path();
        fs::write(&path, profile).with_context(|| format!("Failed to write {}", path.display()))
    }
}

fn read_non_empty(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(content) if !content.trim().is_empty() => Some(content),
        Ok(_) => None,
        Err(_) => None,
    }
}
