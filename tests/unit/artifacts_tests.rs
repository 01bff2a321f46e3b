/*!
 * Tests for the batch artifact store
 */

use doctrans::translation::ArtifactStore;
use tempfile::TempDir;

fn store() -> (TempDir, ArtifactStore) {
    let dir = TempDir::new().unwrap();
    let store = ArtifactStore::new(dir.path()).unwrap();
    (dir, store)
}

#[test]
fn test_artifactStore_cachedArtifact_withNonEmptyContent_shouldBeTrusted() {
    let (_dir, store) = store();
    store.store_artifact(3, "translated text").unwrap();
    assert_eq!(store.cached_artifact(3), Some("translated text".to_string()));
}

#[test]
fn test_artifactStore_cachedArtifact_withEmptyContent_shouldNotBeTrusted() {
    let (_dir, store) = store();
    store.store_artifact(3, "").unwrap();
    assert_eq!(store.cached_artifact(3), None);
    assert!(store.artifact_exists(3));
}

#[test]
fn test_artifactStore_cachedArtifact_withWhitespaceOnly_shouldNotBeTrusted() {
    let (_dir, store) = store();
    store.store_artifact(5, "  \n \n").unwrap();
    assert_eq!(store.cached_artifact(5), None);
}

#[test]
fn test_artifactStore_backupArtifact_shouldRenameNotDelete() {
    let (dir, store) = store();
    store.store_artifact(7, "first version").unwrap();

    assert!(store.backup_artifact(7).unwrap());

    assert_eq!(store.cached_artifact(7), None);
    let backup = dir.path().join("batches/batch_007.md.backup");
    assert_eq!(
        std::fs::read_to_string(backup).unwrap(),
        "first version"
    );
}

#[test]
fn test_artifactStore_backupArtifact_withNoArtifact_shouldReportFalse() {
    let (_dir, store) = store();
    assert!(!store.backup_artifact(1).unwrap());
}

#[test]
fn test_artifactStore_rawCache_shouldRoundTrip() {
    let (_dir, store) = store();
    store.store_raw(2, "raw page text").unwrap();
    assert_eq!(store.cached_raw(2), Some("raw page text".to_string()));
    assert_eq!(store.cached_raw(9), None);
}

#[test]
fn test_artifactStore_checkFingerprint_withSameFingerprint_shouldKeepRawCache() {
    let (_dir, store) = store();
    store.check_fingerprint("abc123").unwrap();
    store.store_raw(1, "cached text").unwrap();

    store.check_fingerprint("abc123").unwrap();
    assert_eq!(store.cached_raw(1), Some("cached text".to_string()));
}

#[test]
fn test_artifactStore_checkFingerprint_withChangedSource_shouldClearRawCache() {
    let (_dir, store) = store();
    store.check_fingerprint("abc123").unwrap();
    store.store_raw(1, "stale text").unwrap();

    store.check_fingerprint("def456").unwrap();
    assert_eq!(store.cached_raw(1), None);
}

#[test]
fn test_artifactStore_checkFingerprint_shouldNotTouchTranslatedArtifacts() {
    let (_dir, store) = store();
    store.check_fingerprint("abc123").unwrap();
    store.store_artifact(1, "translated").unwrap();

    store.check_fingerprint("def456").unwrap();
    assert_eq!(store.cached_artifact(1), Some("translated".to_string()));
}

#[test]
fn test_artifactStore_persistedBatchIds_shouldBeSortedAndFiltered() {
    let (dir, store) = store();
    store.store_artifact(12, "b").unwrap();
    store.store_artifact(3, "a").unwrap();
    std::fs::write(dir.path().join("batches/notes.txt"), "ignore me").unwrap();

    assert_eq!(store.persisted_batch_ids(), vec![3, 12]);
}

#[test]
fn test_artifactStore_styleCache_shouldRoundTrip() {
    let (_dir, store) = store();
    assert_eq!(store.load_style(), None);
    store.save_style("dry, ironic voice").unwrap();
    assert_eq!(store.load_style(), Some("dry, ironic voice".to_string()));
}
