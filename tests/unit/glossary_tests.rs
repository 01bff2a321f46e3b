/*!
 * Tests for glossary persistence and merge monotonicity
 */

use std::collections::BTreeMap;
use tempfile::TempDir;

use doctrans::translation::GlossaryStore;
use doctrans::translation::glossary::TermOrigin;

#[test]
fn test_glossaryStore_saveAndLoad_shouldRoundTripSorted() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("glossary.tsv");

    let mut store = GlossaryStore::new();
    store.merge_learned("Zeta", "Z");
    store.merge_learned("Alpha", "A");
    store.save(&path).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content, "Alpha\tA\nZeta\tZ");

    let reloaded = GlossaryStore::load(&path).unwrap();
    assert_eq!(reloaded.len(), 2);
    assert_eq!(reloaded.get("Alpha").unwrap().target, "A");
}

#[test]
fn test_glossaryStore_load_withMissingFile_shouldBeEmpty() {
    let dir = TempDir::new().unwrap();
    let store = GlossaryStore::load(&dir.path().join("absent.tsv")).unwrap();
    assert!(store.is_empty());
}

#[test]
fn test_glossaryStore_monotonicity_acrossSaveLoadMerge_shouldHold() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("glossary.tsv");

    let mut store = GlossaryStore::new();
    store.merge_learned("Phi", "Phi-first");
    store.save(&path).unwrap();

    // A later run reloads and tries to relearn the term differently.
    let mut reloaded = GlossaryStore::load(&path).unwrap();
    assert!(!reloaded.merge_learned("Phi", "Phi-second"));
    assert_eq!(reloaded.get("Phi").unwrap().target, "Phi-first");
}

#[test]
fn test_glossaryStore_seed_afterLoad_shouldRestorePreconfiguredPriority() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("glossary.tsv");

    // A prior run learned a rendering the operator has since pinned down.
    let mut store = GlossaryStore::new();
    store.merge_learned("Ajarn", "professor");
    store.save(&path).unwrap();

    let mut configured = BTreeMap::new();
    configured.insert("Ajarn".to_string(), "Ajarn".to_string());

    let mut reloaded = GlossaryStore::load(&path).unwrap();
    reloaded.seed(&configured);

    let entry = reloaded.get("Ajarn").unwrap();
    assert_eq!(entry.target, "Ajarn");
    assert_eq!(entry.origin, TermOrigin::Preconfigured);

    // And learning can never displace it again.
    assert!(!reloaded.merge_learned("Ajarn", "teacher"));
    assert_eq!(reloaded.get("Ajarn").unwrap().target, "Ajarn");
}

#[test]
fn test_glossaryStore_mergeResponse_shouldOnlyAddNewTerms() {
    let mut store = GlossaryStore::new();
    store.merge_learned("Bangkok", "Bangkok");

    let response = "<s1>done</s1>\n```glossary\nBangkok\u{21e2}Krung Thep\nChiang Mai\u{21e2}Chiang Mai\n```";
    let added = store.merge_response(response);

    assert_eq!(added, 1);
    assert_eq!(store.get("Bangkok").unwrap().target, "Bangkok");
    assert_eq!(store.get("Chiang Mai").unwrap().target, "Chiang Mai");
}
