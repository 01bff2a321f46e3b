/*!
 * End-to-end pipeline tests over a scripted oracle.
 */

use std::sync::Arc;

use doctrans::app_controller::Controller;
use doctrans::oracle::mock::MockOracle;

use crate::common;

#[tokio::test]
async fn test_pipeline_run_shouldTranslateEveryBatchAndAssemble() {
    let workspace = common::workspace_with_pages(
        &[
            "First paragraph.\n\nSecond paragraph.",
            "Third paragraph.\n\nFourth paragraph.",
        ],
        1,
    );
    common::seed_style_cache(&workspace.config);

    let controller = Controller::with_oracle(workspace.config.clone(), Arc::new(MockOracle::echo()));
    let summary = controller.run().await.unwrap();

    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 0);

    let document = common::read_output(&workspace.config, "translated_document.md");
    assert!(document.contains("[tr] First paragraph."));
    assert!(document.contains("[tr] Fourth paragraph."));
    assert!(common::output_exists(&workspace.config, "report.txt"));
    assert!(common::output_exists(&workspace.config, "glossary.tsv"));
    assert!(common::output_exists(&workspace.config, "batches/batch_001.md"));
    assert!(common::output_exists(&workspace.config, "batches/batch_002.md"));
}

#[tokio::test]
async fn test_pipeline_cachedBatch_shouldSkipDispatchEntirely() {
    // Scenario C: a non-empty artifact exists, so an oracle that panics on
    // invocation must never be triggered.
    let workspace = common::workspace_with_pages(&["Some page text."], 1);
    common::seed_style_cache(&workspace.config);
    common::write_artifact(&workspace.config, 1, "previously translated");

    let controller =
        Controller::with_oracle(workspace.config.clone(), Arc::new(MockOracle::unreachable()));
    let summary = controller.run().await.unwrap();

    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 0);
    let document = common::read_output(&workspace.config, "translated_document.md");
    assert!(document.contains("previously translated"));
}

#[tokio::test]
async fn test_pipeline_rerun_shouldBeIdempotent() {
    let workspace = common::workspace_with_pages(&["Alpha beta.", "Gamma delta."], 1);
    common::seed_style_cache(&workspace.config);

    let first = Controller::with_oracle(workspace.config.clone(), Arc::new(MockOracle::echo()));
    first.run().await.unwrap();
    let artifact_one = common::read_output(&workspace.config, "batches/batch_001.md");
    let body_one = common::read_output(&workspace.config, "translated_document.md")
        .split_once("---")
        .map(|(_, body)| body.to_string())
        .unwrap();

    // Second run: every batch is cached, so the oracle must not be touched
    // and the output must not change.
    let second =
        Controller::with_oracle(workspace.config.clone(), Arc::new(MockOracle::unreachable()));
    let summary = second.run().await.unwrap();

    assert_eq!(summary.succeeded, 2);
    assert_eq!(
        common::read_output(&workspace.config, "batches/batch_001.md"),
        artifact_one
    );
    let body_two = common::read_output(&workspace.config, "translated_document.md")
        .split_once("---")
        .map(|(_, body)| body.to_string())
        .unwrap();
    assert_eq!(body_one, body_two);
}

#[tokio::test]
async fn test_pipeline_oracleFailure_shouldFailBatchAndContinue() {
    // Scenario D: the oracle fails three consecutive attempts on batch 1,
    // then recovers for batch 2.
    let workspace = common::workspace_with_pages(&["Doomed batch.", "Healthy batch."], 1);
    common::seed_style_cache(&workspace.config);

    let oracle = Arc::new(MockOracle::failing_times(3));
    let counter = oracle.call_counter();
    let controller = Controller::with_oracle(workspace.config.clone(), oracle);
    let summary = controller.run().await.unwrap();

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.succeeded, 1);
    // Three attempts for batch 1, one for batch 2.
    assert_eq!(counter.load(std::sync::atomic::Ordering::SeqCst), 4);

    let report = common::read_output(&workspace.config, "report.txt");
    assert!(report.contains("batch 1"));
    assert!(report.contains("Failed: 1"));

    let retry: serde_json::Value =
        serde_json::from_str(&common::read_output(&workspace.config, "retry.json")).unwrap();
    assert_eq!(retry["failed_batches"], serde_json::json!([1]));

    // The failed batch leaves a visible placeholder, not a silent gap.
    let document = common::read_output(&workspace.config, "translated_document.md");
    assert!(document.contains("Batch 1 is unavailable"));
    assert!(document.contains("[tr] Healthy batch."));
}

#[tokio::test]
async fn test_pipeline_stitching_shouldCompleteTrailingSentence() {
    // Scenario A at pipeline level: batch 1 ends mid-sentence and borrows
    // the completion from the start of batch 2.
    let workspace = common::workspace_with_pages(&["Hello there", " world. More text here."], 1);
    common::seed_style_cache(&workspace.config);

    let controller = Controller::with_oracle(workspace.config.clone(), Arc::new(MockOracle::echo()));
    controller.run().await.unwrap();

    let artifact = common::read_output(&workspace.config, "batches/batch_001.md");
    assert_eq!(artifact, "[tr] Hello there world.");
}

#[tokio::test]
async fn test_pipeline_emptyBatch_shouldCompleteWithoutDispatch() {
    // Page 2 contains only whitespace, so batch 2 yields zero segments and
    // must not reach the oracle at all.
    let workspace = common::workspace_with_pages(&["Real text here.", "   \n \n  "], 1);
    common::seed_style_cache(&workspace.config);

    let oracle = Arc::new(MockOracle::echo());
    let counter = oracle.call_counter();
    let controller = Controller::with_oracle(workspace.config.clone(), oracle);
    let summary = controller.run().await.unwrap();

    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 0);
    assert_eq!(counter.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_pipeline_untaggedResponse_shouldFailBatchAsEmptyResult() {
    // The oracle answers with prose but no index tags: nothing usable
    // survives stripping, which is a hard failure rather than a warning.
    let workspace = common::workspace_with_pages(&["Some real prose."], 1);
    common::seed_style_cache(&workspace.config);

    let oracle = doctrans::oracle::mock::MockOracle::new(
        doctrans::oracle::mock::MockBehavior::Untagged,
    );
    let controller = Controller::with_oracle(workspace.config.clone(), Arc::new(oracle));
    let summary = controller.run().await.unwrap();

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.succeeded, 0);
    let report = common::read_output(&workspace.config, "report.txt");
    assert!(report.contains("no usable text"));
}

#[tokio::test]
async fn test_pipeline_retranslateSuspect_shouldRescanPersistedBatches() {
    // The persisted artifact has far fewer paragraphs than its cached raw
    // text, so the drift rescan flags it and redoes it.
    let workspace = common::workspace_with_pages(&["Seed page."], 1);
    common::seed_style_cache(&workspace.config);
    common::write_raw_cache(
        &workspace.config,
        1,
        "One.\n\nTwo.\n\nThree.\n\nFour.\n\nFive.\n\nSix.",
    );
    common::write_artifact(&workspace.config, 1, "only one\n\nand two");

    let controller = Controller::with_oracle(workspace.config.clone(), Arc::new(MockOracle::echo()));
    let summary = controller.retranslate_suspect().await.unwrap();

    assert_eq!(summary.succeeded, 1);
    assert!(common::output_exists(&workspace.config, "batches/batch_001.md.backup"));
    let artifact = common::read_output(&workspace.config, "batches/batch_001.md");
    assert!(artifact.contains("[tr] One."));
    assert!(artifact.contains("[tr] Six."));
}

#[tokio::test]
async fn test_pipeline_glossary_shouldLearnNewTermsAndProtectConfigured() {
    let workspace = common::workspace_with_pages(&["Khun Anurak visited Chiang Mai."], 1);
    common::seed_style_cache(&workspace.config);

    let mut config = workspace.config.clone();
    config
        .glossary
        .insert("Khun".to_string(), "Khun".to_string());

    // The oracle proposes one genuinely new term and one clash with the
    // preconfigured rendering.
    let oracle = MockOracle::echo().with_term_block(vec![
        ("Chiang Mai".to_string(), "Chiang Mai".to_string()),
        ("Khun".to_string(), "Mr.".to_string()),
    ]);

    let controller = Controller::with_oracle(config.clone(), Arc::new(oracle));
    controller.run().await.unwrap();

    let glossary = common::read_output(&config, "glossary.tsv");
    assert!(glossary.contains("Chiang Mai\tChiang Mai"));
    assert!(glossary.contains("Khun\tKhun"));
    assert!(!glossary.contains("Mr."));
}

#[tokio::test]
async fn test_pipeline_droppedSegments_shouldCompleteWithWarnings() {
    let workspace = common::workspace_with_pages(
        &["One.\n\nTwo.\n\nThree.\n\nFour.\n\nFive.\n\nSix."],
        8,
    );
    common::seed_style_cache(&workspace.config);

    let oracle = MockOracle::dropping(vec![3]);
    let controller = Controller::with_oracle(workspace.config.clone(), Arc::new(oracle));
    let summary = controller.run().await.unwrap();

    // Dropped segment is a defect, not a failure: the batch is kept.
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 0);

    let artifact = common::read_output(&workspace.config, "batches/batch_001.md");
    assert!(!artifact.contains("Three."));
    assert!(artifact.contains("[tr] Four."));

    let report = common::read_output(&workspace.config, "report.txt");
    assert!(report.contains("dropped [3]"));
}

#[tokio::test]
async fn test_pipeline_retranslate_shouldBackUpPriorArtifact() {
    let workspace = common::workspace_with_pages(&["Stable sentence."], 1);
    common::seed_style_cache(&workspace.config);

    let first = Controller::with_oracle(workspace.config.clone(), Arc::new(MockOracle::echo()));
    first.run().await.unwrap();
    let original = common::read_output(&workspace.config, "batches/batch_001.md");

    let redo = Controller::with_oracle(workspace.config.clone(), Arc::new(MockOracle::echo()));
    let summary = redo.retranslate(&[1]).await.unwrap();

    assert_eq!(summary.succeeded, 1);
    let backup = common::read_output(&workspace.config, "batches/batch_001.md.backup");
    assert_eq!(backup, original);
    assert!(common::output_exists(&workspace.config, "batches/batch_001.md"));
}

#[tokio::test]
async fn test_pipeline_assemble_shouldRebuildFromArtifactsWithoutOracle() {
    let workspace = common::workspace_with_pages(&["Page one.", "Page two."], 1);
    common::write_artifact(&workspace.config, 1, "first part");
    common::write_artifact(&workspace.config, 2, "second part");

    let controller =
        Controller::with_oracle(workspace.config.clone(), Arc::new(MockOracle::unreachable()));
    let path = controller.assemble().unwrap();

    let document = std::fs::read_to_string(path).unwrap();
    assert!(document.contains("first part"));
    assert!(document.contains("second part"));
}
