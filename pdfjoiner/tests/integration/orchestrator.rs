//! The merge action against a shared selection store.

use pdfjoiner::config::{Config, OverwriteMode};
use pdfjoiner::delivery::{DirectorySink, MemorySink};
use pdfjoiner::error::{JoinerError, MERGE_FAILED_MESSAGE, NOT_ENOUGH_FILES_MESSAGE};
use pdfjoiner::merge::Merger;
use pdfjoiner::orchestrator::{MergeOrchestrator, MergeOutcome};
use pdfjoiner::selection::{CandidateFile, PDF_MIME_TYPE, SelectionStore};
use tempfile::TempDir;

use crate::common::{dir_entries, page_labels, pdf_file, write_pdf};

#[tokio::test]
async fn test_browse_and_merge_into_directory() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();

    let store = SelectionStore::new();
    store.browse([
        CandidateFile::from_path(write_pdf(input.path(), "X", 2)),
        CandidateFile::from_path(write_pdf(input.path(), "Y", 3)),
    ]);

    let config = Config {
        output_dir: output.path().to_path_buf(),
        ..Config::default()
    };
    let orchestrator = MergeOrchestrator::from_config(&config, DirectorySink::from_config(&config));

    let outcome = orchestrator.merge(&store).await;

    let report = outcome.report().expect("merge succeeds");
    assert_eq!(report.delivery.file_name, "merged.pdf");
    assert_eq!(dir_entries(output.path()), vec!["merged.pdf"]);

    let bytes = std::fs::read(output.path().join("merged.pdf")).unwrap();
    assert_eq!(page_labels(&bytes), vec!["X-1", "X-2", "Y-1", "Y-2", "Y-3"]);

    // The selection is kept for another merge.
    assert_eq!(store.len(), 2);
    assert!(store.can_merge());
}

#[tokio::test]
async fn test_second_merge_is_renamed() {
    let output = TempDir::new().unwrap();
    let store = SelectionStore::new();
    store.browse([pdf_file("A", 1), pdf_file("B", 1)]);

    let sink = DirectorySink::new(output.path()).with_overwrite_mode(OverwriteMode::Rename);
    let orchestrator = MergeOrchestrator::new(Merger::new(), sink);

    assert!(orchestrator.merge(&store).await.is_success());
    let second = orchestrator.merge(&store).await;

    assert_eq!(
        second.report().unwrap().delivery.file_name,
        "merged (1).pdf"
    );
    assert_eq!(
        dir_entries(output.path()),
        vec!["merged (1).pdf", "merged.pdf"]
    );
}

#[tokio::test]
async fn test_single_file_is_rejected() {
    let store = SelectionStore::new();
    store.drop_files([pdf_file("A", 3)]);
    let orchestrator = MergeOrchestrator::new(Merger::new(), MemorySink::new());

    let outcome = orchestrator.merge(&store).await;

    assert!(matches!(
        outcome.cause(),
        Some(JoinerError::NotEnoughFiles { found: 1, .. })
    ));
    assert!(matches!(outcome, MergeOutcome::Rejected { .. }));
    assert_eq!(outcome.exit_code(), 1);
    assert_eq!(store.error().as_deref(), Some(NOT_ENOUGH_FILES_MESSAGE));
    assert!(!store.is_processing());
    assert!(orchestrator.sink().is_empty());
}

#[tokio::test]
async fn test_failure_then_fix_and_retry() {
    let store = SelectionStore::new();
    store.browse([
        pdf_file("A", 1),
        CandidateFile::from_bytes(
            "broken.pdf",
            PDF_MIME_TYPE,
            b"definitely not a pdf".to_vec(),
        ),
    ]);
    let orchestrator = MergeOrchestrator::new(Merger::new(), MemorySink::new());

    let failed = orchestrator.merge(&store).await;
    assert!(failed.cause().is_some());
    assert_eq!(store.error().as_deref(), Some(MERGE_FAILED_MESSAGE));
    assert_eq!(store.names(), vec!["A.pdf", "broken.pdf"]);
    assert!(orchestrator.sink().is_empty());

    store.remove_file(1).unwrap();
    store.browse([pdf_file("B", 2)]);
    assert_eq!(store.error(), None);

    let succeeded = orchestrator.merge(&store).await;
    assert!(succeeded.is_success());

    let delivered = orchestrator.sink().last().unwrap();
    assert_eq!(page_labels(&delivered.bytes), vec!["A-1", "B-1", "B-2"]);
}

#[tokio::test]
async fn test_no_clobber_failure_surfaces_generic_message() {
    let output = TempDir::new().unwrap();
    std::fs::write(output.path().join("merged.pdf"), b"keep me").unwrap();

    let store = SelectionStore::new();
    store.browse([pdf_file("A", 1), pdf_file("B", 1)]);
    let sink = DirectorySink::new(output.path()).with_overwrite_mode(OverwriteMode::NoClobber);
    let orchestrator = MergeOrchestrator::new(Merger::new(), sink);

    let outcome = orchestrator.merge(&store).await;

    assert_eq!(outcome.exit_code(), 4);
    assert_eq!(store.error().as_deref(), Some(MERGE_FAILED_MESSAGE));
    assert_eq!(
        std::fs::read(output.path().join("merged.pdf")).unwrap(),
        b"keep me"
    );
    assert_eq!(dir_entries(output.path()), vec!["merged.pdf"]);
}

#[tokio::test]
async fn test_store_clones_observe_merge() {
    let store = SelectionStore::new();
    let view = store.clone();
    store.browse([pdf_file("A", 1), pdf_file("B", 1)]);

    let orchestrator = MergeOrchestrator::new(Merger::new().with_read_ahead(4), MemorySink::new());
    let mut saw_processing = false;
    let outcome = orchestrator
        .merge_with_progress(&store, |_| saw_processing |= view.is_processing())
        .await;

    assert!(outcome.is_success());
    assert!(saw_processing);
    assert!(!view.is_processing());
}
