//! Delivering bytes into a directory.

use pdfjoiner::config::OverwriteMode;
use pdfjoiner::delivery::{DirectorySink, DownloadSink};
use pdfjoiner::error::JoinerError;
use rstest::rstest;
use tempfile::TempDir;

use crate::common::dir_entries;

#[rstest]
#[case(OverwriteMode::Rename, "merged (1).pdf", b"old".as_slice())]
#[case(OverwriteMode::Force, "merged.pdf", b"new".as_slice())]
#[tokio::test]
async fn test_existing_target(
    #[case] mode: OverwriteMode,
    #[case] expected_name: &str,
    #[case] expected_original: &[u8],
) {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("merged.pdf"), b"old").unwrap();

    let sink = DirectorySink::new(dir.path()).with_overwrite_mode(mode);
    let delivery = sink.deliver(b"new".to_vec(), "merged.pdf").await.unwrap();

    assert_eq!(delivery.file_name, expected_name);
    assert_eq!(
        std::fs::read(dir.path().join("merged.pdf")).unwrap(),
        expected_original
    );
}

#[tokio::test]
async fn test_no_clobber_leaves_no_staged_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("merged.pdf"), b"old").unwrap();

    let sink = DirectorySink::new(dir.path()).with_overwrite_mode(OverwriteMode::NoClobber);
    let err = sink
        .deliver(b"new".to_vec(), "merged.pdf")
        .await
        .unwrap_err();

    assert!(matches!(err, JoinerError::OutputExists { .. }));
    assert_eq!(dir_entries(dir.path()), vec!["merged.pdf"]);
}

#[tokio::test]
async fn test_unwritable_location_fails() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"file").unwrap();

    let sink = DirectorySink::new(blocker.join("out"));
    let err = sink
        .deliver(b"new".to_vec(), "merged.pdf")
        .await
        .unwrap_err();

    assert!(matches!(err, JoinerError::FailedToDeliver { .. }));
    assert_eq!(err.exit_code(), 5);
}

#[tokio::test]
async fn test_delivery_json() {
    let dir = TempDir::new().unwrap();
    let delivery = DirectorySink::new(dir.path())
        .deliver(b"%PDF".to_vec(), "merged.pdf")
        .await
        .unwrap();

    let json = serde_json::to_value(&delivery).unwrap();
    assert_eq!(json["fileName"], "merged.pdf");
    assert_eq!(json["size"], 4);
}

#[tokio::test]
async fn test_suggested_name_cannot_leave_directory() {
    let root = TempDir::new().unwrap();
    let out = root.path().join("out");
    let sink = DirectorySink::new(&out);

    let delivery = sink
        .deliver(b"new".to_vec(), "../../outside.pdf")
        .await
        .unwrap();

    assert_eq!(delivery.file_name, "outside.pdf");
    assert_eq!(delivery.location, Some(out.join("outside.pdf")));
    assert_eq!(dir_entries(root.path()), vec!["out"]);
}
