//! Selection store behaviour through the public API.

use pdfjoiner::error::NOT_ENOUGH_FILES_MESSAGE;
use pdfjoiner::selection::{CandidateFile, SelectionStore};
use rstest::rstest;
use tempfile::TempDir;

use crate::common::write_pdf;

#[test]
fn test_browse_files_from_disk() {
    let dir = TempDir::new().unwrap();
    let a = write_pdf(dir.path(), "a", 1);
    let notes = dir.path().join("notes.txt");
    std::fs::write(&notes, "not a pdf").unwrap();
    let b = write_pdf(dir.path(), "b", 1);

    let store = SelectionStore::new();
    store.browse([a, notes, b].map(CandidateFile::from_path));

    assert_eq!(store.names(), vec!["a.pdf", "b.pdf"]);
    assert!(store.can_merge());
}

#[rstest]
#[case::browse(true)]
#[case::drop(false)]
fn test_entry_points_filter_identically(#[case] browse: bool) {
    let files = [
        CandidateFile::from_path("A.pdf"),
        CandidateFile::from_path("B.txt"),
        CandidateFile::from_path("C.pdf"),
    ];

    let store = SelectionStore::new();
    store.set_error(NOT_ENOUGH_FILES_MESSAGE);
    if browse {
        store.browse(files);
    } else {
        store.drop_files(files);
    }

    assert_eq!(store.names(), vec!["A.pdf", "C.pdf"]);
    assert_eq!(store.error(), None);
}

#[test]
fn test_remove_then_add_keeps_order() {
    let store = SelectionStore::new();
    store.browse(["1.pdf", "2.pdf", "3.pdf"].map(CandidateFile::from_path));

    let removed = store.remove_file(0).unwrap();
    store.drop_files([CandidateFile::from_path("4.pdf")]);

    assert_eq!(removed.name(), "1.pdf");
    assert_eq!(store.names(), vec!["2.pdf", "3.pdf", "4.pdf"]);
}

#[test]
fn test_remove_out_of_range_leaves_selection() {
    let store = SelectionStore::new();
    store.browse([CandidateFile::from_path("a.pdf")]);

    assert!(store.remove_file(5).is_err());
    assert_eq!(store.len(), 1);
}

#[test]
fn test_snapshot_json_shape() {
    let store = SelectionStore::new();
    store.browse([CandidateFile::from_path("a.pdf")]);

    let json = serde_json::to_value(store.snapshot()).unwrap();

    assert_eq!(json["files"][0]["name"], "a.pdf");
    assert_eq!(json["files"][0]["contentType"], "application/pdf");
    assert_eq!(json["processing"], false);
    assert!(json["error"].is_null());
}
