//! End-to-end tests of the merge pipeline.

use lopdf::{Document, Object};
use pdfjoiner::config::{CompressionLevel, Config, Metadata};
use pdfjoiner::error::JoinerError;
use pdfjoiner::io::PdfReader;
use pdfjoiner::merge::{MetadataManager, Merger, merge_files};
use pdfjoiner::selection::{CandidateFile, PDF_MIME_TYPE};
use rstest::rstest;
use tempfile::TempDir;

use crate::common::{build_linked_pdf, build_nested_pdf, page_labels, pdf_file, write_pdf};

#[tokio::test]
async fn test_merge_files_from_disk() {
    let dir = TempDir::new().unwrap();
    let files = vec![
        CandidateFile::from_path(write_pdf(dir.path(), "X", 2)),
        CandidateFile::from_path(write_pdf(dir.path(), "Y", 3)),
    ];

    let merged = merge_files(&files, &Config::default()).await.unwrap();

    assert_eq!(
        page_labels(merged.bytes()),
        vec!["X-1", "X-2", "Y-1", "Y-2", "Y-3"]
    );
    assert_eq!(merged.statistics().files_merged, 2);
    assert_eq!(merged.statistics().total_pages, 5);
}

#[tokio::test]
async fn test_nested_page_tree_attributes_survive() {
    let files = vec![
        CandidateFile::from_bytes("nested.pdf", PDF_MIME_TYPE, build_nested_pdf("N", 2)),
        pdf_file("F", 1),
    ];

    let merged = Merger::new().merge(&files).await.unwrap();
    let doc = Document::load_mem(merged.bytes()).unwrap();

    let pages: Vec<_> = doc.get_pages().into_values().collect();
    let first = doc.get_dictionary(pages[0]).unwrap();
    assert_eq!(first.get(b"Rotate").unwrap().as_i64().unwrap(), 90);
    assert!(first.has(b"Resources"));

    let media_box = first.get(b"MediaBox").unwrap().as_array().unwrap();
    assert_eq!(media_box[2].as_float().unwrap(), 420.0);

    // The flat file keeps its own MediaBox and no rotation.
    let last = doc.get_dictionary(pages[2]).unwrap();
    assert!(!last.has(b"Rotate"));
    assert_eq!(
        last.get(b"MediaBox").unwrap().as_array().unwrap()[2]
            .as_float()
            .unwrap(),
        612.0
    );
    assert_eq!(page_labels(merged.bytes()), vec!["N-1", "N-2", "F-1"]);
}

#[tokio::test]
async fn test_links_between_pages_stay_inside_output() {
    let files = vec![
        CandidateFile::from_bytes("linked.pdf", PDF_MIME_TYPE, build_linked_pdf("L", 3)),
        pdf_file("P", 1),
    ];

    let merged = Merger::new().merge(&files).await.unwrap();
    let doc = Document::load_mem(merged.bytes()).unwrap();

    let pages: Vec<_> = doc.get_pages().into_values().collect();
    assert_eq!(pages.len(), 4);

    let first = doc.get_dictionary(pages[0]).unwrap();
    let annots = first.get(b"Annots").unwrap().as_array().unwrap();
    let link = doc
        .get_dictionary(annots[0].as_reference().unwrap())
        .unwrap();
    let dest = link.get(b"Dest").unwrap().as_array().unwrap();

    assert_eq!(dest[0].as_reference().unwrap(), pages[2]);
    let target = doc.get_dictionary(pages[2]).unwrap();
    assert!(matches!(target.get(b"Parent"), Ok(Object::Reference(_))));
}

#[rstest]
#[case(CompressionLevel::None)]
#[case(CompressionLevel::Standard)]
#[case(CompressionLevel::Maximum)]
#[tokio::test]
async fn test_every_compression_level_produces_valid_output(#[case] level: CompressionLevel) {
    let files = vec![pdf_file("A", 2), pdf_file("B", 2)];

    let merged = Merger::new()
        .with_compression(level)
        .merge(&files)
        .await
        .unwrap();

    assert_eq!(
        page_labels(merged.bytes()),
        vec!["A-1", "A-2", "B-1", "B-2"]
    );
    assert_eq!(
        merged.statistics().compressed,
        level != CompressionLevel::None
    );
}

#[tokio::test]
async fn test_metadata_from_config() {
    let config = Config {
        metadata: Metadata::new(
            Some("Collected Papers".to_string()),
            Some("Research Group".to_string()),
            Some("Proceedings".to_string()),
            None,
        ),
        ..Config::default()
    };

    let merged = merge_files(&[pdf_file("A", 1), pdf_file("B", 1)], &config)
        .await
        .unwrap();

    let doc = Document::load_mem(merged.bytes()).unwrap();
    assert_eq!(MetadataManager::new().read(&doc), config.metadata);
}

#[tokio::test]
async fn test_missing_file_fails_with_read_error() {
    let dir = TempDir::new().unwrap();
    let files = vec![
        CandidateFile::from_path(write_pdf(dir.path(), "A", 1)),
        CandidateFile::from_path(dir.path().join("gone.pdf")),
    ];

    let err = Merger::new().merge(&files).await.unwrap_err();

    assert!(matches!(err, JoinerError::FailedToRead { ref name, .. } if name == "gone.pdf"));
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_merged_output_can_be_merged_again() {
    let first = Merger::new()
        .merge(&[pdf_file("A", 1), pdf_file("B", 1)])
        .await
        .unwrap();
    let (bytes, _) = first.into_parts();

    let again = vec![
        CandidateFile::from_bytes("merged.pdf", PDF_MIME_TYPE, bytes),
        pdf_file("C", 1),
    ];
    let second = Merger::new().merge(&again).await.unwrap();

    assert_eq!(page_labels(second.bytes()), vec!["A-1", "B-1", "C-1"]);
}

#[tokio::test]
async fn test_inspect_reports_pages() {
    let info = PdfReader::new().inspect(&pdf_file("A", 4)).await.unwrap();

    assert_eq!(info.name, "A.pdf");
    assert_eq!(info.page_count, 4);
    assert_eq!(info.version, "1.4");
}
