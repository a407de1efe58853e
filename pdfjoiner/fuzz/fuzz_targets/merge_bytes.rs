#![no_main]

use libfuzzer_sys::fuzz_target;
use pdfjoiner::delivery::MemorySink;
use pdfjoiner::merge::Merger;
use pdfjoiner::selection::{CandidateFile, PDF_MIME_TYPE, SelectionStore};
use pdfjoiner::MergeOrchestrator;
use std::sync::OnceLock;
use tokio::runtime::{Builder, Runtime};

static RUNTIME: OnceLock<Runtime> = OnceLock::new();

fn runtime() -> &'static Runtime {
    RUNTIME.get_or_init(|| Builder::new_current_thread().enable_all().build().unwrap())
}

fuzz_target!(|data: &[u8]| {
    // Split the input into two "files" so page copying across documents is reached.
    let split = data.len() / 2;
    let store = SelectionStore::new();
    store.drop_files([
        CandidateFile::from_bytes("first.pdf", PDF_MIME_TYPE, data[..split].to_vec()),
        CandidateFile::from_bytes("second.pdf", PDF_MIME_TYPE, data[split..].to_vec()),
    ]);

    let orchestrator = MergeOrchestrator::new(Merger::new(), MemorySink::new());
    let outcome = runtime().block_on(orchestrator.merge(&store));

    // Whatever the bytes, the merge must settle back to idle.
    assert!(!store.is_processing());
    assert_eq!(outcome.is_success(), store.error().is_none());
    assert_eq!(outcome.is_success(), orchestrator.sink().len() == 1);
});
