//! pdfjoiner - Join selected PDF files into a single document.
//!
//! The library is built around two pieces:
//!
//! - a [`SelectionStore`](selection::SelectionStore): the ordered list of
//!   files the user picked, a processing flag and one active error message;
//! - a [`MergeOrchestrator`](orchestrator::MergeOrchestrator): the "merge"
//!   action, which concatenates every page of every selected file in order
//!   and hands the result to a [`DownloadSink`](delivery::DownloadSink).
//!
//! Only files typed `application/pdf` are admitted to the selection. A merge
//! needs at least two files; any failure while reading, parsing, copying or
//! delivering leaves a single generic message in the store and produces no
//! output.
//!
//! # Examples
//!
//! ```no_run
//! use pdfjoiner::delivery::DirectorySink;
//! use pdfjoiner::merge::Merger;
//! use pdfjoiner::orchestrator::{MergeOrchestrator, MergeOutcome};
//! use pdfjoiner::selection::{CandidateFile, SelectionStore};
//!
//! # async fn example() {
//! let store = SelectionStore::new();
//! store.browse([
//!     CandidateFile::from_path("chapter1.pdf"),
//!     CandidateFile::from_path("chapter2.pdf"),
//! ]);
//!
//! let orchestrator = MergeOrchestrator::new(Merger::new(), DirectorySink::new("."));
//! match orchestrator.merge(&store).await {
//!     MergeOutcome::Succeeded(report) => {
//!         println!("{} pages", report.statistics.total_pages);
//!     }
//!     _ => println!("{}", store.error().unwrap_or_default()),
//! }
//! # }
//! ```
//!
//! ## Without a selection store
//!
//! ```no_run
//! use pdfjoiner::config::Config;
//! use pdfjoiner::merge;
//! use pdfjoiner::selection::CandidateFile;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let files = vec![CandidateFile::from_path("a.pdf"), CandidateFile::from_path("b.pdf")];
//! let merged = merge::merge_files(&files, &Config::default()).await?;
//! std::fs::write("merged.pdf", merged.bytes())?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod delivery;
pub mod error;
pub mod io;
pub mod merge;
pub mod orchestrator;
pub mod output;
pub mod selection;
pub mod utils;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use config::Config;
pub use error::{JoinerError, Result};
pub use orchestrator::{MergeOrchestrator, MergeOutcome, MergeReport};
pub use selection::{CandidateFile, SelectionStore};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
