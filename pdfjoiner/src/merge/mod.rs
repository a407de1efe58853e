//! Concatenating PDF documents.
//!
//! - [`pages`]: the output document and page copying
//! - [`metadata`]: the document information dictionary
//! - [`merger`]: the read, parse, copy and serialize pipeline

pub mod merger;
pub mod metadata;
pub mod pages;

pub use merger::{MergeProgress, MergeStatistics, MergedDocument, Merger};
pub use metadata::MetadataManager;
pub use pages::{OutputDocument, PageRef};

use crate::config::Config;
use crate::error::Result;
use crate::selection::CandidateFile;

/// Merge files with the compression, metadata and read-ahead of `config`.
///
/// This is a convenience wrapper around [`Merger::from_config`] for callers
/// that do not need a selection store.
pub async fn merge_files(files: &[CandidateFile], config: &Config) -> Result<MergedDocument> {
    Merger::from_config(config).merge(files).await
}
