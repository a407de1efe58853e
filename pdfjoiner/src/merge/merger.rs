//! The merge pipeline.
//!
//! Files are consumed strictly in order: read, parse, copy their pages into
//! one [`OutputDocument`], append those pages. File bytes may be fetched a few
//! files ahead of the copy loop, but parsing and copying never overlap, so the
//! page order is always plain concatenation. The first failure aborts the
//! whole merge and nothing is produced.

use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::time::{Duration, Instant};

use crate::config::{CompressionLevel, Config, Metadata};
use crate::error::{JoinerError, Result};
use crate::io::{PdfReader, PdfWriter};
use crate::merge::metadata::MetadataManager;
use crate::merge::pages::OutputDocument;
use crate::selection::CandidateFile;
use crate::utils::format_file_size;

/// Statistics about a merge operation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeStatistics {
    /// Number of files merged.
    pub files_merged: usize,

    /// Total number of pages in the merged document.
    pub total_pages: usize,

    /// Total size of the input files.
    pub input_size: u64,

    /// Size of the merged document.
    pub output_size: u64,

    /// Total time taken for the merge.
    pub merge_time: Duration,

    /// Part of `merge_time` spent serializing.
    pub serialize_time: Duration,

    /// Whether streams were compressed.
    pub compressed: bool,
}

impl MergeStatistics {
    /// Format input size as human-readable string.
    pub fn format_input_size(&self) -> String {
        format_file_size(self.input_size)
    }

    /// Format output size as human-readable string.
    pub fn format_output_size(&self) -> String {
        format_file_size(self.output_size)
    }
}

/// Progress event emitted after each file has been copied.
#[derive(Debug, Clone, Copy)]
pub struct MergeProgress<'a> {
    /// Zero-based position of the file in the merge.
    pub index: usize,

    /// Number of files being merged.
    pub total: usize,

    /// Display name of the file.
    pub name: &'a str,

    /// Pages contributed by the file.
    pub pages: usize,
}

/// The bytes of a merged PDF.
#[derive(Debug, Clone)]
pub struct MergedDocument {
    bytes: Vec<u8>,
    statistics: MergeStatistics,
}

impl MergedDocument {
    /// The PDF bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Statistics about the merge that produced this document.
    pub fn statistics(&self) -> &MergeStatistics {
        &self.statistics
    }

    /// Split into bytes and statistics.
    pub fn into_parts(self) -> (Vec<u8>, MergeStatistics) {
        (self.bytes, self.statistics)
    }
}

/// PDF merger that concatenates documents.
#[derive(Debug, Clone)]
pub struct Merger {
    reader: PdfReader,
    writer: PdfWriter,
    metadata_manager: MetadataManager,
    metadata: Metadata,
    read_ahead: usize,
}

impl Merger {
    /// Create a merger with default settings and no read-ahead.
    pub fn new() -> Self {
        Self {
            reader: PdfReader::new(),
            writer: PdfWriter::new(),
            metadata_manager: MetadataManager::new(),
            metadata: Metadata::default(),
            read_ahead: 1,
        }
    }

    /// Create a merger from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new()
            .with_compression(config.compression)
            .with_metadata(config.metadata.clone())
            .with_read_ahead(config.effective_jobs())
    }

    /// Set the compression level of the output.
    pub fn with_compression(mut self, compression: CompressionLevel) -> Self {
        self.writer = PdfWriter::with_compression(compression);
        self
    }

    /// Set the document information written to the output.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Set how many files may be read ahead of the copy loop.
    ///
    /// Values below 1 are treated as 1.
    pub fn with_read_ahead(mut self, files: usize) -> Self {
        self.read_ahead = files.max(1);
        self
    }

    /// Current read-ahead.
    pub fn read_ahead(&self) -> usize {
        self.read_ahead
    }

    /// Merge files into one PDF, in the given order.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `files` is empty
    /// - Any file cannot be read or parsed
    /// - Copying pages or serializing the output fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use pdfjoiner::merge::Merger;
    /// # use pdfjoiner::selection::CandidateFile;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let files = vec![CandidateFile::from_path("a.pdf"), CandidateFile::from_path("b.pdf")];
    /// let merged = Merger::new().merge(&files).await?;
    /// println!("{} pages", merged.statistics().total_pages);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn merge(&self, files: &[CandidateFile]) -> Result<MergedDocument> {
        self.merge_with_progress(files, |_| {}).await
    }

    /// Merge files, calling `on_progress` after each file has been copied.
    pub async fn merge_with_progress<F>(
        &self,
        files: &[CandidateFile],
        mut on_progress: F,
    ) -> Result<MergedDocument>
    where
        F: FnMut(MergeProgress<'_>),
    {
        if files.is_empty() {
            return Err(JoinerError::NoFilesToMerge);
        }

        let start = Instant::now();
        let total = files.len();
        let mut output = OutputDocument::new();
        let mut input_size = 0u64;

        let mut reads = stream::iter(files.iter().enumerate())
            .map(|(index, file)| async move { (index, file, file.read_bytes().await) })
            .buffered(self.read_ahead);

        while let Some((index, file, bytes)) = reads.next().await {
            let bytes = bytes?;
            input_size += bytes.len() as u64;

            let loaded = self.reader.parse(file.name(), bytes).await?;
            let pages = output.copy_pages(loaded.document)?;
            for page in &pages {
                output.append_page(*page)?;
            }

            tracing::debug!(
                file = file.name(),
                pages = pages.len(),
                "copied {}/{}",
                index + 1,
                total
            );

            on_progress(MergeProgress {
                index,
                total,
                name: file.name(),
                pages: pages.len(),
            });
        }

        let total_pages = output.page_count();
        let mut document = output.into_document();
        self.metadata_manager.apply(&mut document, &self.metadata)?;

        let (bytes, write_stats) = self.writer.serialize(document).await?;

        let statistics = MergeStatistics {
            files_merged: total,
            total_pages,
            input_size,
            output_size: write_stats.byte_size,
            merge_time: start.elapsed(),
            serialize_time: write_stats.serialize_time,
            compressed: write_stats.compressed,
        };

        tracing::info!(
            files = total,
            pages = total_pages,
            bytes = statistics.output_size,
            "merged PDFs"
        );

        Ok(MergedDocument { bytes, statistics })
    }
}

impl Default for Merger {
    fn default() -> Self {
        Self::new()
    }
}
