//! Serializing documents to bytes.
//!
//! The writer never touches the filesystem: it turns a [`Document`] into the
//! bytes of a PDF file, applying the configured compression on the way.
//! Putting those bytes somewhere is the job of a
//! [`DownloadSink`](crate::delivery::DownloadSink).
//!
//! # Examples
//!
//! ```no_run
//! use pdfjoiner::io::PdfWriter;
//! use pdfjoiner::config::CompressionLevel;
//! use lopdf::Document;
//!
//! # async fn example(doc: Document) -> Result<(), Box<dyn std::error::Error>> {
//! let writer = PdfWriter::with_compression(CompressionLevel::Maximum);
//! let (bytes, stats) = writer.serialize(doc).await?;
//! println!("{} bytes in {:?}", bytes.len(), stats.serialize_time);
//! # Ok(())
//! # }
//! ```

use lopdf::Document;
use std::time::{Duration, Instant};
use tokio::task;

use crate::config::CompressionLevel;
use crate::error::{JoinerError, Result};

/// Options for serializing PDF documents.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Stream compression applied before serializing.
    pub compression: CompressionLevel,

    /// Renumber objects densely before serializing.
    pub renumber: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            compression: CompressionLevel::default(),
            renumber: true,
        }
    }
}

/// Statistics about a serialize operation.
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Time taken to compress and serialize.
    pub serialize_time: Duration,

    /// Size of the produced bytes.
    pub byte_size: u64,

    /// Whether streams were compressed.
    pub compressed: bool,

    /// Number of unreachable objects dropped.
    pub pruned_objects: usize,
}

/// PDF serializer with configurable behavior.
#[derive(Debug, Clone, Default)]
pub struct PdfWriter {
    options: WriteOptions,
}

impl PdfWriter {
    /// Create a new PDF writer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with custom options.
    pub fn with_options(options: WriteOptions) -> Self {
        Self { options }
    }

    /// Create a writer for a compression level.
    pub fn with_compression(compression: CompressionLevel) -> Self {
        Self::with_options(WriteOptions {
            compression,
            ..WriteOptions::default()
        })
    }

    /// The options this writer applies.
    pub fn options(&self) -> &WriteOptions {
        &self.options
    }

    /// Serialize a document to the bytes of a PDF file.
    ///
    /// # Errors
    ///
    /// Returns [`JoinerError::FailedToSerialize`] if the document cannot be
    /// written out.
    pub async fn serialize(&self, document: Document) -> Result<(Vec<u8>, WriteStatistics)> {
        let options = self.options.clone();
        task::spawn_blocking(move || serialize_blocking(document, &options)).await?
    }
}

fn serialize_blocking(
    mut document: Document,
    options: &WriteOptions,
) -> Result<(Vec<u8>, WriteStatistics)> {
    let start = Instant::now();

    let pruned_objects = match options.compression {
        CompressionLevel::None => 0,
        CompressionLevel::Standard => {
            document.compress();
            0
        }
        CompressionLevel::Maximum => {
            let pruned = document.prune_objects().len();
            document.compress();
            pruned
        }
    };

    if options.renumber {
        document.renumber_objects();
    }

    let mut bytes = Vec::new();
    document
        .save_to(&mut bytes)
        .map_err(|e| JoinerError::failed_to_serialize(e.to_string()))?;

    let stats = WriteStatistics {
        serialize_time: start.elapsed(),
        byte_size: bytes.len() as u64,
        compressed: options.compression != CompressionLevel::None,
        pruned_objects,
    };

    tracing::debug!(
        bytes = stats.byte_size,
        pruned = pruned_objects,
        compression = ?options.compression,
        "serialized document"
    );

    Ok((bytes, stats))
}
