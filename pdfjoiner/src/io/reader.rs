//! PDF loading and inspection.
//!
//! Parsing is CPU-bound, so documents are parsed on tokio's blocking pool
//! while the caller awaits.
//!
//! # Examples
//!
//! ```no_run
//! use pdfjoiner::io::PdfReader;
//! use pdfjoiner::selection::CandidateFile;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = PdfReader::new();
//! let info = reader.inspect(&CandidateFile::from_path("a.pdf")).await?;
//! println!("{} has {} pages", info.name, info.page_count);
//! # Ok(())
//! # }
//! ```

use lopdf::{Document, Object};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tokio::task;

use crate::error::{JoinerError, Result};
use crate::merge::pages::page_ids;
use crate::selection::CandidateFile;

/// A parsed PDF document with load details.
#[derive(Debug)]
pub struct LoadedPdf {
    /// The PDF document.
    pub document: Document,

    /// Display name of the source file.
    pub name: String,

    /// Number of pages in the document.
    pub page_count: usize,

    /// Size of the raw bytes.
    pub byte_size: u64,

    /// Time taken to parse the document.
    pub load_time: Duration,
}

/// Summary of one PDF, used for dry runs and listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfInfo {
    /// Display name of the file.
    pub name: String,

    /// Number of pages in the PDF.
    pub page_count: usize,

    /// PDF version string, e.g. "1.7".
    pub version: String,

    /// Size of the file in bytes.
    pub byte_size: u64,

    /// Number of objects in the PDF.
    pub object_count: usize,

    /// Width and height of the first page in points, if available.
    pub page_dimensions: Option<(f32, f32)>,
}

impl PdfInfo {
    fn from_loaded(loaded: &LoadedPdf) -> Self {
        let doc = &loaded.document;

        let page_dimensions = doc.page_iter().next().and_then(|page_id| {
            let page = doc.get_dictionary(page_id).ok()?;
            let Ok(Object::Array(media_box)) = page.get(b"MediaBox") else {
                return None;
            };
            if media_box.len() < 4 {
                return None;
            }
            let width = media_box[2].as_float().ok()? - media_box[0].as_float().ok()?;
            let height = media_box[3].as_float().ok()? - media_box[1].as_float().ok()?;
            Some((width, height))
        });

        Self {
            name: loaded.name.clone(),
            page_count: loaded.page_count,
            version: doc.version.clone(),
            byte_size: loaded.byte_size,
            object_count: doc.objects.len(),
            page_dimensions,
        }
    }
}

/// Parse raw bytes into a document.
///
/// # Errors
///
/// Returns [`JoinerError::FailedToLoadPdf`] if the bytes are not a PDF the
/// library can load.
pub async fn load_document(name: &str, bytes: Vec<u8>) -> Result<Document> {
    let document = task::spawn_blocking(move || Document::load_mem(&bytes))
        .await?
        .map_err(|err| JoinerError::failed_to_load_pdf(name, err.to_string()))?;
    Ok(document)
}

/// Loads candidate files as PDF documents.
#[derive(Debug, Clone, Default)]
pub struct PdfReader;

impl PdfReader {
    /// Create a new PDF reader.
    pub fn new() -> Self {
        Self
    }

    /// Parse already-fetched bytes of a file.
    pub async fn parse(&self, name: &str, bytes: Vec<u8>) -> Result<LoadedPdf> {
        let start = Instant::now();
        let byte_size = bytes.len() as u64;

        let document = load_document(name, bytes).await?;
        let page_count = page_ids(&document).len();

        tracing::debug!(name, page_count, byte_size, "parsed PDF");

        Ok(LoadedPdf {
            document,
            name: name.to_string(),
            page_count,
            byte_size,
            load_time: start.elapsed(),
        })
    }

    /// Read and parse a candidate file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The content cannot be read
    /// - The content is not a loadable PDF
    pub async fn load(&self, file: &CandidateFile) -> Result<LoadedPdf> {
        let bytes = file.read_bytes().await?;
        self.parse(file.name(), bytes).await
    }

    /// Read, parse and summarize a candidate file.
    pub async fn inspect(&self, file: &CandidateFile) -> Result<PdfInfo> {
        let loaded = self.load(file).await?;
        Ok(PdfInfo::from_loaded(&loaded))
    }

    /// Inspect every file in order, one at a time.
    ///
    /// Returns one result per input file.
    pub async fn inspect_all(&self, files: &[CandidateFile]) -> Vec<Result<PdfInfo>> {
        let mut results = Vec::with_capacity(files.len());

        for file in files {
            results.push(self.inspect(file).await);
        }

        results
    }
}
