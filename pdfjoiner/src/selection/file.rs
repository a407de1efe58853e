//! Candidate files handed over by the file-selection surface.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{JoinerError, Result};

/// Content type a file must carry to be admitted to the selection.
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Content type for files whose type cannot be determined.
pub const UNKNOWN_MIME_TYPE: &str = "application/octet-stream";

/// Where the bytes of a candidate file come from.
///
/// Bytes are only fetched when a merge or an inspection needs them.
#[derive(Debug, Clone)]
pub enum ContentSource {
    /// A file on disk, read on demand.
    Path(PathBuf),
    /// A buffer already in memory, shared between clones.
    Memory(Arc<[u8]>),
}

impl ContentSource {
    /// Fetch the full content.
    pub async fn read(&self) -> io::Result<Vec<u8>> {
        match self {
            Self::Path(path) => tokio::fs::read(path).await,
            Self::Memory(bytes) => Ok(bytes.to_vec()),
        }
    }

    /// Size of the content in bytes.
    pub async fn size(&self) -> io::Result<u64> {
        match self {
            Self::Path(path) => Ok(tokio::fs::metadata(path).await?.len()),
            Self::Memory(bytes) => Ok(bytes.len() as u64),
        }
    }
}

/// One user-selected input.
#[derive(Debug, Clone)]
pub struct CandidateFile {
    name: String,
    content_type: String,
    source: ContentSource,
}

impl CandidateFile {
    /// Create a candidate from its parts.
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        source: ContentSource,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            source,
        }
    }

    /// Create a candidate for a file on disk.
    ///
    /// The content type is derived from the file extension, the same way a
    /// browser types the files a user picks.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = display_name(&path);
        let content_type = mime_guess::from_path(&path)
            .first_raw()
            .unwrap_or(UNKNOWN_MIME_TYPE);

        Self::new(name, content_type, ContentSource::Path(path))
    }

    /// Create a candidate for a buffer already in memory.
    pub fn from_bytes(
        name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self::new(name, content_type, ContentSource::Memory(bytes.into()))
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Content-type tag.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Content accessor.
    pub fn source(&self) -> &ContentSource {
        &self.source
    }

    /// Whether this file passes the selection filter.
    pub fn is_pdf(&self) -> bool {
        self.content_type == PDF_MIME_TYPE
    }

    /// Read the raw bytes of the file.
    ///
    /// # Errors
    ///
    /// Returns [`JoinerError::FailedToRead`] if the content cannot be fetched.
    pub async fn read_bytes(&self) -> Result<Vec<u8>> {
        self.source
            .read()
            .await
            .map_err(|err| JoinerError::failed_to_read(&self.name, err))
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
