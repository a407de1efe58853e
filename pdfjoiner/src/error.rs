//! Error types for pdfjoiner.
//!
//! Every fallible operation in the crate returns [`JoinerError`]. Errors keep
//! their technical cause for diagnostics, while the selection store only ever
//! shows one of two fixed user-facing messages (see [`JoinerError::user_message`]).
//!
//! # Error Categories
//!
//! - **Validation errors**: too few files selected, bad configuration
//! - **Processing errors**: read, parse, copy, serialize or delivery failures
//! - **Selection errors**: out-of-range removals

use std::io;
use std::path::PathBuf;

/// Result type alias for pdfjoiner operations.
pub type Result<T> = std::result::Result<T, JoinerError>;

/// Message shown when a merge is requested with fewer than two files.
pub const NOT_ENOUGH_FILES_MESSAGE: &str = "Please add at least 2 PDF files to merge";

/// Message shown for any failure while merging.
pub const MERGE_FAILED_MESSAGE: &str = "Error merging PDFs. Please try again.";

/// Main error type for pdfjoiner operations.
#[derive(Debug, thiserror::Error)]
pub enum JoinerError {
    /// Fewer than two files were selected when a merge was requested.
    #[error("At least {required} PDF files are required to merge, {found} selected")]
    NotEnoughFiles {
        /// Minimum number of files.
        required: usize,
        /// Number of files in the selection.
        found: usize,
    },

    /// The merge pipeline was called with an empty file list.
    #[error("No input files specified for merging")]
    NoFilesToMerge,

    /// A selection index did not refer to a selected file.
    #[error("No selected file at index {index} (selection holds {len} file(s))")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Length of the selection.
        len: usize,
    },

    /// The raw bytes of a selected file could not be read.
    #[error("Failed to read {name}\n  Reason: {source}")]
    FailedToRead {
        /// Display name of the file.
        name: String,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The bytes of a selected file are not a loadable PDF.
    #[error("Failed to load PDF: {name}\n  Reason: {reason}")]
    FailedToLoadPdf {
        /// Display name of the file.
        name: String,
        /// Reason reported by the PDF library.
        reason: String,
    },

    /// Copying pages into the output document failed.
    #[error("Merge operation failed: {reason}")]
    MergeFailed {
        /// Description of what went wrong.
        reason: String,
    },

    /// The merged document could not be serialized.
    #[error("Failed to serialize merged PDF: {reason}")]
    FailedToSerialize {
        /// Reason reported by the PDF library.
        reason: String,
    },

    /// The download target already exists and overwriting is not allowed.
    #[error(
        "Output file already exists: {}\n  Use --force to overwrite or choose a different name",
        path.display()
    )]
    OutputExists {
        /// Path of the existing file.
        path: PathBuf,
    },

    /// The merged bytes could not be delivered.
    #[error("Failed to deliver {}\n  Reason: {source}", path.display())]
    FailedToDeliver {
        /// Target path of the delivery.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// Generic error with a custom message.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl JoinerError {
    /// Create a NotEnoughFiles error.
    pub fn not_enough_files(required: usize, found: usize) -> Self {
        Self::NotEnoughFiles { required, found }
    }

    /// Create a FailedToRead error.
    pub fn failed_to_read(name: impl Into<String>, source: io::Error) -> Self {
        Self::FailedToRead {
            name: name.into(),
            source,
        }
    }

    /// Create a FailedToLoadPdf error.
    pub fn failed_to_load_pdf(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::FailedToLoadPdf {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a MergeFailed error.
    pub fn merge_failed(reason: impl Into<String>) -> Self {
        Self::MergeFailed {
            reason: reason.into(),
        }
    }

    /// Create a FailedToSerialize error.
    pub fn failed_to_serialize(reason: impl Into<String>) -> Self {
        Self::FailedToSerialize {
            reason: reason.into(),
        }
    }

    /// Create an OutputExists error.
    pub fn output_exists(path: PathBuf) -> Self {
        Self::OutputExists { path }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Whether this error is the "too few files" validation failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::NotEnoughFiles { .. })
    }

    /// The fixed message the selection store displays for this error.
    ///
    /// Validation failures get a specific message; everything else collapses to
    /// one generic message so the technical cause never reaches the user.
    pub fn user_message(&self) -> &'static str {
        if self.is_validation() {
            NOT_ENOUGH_FILES_MESSAGE
        } else {
            MERGE_FAILED_MESSAGE
        }
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotEnoughFiles { .. } => 1,
            Self::NoFilesToMerge => 1,
            Self::IndexOutOfRange { .. } => 1,
            Self::FailedToRead { .. } => 2,
            Self::FailedToLoadPdf { .. } => 3,
            Self::OutputExists { .. } => 4,
            Self::FailedToDeliver { .. } => 5,
            Self::MergeFailed { .. } => 6,
            Self::FailedToSerialize { .. } => 6,
            Self::InvalidConfig { .. } => 1,
            Self::Other { .. } => 1,
        }
    }
}

impl From<lopdf::Error> for JoinerError {
    fn from(err: lopdf::Error) -> Self {
        Self::merge_failed(err.to_string())
    }
}

impl From<tokio::task::JoinError> for JoinerError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::other(format!("Background task failed: {err}"))
    }
}
