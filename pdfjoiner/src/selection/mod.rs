//! Selection store: the ordered list of files to merge plus merge status.
//!
//! [`SelectionState`] is the plain state object; [`SelectionStore`] is a
//! cloneable handle that lets a UI layer and the merge orchestrator share one
//! state. Both entry points of the file-selection surface, [`SelectionStore::browse`]
//! and [`SelectionStore::drop_files`], go through the same filter-and-append
//! logic in [`SelectionState::add_files`].
//!
//! # Examples
//!
//! ```
//! use pdfjoiner::selection::{CandidateFile, SelectionStore};
//!
//! let store = SelectionStore::new();
//! store.browse([
//!     CandidateFile::from_path("a.pdf"),
//!     CandidateFile::from_path("notes.txt"),
//!     CandidateFile::from_path("b.pdf"),
//! ]);
//! assert_eq!(store.names(), vec!["a.pdf", "b.pdf"]);
//! ```

pub mod file;

pub use file::{CandidateFile, ContentSource, PDF_MIME_TYPE, UNKNOWN_MIME_TYPE};

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{JoinerError, Result};

/// Minimum number of files a merge needs.
pub const MIN_MERGE_FILES: usize = 2;

/// Ordered candidate files, processing flag and the single active error.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    files: Vec<CandidateFile>,
    processing: bool,
    error: Option<String>,
}

/// Outcome of asking the state to start a merge.
#[derive(Debug)]
pub(crate) enum Admission {
    /// Too few files; the validation message has been set.
    Rejected(JoinerError),
    /// A merge is already running; nothing was changed.
    Busy,
    /// Processing started with this snapshot of the selection.
    Accepted(Vec<CandidateFile>),
}

impl SelectionState {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append every PDF-typed file, in the given order, and clear the error.
    ///
    /// Files of any other content type are dropped without notice.
    pub fn add_files<I>(&mut self, files: I)
    where
        I: IntoIterator<Item = CandidateFile>,
    {
        let before = self.files.len();
        let mut skipped = 0usize;

        for file in files {
            if file.is_pdf() {
                self.files.push(file);
            } else {
                tracing::debug!(
                    name = file.name(),
                    content_type = file.content_type(),
                    "skipping non-PDF file"
                );
                skipped += 1;
            }
        }

        self.error = None;

        tracing::debug!(
            added = self.files.len() - before,
            skipped,
            total = self.files.len(),
            "selection updated"
        );
    }

    /// Remove the file at `index`, keeping the order of the others.
    ///
    /// # Errors
    ///
    /// Returns [`JoinerError::IndexOutOfRange`] and leaves the selection
    /// untouched if `index` is not a valid position.
    pub fn remove_file(&mut self, index: usize) -> Result<CandidateFile> {
        if index >= self.files.len() {
            return Err(JoinerError::IndexOutOfRange {
                index,
                len: self.files.len(),
            });
        }

        Ok(self.files.remove(index))
    }

    /// Replace the active error message. An empty message clears it.
    pub fn set_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.error = (!message.is_empty()).then_some(message);
    }

    /// Clear the active error message.
    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Selected files in merge order.
    pub fn files(&self) -> &[CandidateFile] {
        &self.files
    }

    /// Number of selected files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Whether a merge is in flight.
    pub fn is_processing(&self) -> bool {
        self.processing
    }

    /// The active error message, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether a merge could be started right now.
    pub fn can_merge(&self) -> bool {
        self.files.len() >= MIN_MERGE_FILES && !self.processing
    }

    /// Serializable view of the state.
    pub fn snapshot(&self) -> SelectionSnapshot {
        SelectionSnapshot {
            files: self
                .files
                .iter()
                .enumerate()
                .map(|(index, file)| FileSummary {
                    index,
                    name: file.name().to_string(),
                    content_type: file.content_type().to_string(),
                })
                .collect(),
            processing: self.processing,
            error: self.error.clone(),
        }
    }

    pub(crate) fn begin_merge(&mut self) -> Admission {
        if self.processing {
            return Admission::Busy;
        }

        if self.files.len() < MIN_MERGE_FILES {
            let err = JoinerError::not_enough_files(MIN_MERGE_FILES, self.files.len());
            self.error = Some(err.user_message().to_string());
            return Admission::Rejected(err);
        }

        self.processing = true;
        self.error = None;
        Admission::Accepted(self.files.clone())
    }

    pub(crate) fn finish_merge(&mut self, failure: Option<&JoinerError>) {
        self.processing = false;
        if let Some(err) = failure {
            self.error = Some(err.user_message().to_string());
        }
    }
}

/// One entry of a [`SelectionSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSummary {
    /// Position in the selection.
    pub index: usize,
    /// Display name.
    pub name: String,
    /// Content-type tag.
    pub content_type: String,
}

/// Point-in-time view of a selection, suitable for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionSnapshot {
    /// Selected files in merge order.
    pub files: Vec<FileSummary>,
    /// Whether a merge is in flight.
    pub processing: bool,
    /// The active error message.
    pub error: Option<String>,
}

/// Shared handle to a [`SelectionState`].
///
/// Every operation locks the state only for its own duration; the lock is
/// never held across an `.await`.
#[derive(Debug, Clone, Default)]
pub struct SelectionStore {
    state: Arc<Mutex<SelectionState>>,
}

impl SelectionStore {
    /// Create a store with an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SelectionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Files picked through a browse dialog.
    pub fn browse<I>(&self, files: I)
    where
        I: IntoIterator<Item = CandidateFile>,
    {
        self.add_files(files);
    }

    /// Files dropped onto the selection surface.
    pub fn drop_files<I>(&self, files: I)
    where
        I: IntoIterator<Item = CandidateFile>,
    {
        self.add_files(files);
    }

    /// See [`SelectionState::add_files`].
    pub fn add_files<I>(&self, files: I)
    where
        I: IntoIterator<Item = CandidateFile>,
    {
        self.lock().add_files(files);
    }

    /// See [`SelectionState::remove_file`].
    pub fn remove_file(&self, index: usize) -> Result<CandidateFile> {
        self.lock().remove_file(index)
    }

    /// See [`SelectionState::set_error`].
    pub fn set_error(&self, message: impl Into<String>) {
        self.lock().set_error(message);
    }

    /// See [`SelectionState::clear_error`].
    pub fn clear_error(&self) {
        self.lock().clear_error();
    }

    /// Clone of the selected files in merge order.
    pub fn files(&self) -> Vec<CandidateFile> {
        self.lock().files().to_vec()
    }

    /// Display names of the selected files in merge order.
    pub fn names(&self) -> Vec<String> {
        self.lock()
            .files()
            .iter()
            .map(|file| file.name().to_string())
            .collect()
    }

    /// Number of selected files.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Whether a merge is in flight.
    pub fn is_processing(&self) -> bool {
        self.lock().is_processing()
    }

    /// The active error message, if any.
    pub fn error(&self) -> Option<String> {
        self.lock().error().map(str::to_string)
    }

    /// See [`SelectionState::can_merge`].
    pub fn can_merge(&self) -> bool {
        self.lock().can_merge()
    }

    /// See [`SelectionState::snapshot`].
    pub fn snapshot(&self) -> SelectionSnapshot {
        self.lock().snapshot()
    }

    pub(crate) fn begin_merge(&self) -> Admission {
        self.lock().begin_merge()
    }

    pub(crate) fn finish_merge(&self, failure: Option<&JoinerError>) {
        self.lock().finish_merge(failure);
    }
}
