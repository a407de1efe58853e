//! Running a merge against a selection.
//!
//! [`MergeOrchestrator::merge`] is the "Merge PDFs" action. It checks the
//! selection, flips the store's processing flag, runs the [`Merger`] over a
//! snapshot of the selected files and hands the result to a
//! [`DownloadSink`]. The store only ever sees one of two fixed error
//! messages; the underlying cause is logged and returned in the outcome.
//!
//! ```text
//! Idle -> Validating -> Rejected                     -> Idle
//!                    -> Processing -> Succeeded      -> Idle
//!                                  -> Failed         -> Idle
//! ```

use serde::Serialize;

use crate::config::{Config, DEFAULT_OUTPUT_NAME};
use crate::delivery::{Delivery, DownloadSink};
use crate::error::{JoinerError, Result};
use crate::merge::{MergeProgress, MergeStatistics, Merger};
use crate::selection::{Admission, CandidateFile, SelectionStore};

/// Summary of a successful merge.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeReport {
    /// Statistics of the merge pipeline.
    pub statistics: MergeStatistics,

    /// Where the merged document went.
    pub delivery: Delivery,
}

/// What a merge request ended in.
#[derive(Debug)]
pub enum MergeOutcome {
    /// Fewer than two files were selected. The store shows the validation
    /// message and the processing flag was never set.
    Rejected {
        /// The validation error.
        cause: JoinerError,
    },

    /// A merge was already running. Nothing was changed.
    Busy,

    /// The merged document was delivered.
    Succeeded(MergeReport),

    /// Reading, merging or delivering failed. The store shows the generic
    /// failure message.
    Failed {
        /// The underlying error.
        cause: JoinerError,
    },
}

impl MergeOutcome {
    /// Whether the merged document was delivered.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }

    /// The report of a successful merge.
    pub fn report(&self) -> Option<&MergeReport> {
        match self {
            Self::Succeeded(report) => Some(report),
            _ => None,
        }
    }

    /// The error behind a rejected or failed merge.
    pub fn cause(&self) -> Option<&JoinerError> {
        match self {
            Self::Rejected { cause } | Self::Failed { cause } => Some(cause),
            _ => None,
        }
    }

    /// Process exit code for this outcome.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Succeeded(_) => 0,
            Self::Busy => 1,
            Self::Rejected { cause } | Self::Failed { cause } => cause.exit_code(),
        }
    }
}

/// Drives merges of a [`SelectionStore`] into a [`DownloadSink`].
#[derive(Debug, Clone)]
pub struct MergeOrchestrator<S> {
    merger: Merger,
    sink: S,
    output_name: String,
}

impl<S: DownloadSink> MergeOrchestrator<S> {
    /// Create an orchestrator delivering `merged.pdf`.
    pub fn new(merger: Merger, sink: S) -> Self {
        Self {
            merger,
            sink,
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
        }
    }

    /// Create an orchestrator from configuration.
    pub fn from_config(config: &Config, sink: S) -> Self {
        Self::new(Merger::from_config(config), sink).with_output_name(&config.output_name)
    }

    /// Set the file name the merged document is delivered under.
    pub fn with_output_name(mut self, output_name: impl Into<String>) -> Self {
        self.output_name = output_name.into();
        self
    }

    /// File name the merged document is delivered under.
    pub fn output_name(&self) -> &str {
        &self.output_name
    }

    /// The sink deliveries go to.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Merge the current selection.
    pub async fn merge(&self, store: &SelectionStore) -> MergeOutcome {
        self.merge_with_progress(store, |_| {}).await
    }

    /// Merge the current selection, reporting each consumed file.
    pub async fn merge_with_progress<F>(
        &self,
        store: &SelectionStore,
        on_progress: F,
    ) -> MergeOutcome
    where
        F: FnMut(MergeProgress<'_>),
    {
        let files = match store.begin_merge() {
            Admission::Rejected(cause) => {
                tracing::info!(error = %cause, "merge rejected");
                return MergeOutcome::Rejected { cause };
            }
            Admission::Busy => {
                tracing::debug!("merge already in progress");
                return MergeOutcome::Busy;
            }
            Admission::Accepted(files) => files,
        };

        let guard = ProcessingGuard::new(store);

        match self.run(&files, on_progress).await {
            Ok(report) => {
                guard.finish(None);
                MergeOutcome::Succeeded(report)
            }
            Err(cause) => {
                tracing::error!(error = %cause, "error merging PDFs");
                guard.finish(Some(&cause));
                MergeOutcome::Failed { cause }
            }
        }
    }

    async fn run<F>(&self, files: &[CandidateFile], on_progress: F) -> Result<MergeReport>
    where
        F: FnMut(MergeProgress<'_>),
    {
        let merged = self.merger.merge_with_progress(files, on_progress).await?;
        let (bytes, statistics) = merged.into_parts();
        let delivery = self.sink.deliver(bytes, &self.output_name).await?;

        Ok(MergeReport {
            statistics,
            delivery,
        })
    }
}

/// Clears the processing flag even if the merge future is dropped midway.
struct ProcessingGuard<'a> {
    store: &'a SelectionStore,
    armed: bool,
}

impl<'a> ProcessingGuard<'a> {
    fn new(store: &'a SelectionStore) -> Self {
        Self { store, armed: true }
    }

    fn finish(mut self, failure: Option<&JoinerError>) {
        self.armed = false;
        self.store.finish_merge(failure);
    }
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.store
                .finish_merge(Some(&JoinerError::merge_failed("merge interrupted")));
        }
    }
}
