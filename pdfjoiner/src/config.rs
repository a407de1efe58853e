//! Configuration module for pdfjoiner.
//!
//! A [`Config`] holds everything a merge needs besides the selection itself:
//! where the merged document is delivered, how it is compressed, which
//! document information is written, and how far ahead file bytes are read.
//! The CLI builds one from its arguments; library users build one directly.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{JoinerError, Result};

/// File name used for the merged document.
pub const DEFAULT_OUTPUT_NAME: &str = "merged.pdf";

/// Compression level for the output PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionLevel {
    /// No compression - streams are written as they were copied.
    None,
    /// Compress uncompressed streams.
    #[default]
    Standard,
    /// Compress streams and drop objects no page refers to.
    Maximum,
}

impl FromStr for CompressionLevel {
    type Err = JoinerError;

    /// Parse compression level from "none", "standard" or "maximum".
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "standard" => Ok(Self::Standard),
            "maximum" => Ok(Self::Maximum),
            _ => Err(JoinerError::invalid_config(format!(
                "Invalid compression level: {s}. Must be one of: none, standard, maximum"
            ))),
        }
    }
}

/// Behaviour when the delivered file name is already taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwriteMode {
    /// Pick the next free name, `merged (1).pdf`, `merged (2).pdf`, ...
    #[default]
    Rename,
    /// Replace the existing file.
    Force,
    /// Fail if the file exists.
    NoClobber,
}

impl FromStr for OverwriteMode {
    type Err = JoinerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "rename" => Ok(Self::Rename),
            "force" => Ok(Self::Force),
            "no-clobber" | "noclobber" => Ok(Self::NoClobber),
            _ => Err(JoinerError::invalid_config(format!(
                "Invalid overwrite mode: {s}. Must be one of: rename, force, no-clobber"
            ))),
        }
    }
}

/// Document information written to the merged PDF.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    /// Document title.
    pub title: Option<String>,
    /// Document author.
    pub author: Option<String>,
    /// Document subject.
    pub subject: Option<String>,
    /// Document keywords (comma-separated).
    pub keywords: Option<String>,
}

impl Metadata {
    /// Check if any metadata fields are set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.subject.is_none()
            && self.keywords.is_none()
    }

    /// Create metadata from optional strings, trimming whitespace.
    pub fn new(
        title: Option<String>,
        author: Option<String>,
        subject: Option<String>,
        keywords: Option<String>,
    ) -> Self {
        let to_string_opt = |opt: Option<String>| {
            opt.filter(|s| !s.trim().is_empty())
                .map(|s| s.trim().to_string())
        };

        Self {
            title: to_string_opt(title),
            author: to_string_opt(author),
            subject: to_string_opt(subject),
            keywords: to_string_opt(keywords),
        }
    }
}

/// Complete configuration for merging and delivering a selection.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory the merged document is delivered into.
    pub output_dir: PathBuf,

    /// File name of the merged document.
    pub output_name: String,

    /// What to do when `output_name` already exists.
    pub overwrite_mode: OverwriteMode,

    /// Compression level for output.
    pub compression: CompressionLevel,

    /// Metadata to set on output document.
    pub metadata: Metadata,

    /// How many files may be read ahead of the page-copy loop (None = auto-detect).
    pub jobs: Option<usize>,

    /// Dry run mode - inspect the selection without merging.
    pub dry_run: bool,

    /// Verbose output mode.
    pub verbose: bool,

    /// Quiet mode - suppress non-error output.
    pub quiet: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
            overwrite_mode: OverwriteMode::default(),
            compression: CompressionLevel::default(),
            metadata: Metadata::default(),
            jobs: None,
            dry_run: false,
            verbose: false,
            quiet: false,
        }
    }
}

impl Config {
    /// Full path the merged document would be delivered to, ignoring renames.
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.output_name)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Verbose and quiet modes are both enabled
    /// - Jobs count is zero
    /// - The output name is empty, contains a path separator or is not a `.pdf` name
    pub fn validate(&self) -> Result<()> {
        if self.verbose && self.quiet {
            return Err(JoinerError::invalid_config(
                "Cannot use both --verbose and --quiet",
            ));
        }

        if let Some(jobs) = self.jobs
            && jobs == 0
        {
            return Err(JoinerError::invalid_config(
                "Number of jobs must be at least 1",
            ));
        }

        let name = self.output_name.trim();
        if name.is_empty() {
            return Err(JoinerError::invalid_config("Output name cannot be empty"));
        }

        if Path::new(name).file_name().and_then(|n| n.to_str()) != Some(name) {
            return Err(JoinerError::invalid_config(format!(
                "Output name must be a plain file name: {name}"
            )));
        }

        let is_pdf = Path::new(name)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if !is_pdf {
            return Err(JoinerError::invalid_config(format!(
                "Output name must end in .pdf: {name}"
            )));
        }

        Ok(())
    }

    /// Get the effective read-ahead.
    ///
    /// Returns the configured job count, or the number of CPU cores if auto-detect.
    pub fn effective_jobs(&self) -> usize {
        self.jobs.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    /// Check if output should be displayed.
    ///
    /// Returns false if in quiet mode and not doing a dry run.
    pub fn should_print(&self) -> bool {
        !self.quiet || self.dry_run
    }
}
