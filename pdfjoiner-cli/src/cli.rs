//! Command-line interface for pdfjoiner.
//!
//! Arguments are parsed with `clap` and converted into a library
//! [`Config`]. This file is also compiled by the build script to render the
//! man page, so it only depends on `clap` and `pdfjoiner`.

use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;

use pdfjoiner::config::{CompressionLevel, Config, DEFAULT_OUTPUT_NAME, Metadata, OverwriteMode};
use pdfjoiner::error::{JoinerError, Result};

/// Join PDF files into a single document.
///
/// Every page of every selected file is copied into one new PDF, in the
/// order the files are given. Files that are not PDFs are skipped. At least
/// two PDFs are needed for a merge.
#[derive(Parser, Debug)]
#[command(name = "pdfjoiner")]
#[command(version)]
#[command(about = "Join PDF files into a single document", long_about = None)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Files to merge, in order
    ///
    /// Paths or glob patterns. Files that are not PDFs are ignored.
    ///
    /// Examples:
    ///   pdfjoiner cover.pdf body.pdf
    ///   pdfjoiner 'chapters/*.pdf' -o out
    #[arg(value_name = "FILE")]
    pub inputs: Vec<String>,

    /// Read more files from a list (one path per line)
    ///
    /// Lines starting with '#' are comments. Use '-' to read from stdin.
    /// Listed files are added after the positional files.
    #[arg(long, value_name = "FILE")]
    pub input_list: Option<PathBuf>,

    /// Directory the merged PDF is saved into
    #[arg(short, long = "output-dir", value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// File name of the merged PDF
    #[arg(long, value_name = "NAME", default_value = DEFAULT_OUTPUT_NAME)]
    pub name: String,

    /// Replace an existing file with the same name
    ///
    /// By default a free name such as "merged (1).pdf" is chosen.
    #[arg(short, long)]
    pub force: bool,

    /// Fail if a file with the same name exists
    #[arg(long, conflicts_with = "force")]
    pub no_clobber: bool,

    /// Compression level for the merged PDF
    ///
    /// - none: write streams as copied
    /// - standard: compress uncompressed streams (default)
    /// - maximum: also drop unreferenced objects
    #[arg(short, long, value_name = "LEVEL", default_value = "standard")]
    #[arg(value_parser = ["none", "standard", "maximum"])]
    pub compression: String,

    /// Title written to the merged PDF
    #[arg(long, value_name = "TEXT")]
    pub title: Option<String>,

    /// Author written to the merged PDF
    #[arg(long, value_name = "TEXT")]
    pub author: Option<String>,

    /// Subject written to the merged PDF
    #[arg(long, value_name = "TEXT")]
    pub subject: Option<String>,

    /// Keywords written to the merged PDF (comma-separated)
    #[arg(long, value_name = "TEXT")]
    pub keywords: Option<String>,

    /// How many files may be read ahead of the merge
    ///
    /// Pages are always copied in order; this only overlaps file reads.
    /// Defaults to the number of CPU cores.
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Inspect the selection and show the merge plan without merging
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Print the selection and the merge report as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Show details about every file and the merge
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// Convert the arguments into a validated [`Config`].
    ///
    /// # Errors
    ///
    /// Returns an error if the compression level is unknown or the
    /// resulting configuration fails [`Config::validate`].
    pub fn to_config(&self) -> Result<Config> {
        let compression = CompressionLevel::from_str(&self.compression)?;

        let overwrite_mode = if self.force {
            OverwriteMode::Force
        } else if self.no_clobber {
            OverwriteMode::NoClobber
        } else {
            OverwriteMode::Rename
        };

        let metadata = Metadata::new(
            self.title.clone(),
            self.author.clone(),
            self.subject.clone(),
            self.keywords.clone(),
        );

        let config = Config {
            output_dir: self.output_dir.clone(),
            output_name: self.name.trim().to_string(),
            overwrite_mode,
            compression,
            metadata,
            jobs: self.jobs,
            dry_run: self.dry_run,
            verbose: self.verbose,
            quiet: self.quiet,
        };

        config.validate()?;
        Ok(config)
    }

    /// Checks that need no file I/O.
    ///
    /// # Errors
    ///
    /// Returns an error if no input was given at all or `--jobs` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() && self.input_list.is_none() {
            return Err(JoinerError::NoFilesToMerge);
        }

        if self.jobs == Some(0) {
            return Err(JoinerError::invalid_config(
                "Number of jobs must be at least 1",
            ));
        }

        Ok(())
    }

    /// Whether the input list should be read from stdin.
    pub fn reads_stdin(&self) -> bool {
        self.input_list
            .as_ref()
            .is_some_and(|path| path.as_os_str() == "-")
    }
}
