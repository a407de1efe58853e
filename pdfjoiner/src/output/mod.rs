//! User-facing output for pdfjoiner.
//!
//! This module handles all user-facing output including:
//! - Formatted status messages
//! - Per-file merge progress
//! - Selection listings, dry-run plans and merge summaries
//!
//! # Examples
//!
//! ```no_run
//! use pdfjoiner::output::OutputFormatter;
//! use pdfjoiner::config::Config;
//!
//! # fn example(config: Config) {
//! let formatter = OutputFormatter::from_config(&config);
//! formatter.info("Merging 3 files");
//! formatter.success("Saved merged.pdf");
//! # }
//! ```

pub mod formatter;
pub mod progress;

pub use formatter::{MessageLevel, OutputFormatter};
pub use progress::{ProgressBar, ProgressStyle};

use crate::error::Result;
use crate::io::PdfInfo;
use crate::orchestrator::MergeReport;
use crate::selection::SelectionSnapshot;
use crate::utils::format_file_size;

/// List the selected files.
pub fn display_selection(formatter: &OutputFormatter, snapshot: &SelectionSnapshot) {
    formatter.section(&format!("Selected files ({}):", snapshot.files.len()));
    for file in &snapshot.files {
        formatter.list_item(file.index + 1, &file.name);
    }
    if let Some(error) = &snapshot.error {
        formatter.warning(error);
    }
}

/// Show what a merge would produce, one entry per inspected file.
///
/// Files that failed inspection are reported as warnings.
pub fn display_merge_plan(
    formatter: &OutputFormatter,
    inspections: &[(String, Result<PdfInfo>)],
) {
    formatter.section("Merge plan:");

    let mut total_pages = 0;
    let mut total_size = 0;
    let mut failures = 0;

    for (index, (name, result)) in inspections.iter().enumerate() {
        match result {
            Ok(info) => {
                total_pages += info.page_count;
                total_size += info.byte_size;
                formatter.list_item(
                    index + 1,
                    &format!(
                        "{name}: {} page(s), PDF {}, {}",
                        info.page_count,
                        info.version,
                        format_file_size(info.byte_size)
                    ),
                );
                if let Some((width, height)) = info.page_dimensions {
                    formatter.detail("First page", &format!("{width:.0} x {height:.0} pt"));
                }
            }
            Err(err) => {
                failures += 1;
                formatter.warning(&format!("{name}: {err}"));
            }
        }
    }

    formatter.blank_line();
    formatter.info(&format!(
        "Would merge {} file(s) into {total_pages} page(s) from {}",
        inspections.len(),
        format_file_size(total_size)
    ));
    if failures > 0 {
        formatter.warning(&format!("{failures} file(s) could not be read as PDF"));
    }
}

/// Summarize a successful merge.
pub fn display_merge_report(formatter: &OutputFormatter, report: &MergeReport) {
    let stats = &report.statistics;
    let target = report
        .delivery
        .location
        .as_ref()
        .map_or_else(
            || report.delivery.file_name.clone(),
            |p| p.display().to_string(),
        );

    formatter.success(&format!(
        "Merged {} file(s), {} page(s) into {target}",
        stats.files_merged, stats.total_pages
    ));
    formatter.detail("Input size", &stats.format_input_size());
    formatter.detail("Output size", &stats.format_output_size());
    formatter.detail("Compressed", if stats.compressed { "yes" } else { "no" });
    formatter.detail("Time", &format!("{:.2}s", stats.merge_time.as_secs_f64()));
}
