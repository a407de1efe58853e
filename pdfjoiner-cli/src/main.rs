//! pdfjoiner - Join PDF files into a single document.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process;
use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use pdfjoiner::config::Config;
use pdfjoiner::delivery::DirectorySink;
use pdfjoiner::error::{JoinerError, NOT_ENOUGH_FILES_MESSAGE};
use pdfjoiner::io::PdfReader;
use pdfjoiner::output::{
    OutputFormatter, ProgressBar, display_merge_plan, display_merge_report, display_selection,
};
use pdfjoiner::utils::collect_paths_for_patterns;
use pdfjoiner::{CandidateFile, MergeOrchestrator, MergeOutcome, SelectionStore};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("Error: {err:#}");
            process::exit(exit_code(&err));
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "warn,pdfjoiner=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<JoinerError>()
        .map_or(1, JoinerError::exit_code)
}

/// Build the selection, then either show the plan or merge it.
async fn run(cli: Cli) -> Result<i32> {
    cli.validate()?;
    let config = cli.to_config()?;

    let formatter = if cli.json {
        OutputFormatter::quiet()
    } else {
        OutputFormatter::from_config(&config)
    };

    let store = SelectionStore::new();

    let positional = collect_paths_for_patterns(&cli.inputs)?;
    store.browse(positional.into_iter().map(CandidateFile::from_path));

    if let Some(list) = &cli.input_list {
        let listed = if cli.reads_stdin() {
            read_stdin_list().await?
        } else {
            read_input_list(list).await?
        };
        store.drop_files(listed.into_iter().map(CandidateFile::from_path));
    }

    if formatter.should_print() {
        formatter.section(&format!("{} v{}", pdfjoiner::NAME, pdfjoiner::VERSION));
        formatter.blank_line();
        display_selection(&formatter, &store.snapshot());
        formatter.blank_line();
    }

    if config.dry_run {
        return dry_run(&store, &config, &formatter, cli.json).await;
    }

    merge(&store, &config, &formatter, cli.json).await
}

/// Inspect every selected file and show what a merge would produce.
async fn dry_run(
    store: &SelectionStore,
    config: &Config,
    formatter: &OutputFormatter,
    json: bool,
) -> Result<i32> {
    let files = store.files();
    let inspections: Vec<_> = files
        .iter()
        .map(|file| file.name().to_string())
        .zip(PdfReader::new().inspect_all(&files).await)
        .collect();

    if json {
        let plan: Vec<_> = inspections
            .iter()
            .map(|(name, result)| match result {
                Ok(info) => serde_json::json!({ "name": name, "info": info }),
                Err(err) => serde_json::json!({ "name": name, "error": err.to_string() }),
            })
            .collect();
        let value = serde_json::json!({ "selection": store.snapshot(), "plan": plan });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        display_merge_plan(formatter, &inspections);
    }

    if !store.can_merge() {
        formatter.warning(NOT_ENOUGH_FILES_MESSAGE);
        return Ok(1);
    }

    if let Some((_, Err(err))) = inspections.iter().find(|(_, result)| result.is_err()) {
        return Ok(err.exit_code());
    }

    formatter.blank_line();
    formatter.success("Dry run completed successfully");
    formatter.info(&format!(
        "  Output would be: {}",
        config.output_path().display()
    ));
    formatter.info("  Run without --dry-run to create the merged PDF");
    Ok(0)
}

/// Run the merge action and report the outcome.
async fn merge(
    store: &SelectionStore,
    config: &Config,
    formatter: &OutputFormatter,
    json: bool,
) -> Result<i32> {
    let orchestrator =
        MergeOrchestrator::from_config(config, DirectorySink::from_config(config));

    let mut progress = if formatter.is_quiet() {
        ProgressBar::disabled()
    } else {
        ProgressBar::auto(store.len())
    };

    let outcome = orchestrator
        .merge_with_progress(store, |event| progress.record(&event))
        .await;

    match &outcome {
        MergeOutcome::Succeeded(report) => {
            progress.finish();
            if formatter.should_print() {
                formatter.blank_line();
                display_merge_report(formatter, report);
            }
        }
        MergeOutcome::Failed { cause } => {
            progress.clear();
            formatter.error(&store.error().unwrap_or_default());
            formatter.debug(&cause.to_string());
        }
        MergeOutcome::Rejected { .. } | MergeOutcome::Busy => {
            progress.clear();
            formatter.error(&store.error().unwrap_or_default());
        }
    }

    if json {
        let value = serde_json::json!({
            "selection": store.snapshot(),
            "report": outcome.report(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    }

    Ok(outcome.exit_code())
}

/// Read paths from an input list file.
async fn read_input_list(path: &Path) -> Result<Vec<PathBuf>> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read input list {}", path.display()))?;

    Ok(parse_input_list(&contents))
}

/// Read paths from an input list piped on stdin.
async fn read_stdin_list() -> Result<Vec<PathBuf>> {
    let mut contents = String::new();
    tokio::io::stdin()
        .read_to_string(&mut contents)
        .await
        .context("Failed to read input list from stdin")?;

    Ok(parse_input_list(&contents))
}

/// One path per line; blank lines and `#` comments are skipped.
fn parse_input_list(contents: &str) -> Vec<PathBuf> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(PathBuf::from)
        .collect()
}
