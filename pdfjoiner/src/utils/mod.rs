//! Utilities for path collection and size formatting.

use std::path::PathBuf;

use crate::error::{JoinerError, Result};

/// Expand multiple glob patterns into filesystem paths.
///
/// Accepts anything iterable with items that convert to `&str`, e.g.:
/// `&[&str]`, `Vec<String>`, or `Vec<&str>`.
///
/// Matches of one pattern come out in the glob crate's (alphabetical) order;
/// patterns are expanded in the order given. A pattern without glob
/// metacharacters that matches nothing is kept as a literal path, so a
/// missing file surfaces as a read error instead of vanishing.
///
/// Errors:
/// - Propagates `glob` parse errors.
/// - Propagates filesystem errors from glob iterator.
pub fn collect_paths_for_patterns<T>(patterns: T) -> Result<Vec<PathBuf>>
where
    T: IntoIterator,
    T::Item: AsRef<str>,
{
    let mut resolved_paths = Vec::new();

    for pattern in patterns {
        resolved_paths.extend(collect_paths_for_pattern(pattern.as_ref())?);
    }

    Ok(resolved_paths)
}

/// Expand a single glob pattern into filesystem paths.
///
/// Pattern examples:
/// - `"**/*.pdf"`
/// - `"./docs/*.pdf"`
fn collect_paths_for_pattern(pattern: &str) -> Result<Vec<PathBuf>> {
    let paths = glob::glob(pattern)
        .map_err(|err| JoinerError::other(format!("Invalid pattern {pattern}: {err}")))?;

    let mut resolved_paths = Vec::new();
    for entry in paths {
        let path = entry.map_err(|err| JoinerError::other(err.to_string()))?;
        resolved_paths.push(path);
    }

    if resolved_paths.is_empty() && !is_glob(pattern) {
        resolved_paths.push(PathBuf::from(pattern));
    }

    Ok(resolved_paths)
}

fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

/// Format file size as human-readable string.
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{size} bytes")
    }
}
