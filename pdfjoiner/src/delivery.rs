//! Handing merged bytes to the user.
//!
//! A [`DownloadSink`] receives the merged PDF under a suggested file name.
//! [`DirectorySink`] saves it into a directory the way a browser saves a
//! download: the bytes are staged in a temporary file next to the target and
//! then published under the final name. The staged file is removed on every
//! path, including a failed publish. [`MemorySink`] keeps deliveries in memory
//! for embedding and tests.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;
use tokio::task;

use crate::config::{Config, DEFAULT_OUTPUT_NAME, OverwriteMode};
use crate::error::{JoinerError, Result};

// Rename mode gives up after `merged (999).pdf`.
const MAX_RENAME_ATTEMPTS: usize = 1000;

/// Receipt for one delivered file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    /// File name the bytes were delivered under.
    pub file_name: String,

    /// Where the file ended up, for sinks that write to disk.
    pub location: Option<PathBuf>,

    /// Number of bytes delivered.
    pub size: u64,

    /// Time taken to deliver.
    pub write_time: Duration,
}

/// Destination for merged documents.
pub trait DownloadSink {
    /// Deliver `bytes` under the suggested `file_name`.
    fn deliver(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
    ) -> impl Future<Output = Result<Delivery>> + Send;
}

/// Saves deliveries into a directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
    overwrite_mode: OverwriteMode,
}

impl DirectorySink {
    /// Create a sink writing into `dir` with the default overwrite mode.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            overwrite_mode: OverwriteMode::default(),
        }
    }

    /// Create a sink for the output directory and overwrite mode of `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.output_dir).with_overwrite_mode(config.overwrite_mode)
    }

    /// Set what happens when the file name is taken.
    pub fn with_overwrite_mode(mut self, overwrite_mode: OverwriteMode) -> Self {
        self.overwrite_mode = overwrite_mode;
        self
    }

    /// Target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Overwrite mode.
    pub fn overwrite_mode(&self) -> OverwriteMode {
        self.overwrite_mode
    }
}

impl DownloadSink for DirectorySink {
    async fn deliver(&self, bytes: Vec<u8>, file_name: &str) -> Result<Delivery> {
        let dir = self.dir.clone();
        let file_name = plain_file_name(file_name);
        let mode = self.overwrite_mode;

        let delivery =
            task::spawn_blocking(move || publish(&dir, &file_name, &bytes, mode)).await??;

        tracing::info!(
            file = %delivery.file_name,
            bytes = delivery.size,
            "delivered merged PDF"
        );

        Ok(delivery)
    }
}

fn publish(dir: &Path, file_name: &str, bytes: &[u8], mode: OverwriteMode) -> Result<Delivery> {
    let start = Instant::now();
    let deliver_error = |path: &Path| {
        let path = path.to_path_buf();
        move |source: io::Error| JoinerError::FailedToDeliver { path, source }
    };

    std::fs::create_dir_all(dir).map_err(deliver_error(dir))?;

    let mut staged = tempfile::Builder::new()
        .prefix(".pdfjoiner-")
        .suffix(".part")
        .tempfile_in(dir)
        .map_err(deliver_error(dir))?;
    staged
        .write_all(bytes)
        .map_err(deliver_error(staged.path()))?;
    staged
        .as_file()
        .sync_all()
        .map_err(deliver_error(staged.path()))?;

    let target = match mode {
        OverwriteMode::Force => {
            let target = dir.join(file_name);
            staged
                .persist(&target)
                .map_err(|err| deliver_error(&target)(err.error))?;
            target
        }
        OverwriteMode::NoClobber => {
            let target = dir.join(file_name);
            persist_new(staged, &target).map_err(|(_, err)| err)?;
            target
        }
        OverwriteMode::Rename => publish_renamed(staged, dir, file_name)?,
    };

    let delivered_name = target
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string());

    tracing::debug!(path = %target.display(), "published staged file");

    Ok(Delivery {
        file_name: delivered_name,
        location: Some(target),
        size: bytes.len() as u64,
        write_time: start.elapsed(),
    })
}

/// Publish under `name`, or the first free `stem (n).ext`.
fn publish_renamed(mut staged: NamedTempFile, dir: &Path, file_name: &str) -> Result<PathBuf> {
    for attempt in 0..MAX_RENAME_ATTEMPTS {
        let target = dir.join(numbered_name(file_name, attempt));
        match persist_new(staged, &target) {
            Ok(()) => return Ok(target),
            Err((Some(file), JoinerError::OutputExists { .. })) => staged = file,
            Err((_, err)) => return Err(err),
        }
    }

    Err(JoinerError::output_exists(dir.join(file_name)))
}

/// Persist without replacing. On a name clash the staged file is handed back.
fn persist_new(
    staged: NamedTempFile,
    target: &Path,
) -> std::result::Result<(), (Option<NamedTempFile>, JoinerError)> {
    match staged.persist_noclobber(target) {
        Ok(_) => Ok(()),
        Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => Err((
            Some(err.file),
            JoinerError::output_exists(target.to_path_buf()),
        )),
        Err(err) => Err((
            None,
            JoinerError::FailedToDeliver {
                path: target.to_path_buf(),
                source: err.error,
            },
        )),
    }
}

/// Reduce a suggested name to a single path component.
///
/// Directory parts are dropped, so a name can never point outside the target
/// directory. Names with nothing usable left become [`DEFAULT_OUTPUT_NAME`].
pub fn plain_file_name(file_name: &str) -> String {
    let last = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    match last {
        "" | "." | ".." => DEFAULT_OUTPUT_NAME.to_string(),
        name => name.replace(':', "_"),
    }
}

/// `merged.pdf`, `merged (1).pdf`, `merged (2).pdf`, ...
pub fn numbered_name(file_name: &str, n: usize) -> String {
    if n == 0 {
        return file_name.to_string();
    }

    let path = Path::new(file_name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match path.extension() {
        Some(ext) => format!("{stem} ({n}).{}", ext.to_string_lossy()),
        None => format!("{stem} ({n})"),
    }
}

/// One delivery captured by a [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredFile {
    /// File name the bytes were delivered under.
    pub file_name: String,
    /// The delivered bytes.
    pub bytes: Vec<u8>,
}

/// Keeps every delivery in memory.
///
/// Clones share the same list of deliveries.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    delivered: Arc<Mutex<Vec<DeliveredFile>>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All deliveries so far, oldest first.
    pub fn delivered(&self) -> Vec<DeliveredFile> {
        self.lock().clone()
    }

    /// The most recent delivery.
    pub fn last(&self) -> Option<DeliveredFile> {
        self.lock().last().cloned()
    }

    /// Number of deliveries so far.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing was delivered yet.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<DeliveredFile>> {
        self.delivered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl DownloadSink for MemorySink {
    async fn deliver(&self, bytes: Vec<u8>, file_name: &str) -> Result<Delivery> {
        let start = Instant::now();
        let size = bytes.len() as u64;

        self.lock().push(DeliveredFile {
            file_name: file_name.to_string(),
            bytes,
        });

        Ok(Delivery {
            file_name: file_name.to_string(),
            location: None,
            size,
            write_time: start.elapsed(),
        })
    }
}
