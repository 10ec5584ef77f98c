//! Append-only diagnostic log
//!
//! Every tool invocation leaves a trail of `[YYYY-MM-DD HH:MM:SS] message` lines
//! in a plain text file. The file is reopened in append mode for each line and
//! never read back. Writes are best effort: a failure is reported through
//! `tracing` and otherwise ignored.

use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use parking_lot::Mutex;

/// The file name used when the log is placed next to the executable
pub const DEFAULT_LOG_FILE_NAME: &str = "virtuoso_server_log.txt";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A shared handle to the diagnostic log.
///
/// Cloning is cheap; all clones serialize their appends through the same lock
/// so concurrent invocations never interleave partial lines.
#[derive(Clone, Debug)]
pub struct DiagnosticLog {
    inner: Option<Arc<Sink>>,
}

#[derive(Debug)]
struct Sink {
    path: PathBuf,
    lock: Mutex<()>,
}

impl DiagnosticLog {
    /// Open a log at the given path, creating the file and its parent
    /// directories if necessary.
    pub fn open(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            inner: Some(Arc::new(Sink {
                path,
                lock: Mutex::new(()),
            })),
        })
    }

    /// A log that discards everything
    pub fn disabled() -> Self {
        Self { inner: None }
    }

    /// The default location: next to the running executable
    pub fn default_path() -> std::io::Result<PathBuf> {
        let exe = std::env::current_exe()?;
        Ok(exe
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
            .join(DEFAULT_LOG_FILE_NAME))
    }

    pub fn path(&self) -> Option<&Path> {
        self.inner.as_ref().map(|sink| sink.path.as_path())
    }

    /// Append a single timestamped line
    pub fn log(&self, message: impl AsRef<str>) {
        let Some(sink) = &self.inner else {
            return;
        };

        let line = format!(
            "[{}] {}\n",
            Local::now().format(TIMESTAMP_FORMAT),
            message.as_ref()
        );

        let _guard = sink.lock.lock();
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&sink.path)
            .and_then(|mut file| file.write_all(line.as_bytes()));

        if let Err(e) = result {
            tracing::warn!(path = ?sink.path, "Failed to write diagnostic log: {e}");
        }
    }
}

impl Default for DiagnosticLog {
    fn default() -> Self {
        Self::disabled()
    }
}
