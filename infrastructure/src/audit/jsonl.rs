//! JSONL file writer for audit events.
//!
//! Each [`AuditEvent`] is serialized as a single JSON line and appended
//! via a buffered writer. Audit is a side channel: any IO failure is
//! logged and dropped, never surfaced to the engine.

use plenum_application::ports::audit::{AuditEvent, AuditSink};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// JSONL audit sink that writes one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes on every emit so a
/// crash loses at most the event being written.
pub struct JsonlAuditSink {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlAuditSink {
    /// Create a sink appending to the given path.
    ///
    /// Creates the file (and parent directories) if they don't exist.
    /// Returns `None` if the file cannot be opened.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create audit log directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open audit log file {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Get the path to the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditSink for JsonlAuditSink {
    fn emit(&self, event: AuditEvent) {
        let line = match serde_json::to_string(&event) {
            Ok(line) => line,
            Err(e) => {
                warn!("Could not serialize audit event: {}", e);
                return;
            }
        };
        let Ok(mut writer) = self.writer.lock() else {
            warn!("Audit writer lock poisoned; event dropped");
            return;
        };
        if let Err(e) = writeln!(writer, "{line}") {
            warn!("Could not write audit event: {}", e);
            return;
        }
        if let Err(e) = writer.flush() {
            warn!("Could not flush audit log: {}", e);
        }
    }
}
