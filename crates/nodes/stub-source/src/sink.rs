//! Append-mode JSONL output sink

use framepipe_core::Result;
use serde_json::Value;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Newline-delimited JSON writer over an append-mode file
///
/// Each emitted event becomes one line, written in a single call and
/// flushed immediately, so a tail reader only ever observes complete
/// lines.
pub struct JsonlSink {
    path: PathBuf,
    file: File,
}

impl JsonlSink {
    /// Open (or create) the sink at `path`, creating parent directories
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    /// Destination path this sink writes to
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one event as a JSON line and flush
    pub fn emit(&mut self, event: &Value) -> Result<()> {
        let mut line = serde_json::to_string(event)?;
        line.push('\n');
        self.file.write_all(line.as_bytes())?;
        self.file.flush()?;
        Ok(())
    }

    /// Flush and close the sink
    pub fn close(mut self) -> Result<()> {
        self.file.flush()?;
        Ok(())
    }
}
