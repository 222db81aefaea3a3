//! Event log - append-only plain-text history
//!
//! One timestamped line per event. Distinct from the tracing diagnostics on
//! stderr: this file lives in the repository and records what the monitor
//! did, cycle by cycle.

use eyre::{Context, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append-only event log
pub struct EventLog {
    path: PathBuf,
}

impl EventLog {
    /// Create a log backed by the given file path
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one timestamped line, creating the file and parent
    /// directories as needed
    pub fn append(&self, message: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context(format!("Failed to create log directory {}", parent.display()))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .context(format!("Failed to open event log {}", self.path.display()))?;

        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        writeln!(file, "[{}] {}", timestamp, message)?;
        file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_append_creates_file() {
        let temp = tempdir().unwrap();
        let log = EventLog::new(temp.path().join("state/events.log"));

        log.append("monitor started").unwrap();

        let content = fs::read_to_string(log.path()).unwrap();
        assert!(content.contains("monitor started"));
        assert!(content.starts_with('['));
    }

    #[test]
    fn test_append_accumulates_lines() {
        let temp = tempdir().unwrap();
        let log = EventLog::new(temp.path().join("events.log"));

        log.append("one").unwrap();
        log.append("two").unwrap();
        log.append("three").unwrap();

        let content = fs::read_to_string(log.path()).unwrap();
        assert_eq!(content.lines().count(), 3);
    }
}
