//! Notification writer - append-only markdown records
//!
//! Each detected change appends one block to the notification file. The file
//! lives inside the monitored repository, so its own history doubles as an
//! audit trail: the code change lands as one commit and the notification of
//! that change as the next.

use eyre::{Context, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::git::HeadCommit;

const FILE_HEADER: &str = "# Notifications\n\nAutomated change records appended by repowatch.\n";

/// Appends markdown notification records
pub struct NotificationWriter {
    path: PathBuf,
    repo_display: String,
}

impl NotificationWriter {
    /// Create a writer for the notification file at `path`, recording
    /// `repo_root` in every block
    pub fn new(path: impl AsRef<Path>, repo_root: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            repo_display: repo_root.as_ref().display().to_string(),
        }
    }

    /// Path of the notification file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record, creating the file with its header when absent.
    ///
    /// The commit line is included only when the repository has at least one
    /// commit reachable from the working head.
    pub fn append(&self, title: &str, body: &str, head: Option<&HeadCommit>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .context(format!("Failed to create notification directory {}", parent.display()))?;
        }

        let is_new = !self.path.exists();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .context(format!("Failed to open notification file {}", self.path.display()))?;

        if is_new {
            debug!(path = %self.path.display(), "NotificationWriter: creating file with header");
            write!(file, "{}", FILE_HEADER)?;
        }

        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        writeln!(file, "\n## {}\n", title)?;
        writeln!(file, "- **Time:** {}", timestamp)?;
        writeln!(file, "- **Repository:** {}", self.repo_display)?;
        if let Some(head) = head {
            writeln!(file, "- **Commit:** `{}` {}", head.short_hash, head.subject)?;
        }
        writeln!(file, "\n{}", body)?;
        file.flush()?;

        debug!(%title, "NotificationWriter: record appended");
        Ok(())
    }
}
