//! Git plumbing for the publish step
//!
//! All version-control work goes through the external `git` binary against a
//! pre-existing repository; repowatch never initializes, clones, or
//! configures the repository itself.

use std::path::{Path, PathBuf};
use std::process::Output;

use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Errors from invoking git
#[derive(Debug, Error)]
pub enum GitError {
    #[error("git {command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("failed to run git: {0}")]
    Io(#[from] std::io::Error),
}

/// The most recent commit reachable from the working head
#[derive(Debug, Clone)]
pub struct HeadCommit {
    /// Abbreviated commit hash
    pub short_hash: String,
    /// First line of the commit message
    pub subject: String,
}

/// Handle on the monitored repository
pub struct GitRepo {
    root: PathBuf,
    remote: String,
    branch: String,
}

impl GitRepo {
    /// Create a handle for the repository at `root`
    pub fn new(root: impl AsRef<Path>, remote: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            remote: remote.into(),
            branch: branch.into(),
        }
    }

    /// Repository root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Verify the `git` binary is available.
    ///
    /// Called once at startup; a missing binary is fatal.
    pub fn ensure_available() -> eyre::Result<()> {
        let result = std::process::Command::new("git").arg("--version").output();
        match result {
            Ok(output) if output.status.success() => {
                let version = String::from_utf8_lossy(&output.stdout);
                debug!(version = %version.trim(), "git binary available");
                Ok(())
            }
            _ => Err(eyre::eyre!("Required tool 'git' not found on PATH")),
        }
    }

    async fn git(&self, args: &[&str]) -> Result<Output, GitError> {
        debug!(?args, "GitRepo: running git");
        let output = Command::new("git").args(args).current_dir(&self.root).output().await?;
        Ok(output)
    }

    fn require_success(command: &str, output: &Output) -> Result<(), GitError> {
        if output.status.success() {
            Ok(())
        } else {
            Err(GitError::CommandFailed {
                command: command.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }

    /// Stage all working-tree changes (`git add -A`)
    pub async fn stage_all(&self) -> Result<(), GitError> {
        let output = self.git(&["add", "-A"]).await?;
        Self::require_success("add", &output)
    }

    /// Stage a single path (`git add <path>`)
    pub async fn stage_path(&self, path: &Path) -> Result<(), GitError> {
        let path = path.to_string_lossy();
        let output = self.git(&["add", "--", path.as_ref()]).await?;
        Self::require_success("add", &output)
    }

    /// Whether anything is currently staged.
    ///
    /// `git diff --cached --quiet` exits 1 when the index differs from HEAD
    /// and 0 when it does not; any other status is a real failure.
    pub async fn has_staged_changes(&self) -> Result<bool, GitError> {
        let output = self.git(&["diff", "--cached", "--quiet"]).await?;
        match output.status.code() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(GitError::CommandFailed {
                command: "diff --cached".to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }),
        }
    }

    /// Commit staged changes with the given message
    pub async fn commit(&self, message: &str) -> Result<(), GitError> {
        let output = self.git(&["commit", "-m", message]).await?;
        Self::require_success("commit", &output)
    }

    /// Push the configured branch to the configured remote
    pub async fn push(&self) -> Result<(), GitError> {
        let output = self.git(&["push", &self.remote, &self.branch]).await?;
        Self::require_success("push", &output)
    }

    /// Look up the most recent commit reachable from the working head.
    ///
    /// Returns `None` when the repository has no commits yet.
    pub async fn head_commit(&self) -> Result<Option<HeadCommit>, GitError> {
        let output = self.git(&["log", "-1", "--format=%h%x1f%s"]).await?;
        if !output.status.success() {
            // No commits yet - `git log` fails on an unborn branch
            return Ok(None);
        }

        let line = String::from_utf8_lossy(&output.stdout);
        let line = line.trim();
        let Some((short_hash, subject)) = line.split_once('\u{1f}') else {
            return Ok(None);
        };

        Ok(Some(HeadCommit {
            short_hash: short_hash.to_string(),
            subject: subject.to_string(),
        }))
    }
}
