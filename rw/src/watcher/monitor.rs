//! Poll loop implementation

use eyre::Result;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::checksum;
use crate::config::Config;
use crate::eventlog::EventLog;
use crate::git::GitRepo;
use crate::notify::NotificationWriter;
use crate::publish::{PublishOutcome, publish};
use crate::store::FingerprintStore;

/// What a single poll cycle did
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum CycleOutcome {
    /// First run: fingerprint persisted without treating it as a change
    Baseline { fingerprint: String },
    /// Fingerprint matches the last known value
    Unchanged,
    /// Target is missing or holds no regular files; transient, retried next cycle
    TargetMissing,
    /// Change detected but the staged set came up empty
    NothingToPublish,
    /// Change committed and pushed; notification recorded
    Published { commit: Option<String> },
    /// Change committed locally but every push attempt failed; no
    /// notification is written this cycle
    PushFailed { message: String },
}

/// The Monitor polls the watched target and publishes detected changes
pub struct Monitor {
    config: Config,
    repo: GitRepo,
    store: FingerprintStore,
    notifier: NotificationWriter,
    events: EventLog,
    last_fingerprint: Option<String>,
}

impl Monitor {
    /// Create a monitor from a validated configuration.
    ///
    /// Seeds the in-memory fingerprint from the store, so a restart does not
    /// re-baseline: content that changed while the process was down is
    /// detected on the first cycle.
    pub fn new(config: Config) -> Result<Self> {
        let repo = GitRepo::new(
            &config.repository.path,
            config.repository.remote.clone(),
            config.repository.branch.clone(),
        );
        let store = FingerprintStore::new(config.fingerprint_path());
        let notifier = NotificationWriter::new(config.notify_path(), &config.repository.path);
        let events = EventLog::new(config.event_log_path());

        let last_fingerprint = store.load()?;
        debug!(seeded = last_fingerprint.is_some(), "Monitor::new: loaded stored fingerprint");

        Ok(Self {
            config,
            repo,
            store,
            notifier,
            events,
            last_fingerprint,
        })
    }

    /// Get the last known fingerprint
    pub fn last_fingerprint(&self) -> Option<&str> {
        self.last_fingerprint.as_deref()
    }

    /// Set the last known fingerprint (for testing or recovery)
    pub fn set_last_fingerprint(&mut self, fingerprint: Option<String>) {
        self.last_fingerprint = fingerprint;
    }

    /// Run a single poll cycle
    pub async fn check_once(&mut self) -> Result<CycleOutcome> {
        let target = self.config.target_path();

        let Some(current) = checksum::fingerprint(&target)? else {
            warn!(target = %target.display(), "Watched target is missing");
            self.events
                .append(&format!("target missing: {}", self.config.watch.target.display()))?;
            return Ok(CycleOutcome::TargetMissing);
        };

        let Some(last) = &self.last_fingerprint else {
            info!(fingerprint = %current, "Initial fingerprint established");
            self.store.save(&current)?;
            self.events.append("baseline fingerprint established")?;
            self.last_fingerprint = Some(current.clone());
            return Ok(CycleOutcome::Baseline { fingerprint: current });
        };

        if last == &current {
            debug!(fingerprint = %current, "Target unchanged");
            return Ok(CycleOutcome::Unchanged);
        }

        info!(
            old = %last,
            new = %current,
            target = %self.config.watch.target.display(),
            "Change detected"
        );

        self.store.save(&current)?;
        self.last_fingerprint = Some(current.clone());

        let target_display = self.config.watch.target.display().to_string();
        let message = format!("Auto-commit: Changes detected in {}", target_display);

        match publish(&self.repo, &message, &self.config.push).await? {
            PublishOutcome::NoChanges => {
                self.events
                    .append("change detected but nothing was staged; no commit made")?;
                Ok(CycleOutcome::NothingToPublish)
            }
            PublishOutcome::PushFailed { message: push_error } => {
                self.events.append(&format!(
                    "push failed after {} attempts: {}",
                    self.config.push.max_attempts, push_error
                ))?;
                Ok(CycleOutcome::PushFailed { message: push_error })
            }
            PublishOutcome::Published => {
                let head = self.repo.head_commit().await?;
                let commit = head.as_ref().map(|h| h.short_hash.clone());

                let body = format!(
                    "Content change in `{}` was committed and pushed automatically.",
                    target_display
                );
                self.notifier.append(&message, &body, head.as_ref())?;
                self.repo.stage_path(&self.config.notify.file).await?;

                // The notification rides in its own commit, after the change
                match publish(&self.repo, "Auto-commit: Notification update", &self.config.push).await? {
                    PublishOutcome::Published => {
                        debug!("Notification commit pushed");
                    }
                    PublishOutcome::NoChanges => {
                        debug!("Notification produced no staged changes");
                    }
                    PublishOutcome::PushFailed { message: push_error } => {
                        warn!(error = %push_error, "Notification push failed; commit remains local");
                        self.events
                            .append(&format!("notification push failed: {}", push_error))?;
                    }
                }

                self.events.append(&format!(
                    "change in {} published{}",
                    target_display,
                    commit.as_deref().map(|c| format!(" as {}", c)).unwrap_or_default()
                ))?;

                Ok(CycleOutcome::Published { commit })
            }
        }
    }

    /// Run the poll loop
    ///
    /// Runs until the process is terminated. Cycle errors are logged and the
    /// loop continues; only startup failures terminate the process.
    pub async fn run(mut self) -> Result<()> {
        info!(
            interval_secs = self.config.watch.poll_interval_secs,
            target = %self.config.watch.target.display(),
            repo = %self.config.repository.path.display(),
            "Monitor started"
        );

        loop {
            match self.check_once().await {
                Ok(outcome) => {
                    debug!(?outcome, "Poll cycle finished");
                }
                Err(e) => {
                    error!(error = %e, "Error during poll cycle");
                    if let Err(log_err) = self.events.append(&format!("cycle error: {:#}", e)) {
                        warn!(error = %log_err, "Failed to record cycle error in event log");
                    }
                }
            }

            // Sleep until next poll
            tokio::time::sleep(self.config.watch.poll_interval()).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;
    use tokio::process::Command;

    async fn setup_git_repo(dir: &Path) {
        Command::new("git").args(["init"]).current_dir(dir).output().await.unwrap();
        Command::new("git")
            .args(["config", "user.email", "test@test.com"])
            .current_dir(dir)
            .output()
            .await
            .unwrap();
        Command::new("git")
            .args(["config", "user.name", "Test"])
            .current_dir(dir)
            .output()
            .await
            .unwrap();
        Command::new("git")
            .args(["commit", "--allow-empty", "-m", "initial"])
            .current_dir(dir)
            .output()
            .await
            .unwrap();
    }

    async fn commit_count(dir: &Path) -> usize {
        let output = Command::new("git")
            .args(["rev-list", "--count", "HEAD"])
            .current_dir(dir)
            .output()
            .await
            .unwrap();
        String::from_utf8_lossy(&output.stdout).trim().parse().unwrap()
    }

    fn test_config(repo: &Path, target: &str) -> Config {
        let mut config = Config::default();
        config.repository.path = repo.to_path_buf();
        config.watch.target = target.into();
        config.push.max_attempts = 1;
        config.push.retry_delay_secs = 0;
        config
    }

    #[tokio::test]
    async fn test_monitor_starts_without_stored_fingerprint() {
        let temp = tempdir().unwrap();
        setup_git_repo(temp.path()).await;

        let monitor = Monitor::new(test_config(temp.path(), "data.txt")).unwrap();
        assert!(monitor.last_fingerprint().is_none());
    }

    #[tokio::test]
    async fn test_first_check_establishes_baseline_without_commit() {
        let temp = tempdir().unwrap();
        setup_git_repo(temp.path()).await;
        fs::write(temp.path().join("data.txt"), "a").unwrap();

        let before = commit_count(temp.path()).await;
        let mut monitor = Monitor::new(test_config(temp.path(), "data.txt")).unwrap();

        let outcome = monitor.check_once().await.unwrap();
        assert!(matches!(outcome, CycleOutcome::Baseline { .. }));
        assert!(monitor.last_fingerprint().is_some());

        // Baseline is silent: no commit
        assert_eq!(commit_count(temp.path()).await, before);

        // And it is persisted
        let store = FingerprintStore::new(temp.path().join(".repowatch/fingerprint"));
        assert_eq!(store.load().unwrap().as_deref(), monitor.last_fingerprint());
    }

    #[tokio::test]
    async fn test_unchanged_after_baseline() {
        let temp = tempdir().unwrap();
        setup_git_repo(temp.path()).await;
        fs::write(temp.path().join("data.txt"), "a").unwrap();

        let mut monitor = Monitor::new(test_config(temp.path(), "data.txt")).unwrap();
        let _ = monitor.check_once().await.unwrap();

        let outcome = monitor.check_once().await.unwrap();
        assert!(matches!(outcome, CycleOutcome::Unchanged));
    }

    #[tokio::test]
    async fn test_missing_target_is_transient() {
        let temp = tempdir().unwrap();
        setup_git_repo(temp.path()).await;

        let before = commit_count(temp.path()).await;
        let mut monitor = Monitor::new(test_config(temp.path(), "data.txt")).unwrap();

        let outcome = monitor.check_once().await.unwrap();
        assert!(matches!(outcome, CycleOutcome::TargetMissing));

        // No git side effects, and the miss is event-logged
        assert_eq!(commit_count(temp.path()).await, before);
        let log = fs::read_to_string(temp.path().join(".repowatch/events.log")).unwrap();
        assert!(log.contains("target missing"));

        // The next cycle still runs normally once the target appears
        fs::write(temp.path().join("data.txt"), "a").unwrap();
        let outcome = monitor.check_once().await.unwrap();
        assert!(matches!(outcome, CycleOutcome::Baseline { .. }));
    }

    #[tokio::test]
    async fn test_restart_reuses_stored_fingerprint() {
        let temp = tempdir().unwrap();
        setup_git_repo(temp.path()).await;
        fs::write(temp.path().join("data.txt"), "a").unwrap();

        {
            let mut monitor = Monitor::new(test_config(temp.path(), "data.txt")).unwrap();
            let _ = monitor.check_once().await.unwrap();
        }

        // A fresh monitor seeds from the store instead of re-baselining
        let monitor = Monitor::new(test_config(temp.path(), "data.txt")).unwrap();
        assert!(monitor.last_fingerprint().is_some());
    }

    #[tokio::test]
    async fn test_set_last_fingerprint() {
        let temp = tempdir().unwrap();
        setup_git_repo(temp.path()).await;

        let mut monitor = Monitor::new(test_config(temp.path(), "data.txt")).unwrap();
        monitor.set_last_fingerprint(Some("abc123".to_string()));
        assert_eq!(monitor.last_fingerprint(), Some("abc123"));
    }
}
