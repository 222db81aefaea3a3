//! Publish step - stage, commit, and push with bounded retry

use eyre::Result;
use tracing::{info, warn};

use crate::config::PushConfig;
use crate::git::GitRepo;

/// Result of a publish attempt
#[derive(Debug, Clone)]
pub enum PublishOutcome {
    /// Commit created and pushed to the remote
    Published,
    /// Nothing was staged, so no commit or push happened
    NoChanges,
    /// Commit created but every push attempt failed; the local commit stays
    /// unpublished until a later cycle pushes it along
    PushFailed { message: String },
}

impl PublishOutcome {
    /// Check if the publish reached the remote
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Published)
    }

    /// Check if the publish was a no-op
    pub fn is_no_changes(&self) -> bool {
        matches!(self, Self::NoChanges)
    }

    /// Get error message if any
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Published | Self::NoChanges => None,
            Self::PushFailed { message } => Some(message),
        }
    }
}

/// Stage all working-tree changes and, when anything is staged, commit and
/// push with bounded retry.
///
/// Staging and commit failures are hard errors - the calling cycle aborts
/// and the loop moves on to the next poll. Push failures are retried up to
/// `retry.max_attempts` with a fixed delay; exhaustion is reported in the
/// outcome, not as an error.
pub async fn publish(repo: &GitRepo, message: &str, retry: &PushConfig) -> Result<PublishOutcome> {
    repo.stage_all().await?;

    if !repo.has_staged_changes().await? {
        info!("Nothing staged, skipping commit and push");
        return Ok(PublishOutcome::NoChanges);
    }

    repo.commit(message).await?;
    info!(%message, "Committed staged changes");

    let mut last_error = String::new();
    for attempt in 1..=retry.max_attempts {
        match repo.push().await {
            Ok(()) => {
                info!(attempt, "Pushed to remote");
                return Ok(PublishOutcome::Published);
            }
            Err(e) => {
                warn!(attempt, max_attempts = retry.max_attempts, error = %e, "Push attempt failed");
                last_error = e.to_string();
                if attempt < retry.max_attempts {
                    tokio::time::sleep(retry.retry_delay()).await;
                }
            }
        }
    }

    Ok(PublishOutcome::PushFailed { message: last_error })
}
