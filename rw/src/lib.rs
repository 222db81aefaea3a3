//! repowatch - change-detection-and-publish loop
//!
//! repowatch polls a path inside a git repository at a fixed interval. When
//! the content fingerprint changes it stages, commits, and pushes the
//! working tree, then appends a markdown notification record and commits
//! that too - two commits per change, code first, notification second, so
//! the notification file's own history is an audit trail.
//!
//! # Modules
//!
//! - [`checksum`] - content fingerprinting (file or directory)
//! - [`store`] - persistence of the last computed fingerprint
//! - [`publish`] - stage/commit/push with bounded push retry
//! - [`notify`] - append-only markdown notification records
//! - [`watcher`] - the poll loop
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface

pub mod checksum;
pub mod cli;
pub mod config;
pub mod eventlog;
pub mod git;
pub mod notify;
pub mod publish;
pub mod store;
pub mod watcher;

// Re-export commonly used types
pub use config::{Config, EventsConfig, NotifyConfig, PushConfig, RepositoryConfig, WatchConfig};
pub use eventlog::EventLog;
pub use git::{GitError, GitRepo, HeadCommit};
pub use notify::NotificationWriter;
pub use publish::{PublishOutcome, publish};
pub use store::FingerprintStore;
pub use watcher::{CycleOutcome, Monitor};
