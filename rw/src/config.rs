//! repowatch configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main repowatch configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Repository location and remote settings
    pub repository: RepositoryConfig,

    /// Watch target and polling settings
    pub watch: WatchConfig,

    /// Push retry settings
    pub push: PushConfig,

    /// Notification file settings
    pub notify: NotifyConfig,

    /// Event log settings
    pub events: EventsConfig,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Checks that the repository path resolves to an actual git repository.
    /// Call this early in startup to fail fast with clear error messages.
    pub fn validate(&self) -> Result<()> {
        let repo = &self.repository.path;
        if !repo.exists() {
            return Err(eyre::eyre!("Repository path does not exist: {}", repo.display()));
        }
        if !repo.join(".git").exists() {
            return Err(eyre::eyre!(
                "Not a git repository: {}. repowatch requires an initialized repo with a configured remote.",
                repo.display()
            ));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .repowatch.yml
        let local_config = PathBuf::from(".repowatch.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/repowatch/repowatch.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("repowatch").join("repowatch.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Absolute path of the watched target
    pub fn target_path(&self) -> PathBuf {
        self.repository.path.join(&self.watch.target)
    }

    /// Absolute path of the fingerprint store file
    pub fn fingerprint_path(&self) -> PathBuf {
        self.repository.path.join(&self.watch.fingerprint_file)
    }

    /// Absolute path of the notification file
    pub fn notify_path(&self) -> PathBuf {
        self.repository.path.join(&self.notify.file)
    }

    /// Absolute path of the event log file
    pub fn event_log_path(&self) -> PathBuf {
        self.repository.path.join(&self.events.file)
    }
}

/// Repository location and remote settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Path to the repository root
    pub path: PathBuf,

    /// Remote name to push to
    pub remote: String,

    /// Branch name to push
    pub branch: String,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("."),
            remote: "origin".to_string(),
            branch: "main".to_string(),
        }
    }
}

/// Watch target and polling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Target to watch, relative to the repository root (file or directory)
    pub target: PathBuf,

    /// Polling interval in seconds
    #[serde(rename = "poll-interval-secs")]
    pub poll_interval_secs: u64,

    /// File holding the last computed fingerprint, relative to the repository root
    #[serde(rename = "fingerprint-file")]
    pub fingerprint_file: PathBuf,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            target: PathBuf::from("."),
            poll_interval_secs: 30,
            fingerprint_file: PathBuf::from(".repowatch/fingerprint"),
        }
    }
}

impl WatchConfig {
    /// Get the poll interval as a Duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

/// Push retry settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PushConfig {
    /// Maximum push attempts per publish
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Delay between push attempts in seconds
    #[serde(rename = "retry-delay-secs")]
    pub retry_delay_secs: u64,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay_secs: 5,
        }
    }
}

impl PushConfig {
    /// Get the retry delay as a Duration
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

/// Notification file settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// Notification file, relative to the repository root
    pub file: PathBuf,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("NOTIFICATIONS.md"),
        }
    }
}

/// Event log settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    /// Event log file, relative to the repository root
    pub file: PathBuf,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from(".repowatch/events.log"),
        }
    }
}
