//! repowatch - change-detection-and-publish loop
//!
//! CLI entry point.

use std::path::PathBuf;

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use tracing::{debug, info};

use repowatch::checksum;
use repowatch::cli::{Cli, Command, OutputFormat};
use repowatch::config::Config;
use repowatch::git::GitRepo;
use repowatch::watcher::{CycleOutcome, Monitor};

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    debug!(?level, "Logging initialized");
    Ok(())
}

/// Startup-fatal checks: unresolvable repository or missing git binary
/// terminate the process before the loop ever starts.
fn startup_checks(config: &Config) -> Result<()> {
    config.validate()?;
    GitRepo::ensure_available()?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose).context("Failed to setup logging")?;

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    // Dispatch command
    match cli.command {
        Some(Command::Fingerprint { path, format }) => cmd_fingerprint(&config, path, format),
        Some(Command::Check { format }) => {
            startup_checks(&config)?;
            cmd_check(config, format).await
        }
        Some(Command::Run) | None => {
            startup_checks(&config)?;
            cmd_run(config).await
        }
    }
}

/// Run the monitor loop until terminated
async fn cmd_run(config: Config) -> Result<()> {
    info!(
        repo = %config.repository.path.display(),
        target = %config.watch.target.display(),
        "Starting repowatch"
    );

    let monitor = Monitor::new(config)?;

    tokio::select! {
        result = monitor.run() => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupt received, shutting down");
            Ok(())
        }
    }
}

/// Run a single poll cycle and report the outcome
async fn cmd_check(config: Config, format: OutputFormat) -> Result<()> {
    let mut monitor = Monitor::new(config)?;
    let outcome = monitor.check_once().await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        OutputFormat::Text => match &outcome {
            CycleOutcome::Baseline { fingerprint } => {
                println!("{} baseline established ({})", "✓".green(), &fingerprint[..12]);
            }
            CycleOutcome::Unchanged => {
                println!("{} unchanged", "✓".green());
            }
            CycleOutcome::TargetMissing => {
                println!("{} target missing", "⚠".yellow());
            }
            CycleOutcome::NothingToPublish => {
                println!("{} change detected but nothing to publish", "⚠".yellow());
            }
            CycleOutcome::Published { commit } => match commit {
                Some(commit) => println!("{} published ({})", "✓".green(), commit),
                None => println!("{} published", "✓".green()),
            },
            CycleOutcome::PushFailed { message } => {
                println!("{} push failed: {}", "✗".red(), message);
            }
        },
    }

    Ok(())
}

/// Compute and print a fingerprint
fn cmd_fingerprint(config: &Config, path: Option<PathBuf>, format: OutputFormat) -> Result<()> {
    let path = path.unwrap_or_else(|| config.target_path());
    let fingerprint = checksum::fingerprint(&path)?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "path": path.to_string_lossy(),
                "fingerprint": fingerprint,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => match fingerprint {
            Some(hash) => println!("{}", hash),
            None => println!("target absent: {}", path.display()),
        },
    }

    Ok(())
}
