//! Content fingerprinting for watched paths
//!
//! A fingerprint is a SHA-256 hex string over the target's content. For a
//! directory the per-file digests are concatenated in sorted relative-path
//! order and hashed again, so the result is independent of filesystem
//! iteration order.

use eyre::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Compute the fingerprint of a file or directory.
///
/// Returns `Ok(None)` when the path is missing or the directory contains no
/// regular files - the "target absent" signal, which the poll loop treats as
/// a transient condition rather than an error.
pub fn fingerprint(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        debug!(path = %path.display(), "fingerprint: target does not exist");
        return Ok(None);
    }

    if path.is_file() {
        let digest = hash_file(path)?;
        return Ok(Some(digest));
    }

    let files = collect_files(path)?;
    if files.is_empty() {
        debug!(path = %path.display(), "fingerprint: no regular files under target");
        return Ok(None);
    }

    let mut combined = String::with_capacity(files.len() * 64);
    for rel in &files {
        combined.push_str(&hash_file(&path.join(rel))?);
    }

    let mut hasher = Sha256::new();
    hasher.update(combined.as_bytes());
    Ok(Some(hex::encode(hasher.finalize())))
}

/// SHA-256 of a single file's bytes, hex-encoded
fn hash_file(path: &Path) -> Result<String> {
    let bytes = fs::read(path).context(format!("Failed to read {}", path.display()))?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

/// Enumerate regular files under `root`, as sorted relative paths.
///
/// Hidden entries (dot-prefixed names below the root) are skipped so that
/// `.git/` and repowatch's own state files never feed their own trigger.
fn collect_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    let walker = WalkDir::new(root).into_iter().filter_entry(|entry| {
        entry.depth() == 0
            || !entry
                .file_name()
                .to_str()
                .map(|name| name.starts_with('.'))
                .unwrap_or(false)
    });

    for entry in walker {
        let entry = entry.context(format!("Failed to walk {}", root.display()))?;
        if entry.file_type().is_file() {
            let rel = entry
                .path()
                .strip_prefix(root)
                .expect("walkdir yields paths under its root")
                .to_path_buf();
            files.push(rel);
        }
    }

    files.sort();
    Ok(files)
}
