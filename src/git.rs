//! Thin wrappers around the system `git` command
//!
//! Using the system binary means SSH keys, credential helpers and any
//! authentication configured in `~/.gitconfig` work without extra setup.

use std::fs;
use std::path::Path;
use std::process::Command;

use log::debug;

use crate::error::{Error, Result};

/// Clone `url` into `target_dir` with a depth-1 history.
///
/// Parent directories of `target_dir` are created as needed.
pub fn clone_shallow(url: &str, target_dir: &Path) -> Result<()> {
    if let Some(parent) = target_dir.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut command = Command::new("git");
    command
        .args(["clone", "--depth", "1", url])
        .arg(target_dir);
    run(command, "clone --depth 1", url)
}

/// Discard local modifications to tracked files in `repo_dir`.
pub fn discard_changes(repo_dir: &Path, url: &str) -> Result<()> {
    let mut command = Command::new("git");
    command.args(["checkout", "--", "."]).current_dir(repo_dir);
    run(command, "checkout -- .", url)
}

/// Fetch the latest depth-1 history from `origin` without touching the
/// working tree.
pub fn fetch_shallow(repo_dir: &Path, url: &str) -> Result<()> {
    let mut command = Command::new("git");
    command
        .args(["fetch", "origin", "--depth", "1"])
        .current_dir(repo_dir);
    run(command, "fetch origin --depth 1", url)
}

fn run(mut command: Command, description: &str, url: &str) -> Result<()> {
    let output = command.output().map_err(|e| Error::RepositorySync {
        url: url.to_string(),
        command: description.to_string(),
        message: e.to_string(),
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);

        // Point at the usual culprits for auth failures
        let message = if stderr.contains("Authentication failed")
            || stderr.contains("Permission denied")
            || stderr.contains("Could not read from remote repository")
        {
            format!(
                "Authentication failed. Make sure you have access to the repository.\n\
                Error: {}",
                stderr.trim()
            )
        } else {
            stderr.trim().to_string()
        };

        return Err(Error::RepositorySync {
            url: url.to_string(),
            command: description.to_string(),
            message,
        });
    }

    debug!(
        "git {} for {}: {}",
        description,
        url,
        String::from_utf8_lossy(&output.stderr).trim()
    );
    Ok(())
}
