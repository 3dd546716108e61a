//! # Repository Cache Manager
//!
//! Keeps local shallow clones of the repositories the install draws from.
//!
//! A cache entry is created once with a depth-1 clone. On later runs, unless
//! updates are suppressed, local modifications are discarded and the latest
//! shallow history is fetched. The fetch is not checked out, so content that
//! is already installed does not change underneath a run. Entries are never
//! deleted here.
//!
//! Git access goes through the [`GitOperations`] trait so the policy can be
//! tested without a git binary or network access.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::defaults::{
    CAB_MANIFEST_FILE_NAME, CAB_REPOS_ROOT, CAB_SUPPORT_DIR, CAB_SUPPORT_REPO_URL,
};
use crate::error::Result;
use crate::manifest::Manifest;

/// Trait for git operations - allows faking in tests
pub trait GitOperations {
    /// Clone `url` into `target_dir` with a depth-1 history.
    fn clone_shallow(&self, url: &str, target_dir: &Path) -> Result<()>;

    /// Throw away local modifications in an existing clone.
    fn discard_changes(&self, repo_dir: &Path, url: &str) -> Result<()>;

    /// Fetch the latest depth-1 history without checking it out.
    fn fetch_shallow(&self, repo_dir: &Path, url: &str) -> Result<()>;
}

/// `GitOperations` backed by the system `git` command.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemGit;

impl GitOperations for SystemGit {
    fn clone_shallow(&self, url: &str, target_dir: &Path) -> Result<()> {
        crate::git::clone_shallow(url, target_dir)
    }

    fn discard_changes(&self, repo_dir: &Path, url: &str) -> Result<()> {
        crate::git::discard_changes(repo_dir, url)
    }

    fn fetch_shallow(&self, repo_dir: &Path, url: &str) -> Result<()> {
        crate::git::fetch_shallow(repo_dir, url)
    }
}

/// What [`RepositoryCache::ensure`] did for one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Cloned,
    Refreshed,
    /// The entry exists and updates are suppressed.
    Kept,
}

/// A repository the install needs, and where its clone lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositorySource {
    /// Short name used in messages.
    pub alias: String,
    pub path: PathBuf,
    pub url: String,
}

/// Creates and refreshes cache entries.
pub struct RepositoryCache {
    git: Box<dyn GitOperations>,
    check_updates: bool,
}

impl RepositoryCache {
    /// A cache manager using the system `git`.
    pub fn new(check_updates: bool) -> Self {
        Self::with_git(Box::new(SystemGit), check_updates)
    }

    /// A cache manager using the given git implementation.
    pub fn with_git(git: Box<dyn GitOperations>, check_updates: bool) -> Self {
        Self { git, check_updates }
    }

    pub fn check_updates(&self) -> bool {
        self.check_updates
    }

    /// Make sure `target_dir` holds a clone of `url`.
    pub fn ensure(&self, target_dir: &Path, url: &str) -> Result<SyncOutcome> {
        if target_dir.is_dir() {
            if !self.check_updates {
                debug!(
                    "Skipping update of '{}' in '{}'",
                    url,
                    target_dir.display()
                );
                return Ok(SyncOutcome::Kept);
            }

            info!("Checking for updates in '{}'...", target_dir.display());
            self.git.discard_changes(target_dir, url)?;
            self.git.fetch_shallow(target_dir, url)?;
            return Ok(SyncOutcome::Refreshed);
        }

        info!(
            "Cloning '{}' into '{}', this may take a very long time...",
            url,
            target_dir.display()
        );
        self.git.clone_shallow(url, target_dir)?;
        Ok(SyncOutcome::Cloned)
    }

    /// Ensure a named source.
    pub fn ensure_source(&self, source: &RepositorySource) -> Result<SyncOutcome> {
        debug!("Syncing cache entry '{}'", source.alias);
        self.ensure(&source.path, &source.url)
    }

    /// Ensure the community asset bundle repositories under `cab_root`.
    ///
    /// The support repository is synced first; its `CabRepos.xml` lists the
    /// bundle repositories and the sub-path each one is cached under.
    pub fn sync_community_bundles(&self, cab_root: &Path) -> Result<Vec<RepositorySource>> {
        fs::create_dir_all(cab_root)?;

        let support = RepositorySource {
            alias: CAB_SUPPORT_DIR.to_string(),
            path: cab_root.join(CAB_SUPPORT_DIR),
            url: CAB_SUPPORT_REPO_URL.to_string(),
        };
        self.ensure_source(&support)?;

        let manifest = Manifest::load(&support.path.join(CAB_MANIFEST_FILE_NAME))?;
        let bundles = community_bundle_sources(&manifest, cab_root)?;
        for bundle in &bundles {
            self.ensure_source(bundle)?;
        }
        Ok(bundles)
    }
}

/// Read the bundle repositories listed in a `CabRepos.xml` document.
///
/// Entries missing `cacheSubPath` or `repoUrl` are skipped with a warning.
pub fn community_bundle_sources(manifest: &Manifest, cab_root: &Path) -> Result<Vec<RepositorySource>> {
    let records = manifest.query_records(CAB_REPOS_ROOT, &["cacheSubPath", "repoUrl"])?;

    let mut sources = Vec::new();
    for (index, record) in records.into_iter().enumerate() {
        match record.as_slice() {
            [Some(sub_path), Some(url)] if !sub_path.is_empty() && !url.is_empty() => {
                sources.push(RepositorySource {
                    alias: sub_path.clone(),
                    path: cab_root.join(sub_path),
                    url: url.clone(),
                })
            }
            _ => warn!(
                "Skipping CabRepo entry {} in {}: cacheSubPath and repoUrl are both required",
                index + 1,
                manifest.origin()
            ),
        }
    }
    Ok(sources)
}
