//! # Task Interpreter
//!
//! Walks the selected tasks of a manifest in document order and performs
//! each one against the repository cache and the mod directory.
//!
//! Relative source paths resolve against the cache root and relative target
//! paths against the mod root. An empty path means the root itself.
//!
//! Blacklisted identifiers are handled elsewhere (ModTek and the performance
//! fix need special treatment) and never reach [`Interpreter::dispatch`]
//! from [`Interpreter::run`].

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};

use crate::config::FailurePolicy;
use crate::defaults::TASK_BLACKLIST;
use crate::error::{Error, Result};
use crate::filesystem::{self, CopyOutcome};
use crate::manifest::Manifest;
use crate::merge::JsonMerger;
use crate::task::{selected_task_ids, InstallTask, TaskJob};

/// What happened to a single dispatched task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The task's work ran.
    Executed,
    /// The job type is not one the interpreter knows.
    Unsupported,
}

/// Task identifiers by outcome, in the order they were processed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub executed: Vec<String>,
    /// Blacklisted tasks.
    pub skipped: Vec<String>,
    pub unsupported: Vec<String>,
    /// Only populated under [`FailurePolicy::Continue`].
    pub failed: Vec<String>,
}

impl RunReport {
    /// Number of tasks seen by the run.
    pub fn total(&self) -> usize {
        self.executed.len() + self.skipped.len() + self.unsupported.len() + self.failed.len()
    }
}

/// Executes manifest tasks.
pub struct Interpreter<'a> {
    cache_root: PathBuf,
    mod_root: PathBuf,
    merger: &'a dyn JsonMerger,
    policy: FailurePolicy,
    blacklist: BTreeSet<String>,
}

impl<'a> Interpreter<'a> {
    /// An interpreter with the default blacklist and [`FailurePolicy::Abort`].
    pub fn new(cache_root: &Path, mod_root: &Path, merger: &'a dyn JsonMerger) -> Self {
        Self {
            cache_root: cache_root.to_path_buf(),
            mod_root: mod_root.to_path_buf(),
            merger,
            policy: FailurePolicy::default(),
            blacklist: TASK_BLACKLIST.iter().map(|id| id.to_string()).collect(),
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the blacklist.
    pub fn with_blacklist<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blacklist = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_blacklisted(&self, id: &str) -> bool {
        self.blacklist.contains(id)
    }

    /// Run every selected task of `manifest`.
    ///
    /// Under [`FailurePolicy::Abort`] the first failing task's error is
    /// returned. Under [`FailurePolicy::Continue`] failures are collected and
    /// reported together as [`Error::TasksFailed`], except that an
    /// [`Error::ExternalTool`] or [`Error::Merge`] failure always ends the
    /// run.
    pub fn run(&self, manifest: &Manifest) -> Result<RunReport> {
        let mut report = RunReport::default();

        for id in selected_task_ids(manifest)? {
            if self.is_blacklisted(&id) {
                debug!("Skipping blacklisted task {}", id);
                report.skipped.push(id);
                continue;
            }

            let outcome = InstallTask::from_manifest(manifest, &id).and_then(|task| match task {
                Some(task) => self.dispatch(&task),
                None => Err(Error::ManifestIntegrity {
                    task: id.clone(),
                    message: "selected task could not be read back".to_string(),
                }),
            });

            match outcome {
                Ok(Dispatch::Executed) => report.executed.push(id),
                Ok(Dispatch::Unsupported) => report.unsupported.push(id),
                Err(e) => match self.policy {
                    // A failed patch or merge leaves the install in an unknown state
                    _ if is_fatal(&e) => return Err(e),
                    FailurePolicy::Abort => return Err(e),
                    FailurePolicy::Continue => {
                        error!("Task {} failed: {}", id, e);
                        report.failed.push(id);
                    }
                },
            }
        }

        debug!(
            "Processed {} tasks: {} executed, {} skipped, {} unsupported, {} failed",
            report.total(),
            report.executed.len(),
            report.skipped.len(),
            report.unsupported.len(),
            report.failed.len()
        );

        if !report.failed.is_empty() {
            return Err(Error::TasksFailed {
                failed: report.failed,
            });
        }
        Ok(report)
    }

    /// Perform one task, whatever its selection state.
    pub fn dispatch(&self, task: &InstallTask) -> Result<Dispatch> {
        match &task.job {
            TaskJob::NoOp => {
                debug!("Skipping NoOp install task {}", task.id);
                return Ok(Dispatch::Executed);
            }
            TaskJob::Unsupported(kind) => {
                warn!(
                    "Skipping unsupported install type {} for task {}",
                    kind, task.id
                );
                return Ok(Dispatch::Unsupported);
            }
            _ => {}
        }

        info!("Installing {}...", task.id);
        match &task.job {
            TaskJob::Install { source, target } => {
                self.install_component(task, source, target)?;
            }
            TaskJob::MultiComponentInstall { sources, targets } => {
                if sources.len() != targets.len() {
                    return Err(Error::ManifestIntegrity {
                        task: task.id.clone(),
                        message: format!(
                            "{} source paths but {} target paths",
                            sources.len(),
                            targets.len()
                        ),
                    });
                }
                for (source, target) in sources.iter().zip(targets) {
                    self.install_component(task, source, target)?;
                }
            }
            TaskJob::BasicJsonMerge { source, target } => {
                let source = self.source_path(source);
                if !source.exists() {
                    warn!(
                        "Missing merge source '{}' for task {}",
                        source.display(),
                        task.id
                    );
                } else {
                    self.merger.merge(&source, &self.target_path(target))?;
                }
            }
            TaskJob::NoOp | TaskJob::Unsupported(_) => {}
        }
        Ok(Dispatch::Executed)
    }

    fn install_component(&self, task: &InstallTask, source: &str, target: &str) -> Result<()> {
        let source = self.source_path(source);
        let target = self.target_path(target);
        match filesystem::copy_excluding(&source, &target, &task.exclude)? {
            CopyOutcome::Copied { copied, skipped } => debug!(
                "{}: copied {} entries from '{}' ({} excluded)",
                task.id,
                copied,
                source.display(),
                skipped
            ),
            CopyOutcome::SourceMissing => {
                debug!("{}: nothing copied from '{}'", task.id, source.display())
            }
        }
        Ok(())
    }

    /// `relative` under the cache root; empty means the root.
    pub fn source_path(&self, relative: &str) -> PathBuf {
        resolve(&self.cache_root, relative)
    }

    /// `relative` under the mod root; empty means the root.
    pub fn target_path(&self, relative: &str) -> PathBuf {
        resolve(&self.mod_root, relative)
    }
}

/// Errors that end a run whatever the failure policy.
fn is_fatal(error: &Error) -> bool {
    matches!(error, Error::ExternalTool { .. } | Error::Merge { .. })
}

fn resolve(root: &Path, relative: &str) -> PathBuf {
    let relative = relative.trim();
    if relative.is_empty() {
        root.to_path_buf()
    } else {
        root.join(relative)
    }
}
