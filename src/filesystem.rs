//! Filesystem bridge: symlinks and filtered directory copies
//!
//! Every operation here is idempotent. Running the same copy twice leaves the
//! same tree behind because existing entries are removed before they are
//! replaced, never merged.

use std::fs;
use std::io;
use std::path::Path;

use log::{debug, warn};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::task::ExclusionSet;

/// What [`symlink_dir_if_needed`] found or did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    /// The link was created.
    Created,
    /// A symlink already exists at the link path.
    AlreadyLinked,
    /// A real file or directory occupies the link path; left untouched.
    Occupied,
}

/// What [`copy_excluding`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    /// Entries were copied; `skipped` counts excluded children.
    Copied { copied: usize, skipped: usize },
    /// The source does not exist, nothing was touched.
    SourceMissing,
}

/// Create a directory symlink at `link` pointing to `target`.
///
/// Nothing happens when anything already exists at `link`, be it a symlink
/// or a real path. Missing parent directories of `link` are created.
pub fn symlink_dir_if_needed(target: &Path, link: &Path) -> Result<LinkOutcome> {
    match fs::symlink_metadata(link) {
        Ok(meta) if meta.file_type().is_symlink() => return Ok(LinkOutcome::AlreadyLinked),
        Ok(_) => {
            debug!(
                "Not linking {}: a real path already exists there",
                link.display()
            );
            return Ok(LinkOutcome::Occupied);
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(Error::Filesystem {
                message: format!("Failed to inspect '{}': {}", link.display(), e),
            })
        }
    }

    if let Some(parent) = link.parent() {
        create_dir_all(parent)?;
    }

    debug!("Linking {} -> {}", link.display(), target.display());
    symlink_dir(target, link).map_err(|e| Error::Filesystem {
        message: format!(
            "Failed to link '{}' to '{}': {}",
            link.display(),
            target.display(),
            e
        ),
    })?;
    Ok(LinkOutcome::Created)
}

#[cfg(unix)]
fn symlink_dir(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink_dir(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
}

/// Copy the children of `source` into `target`, skipping excluded names.
///
/// Only the immediate children of `source` are checked against `exclude`;
/// a selected child is copied with everything below it. Immediate children
/// whose name starts with `.` are skipped and not counted. Any entry at the
/// target sharing a child's name is removed first, so the result mirrors the
/// source instead of merging with a previous install.
///
/// When `source` is a file it is copied into `target` if that is a
/// directory, or onto `target` otherwise.
pub fn copy_excluding(source: &Path, target: &Path, exclude: &ExclusionSet) -> Result<CopyOutcome> {
    if source.is_dir() {
        create_dir_all(target)?;

        let mut children = fs::read_dir(source)
            .map_err(|e| Error::Filesystem {
                message: format!("Failed to read directory '{}': {}", source.display(), e),
            })?
            .collect::<io::Result<Vec<_>>>()?;
        children.sort_by_key(|entry| entry.file_name());

        let mut copied = 0;
        let mut skipped = 0;
        for child in children {
            let name = child.file_name();
            // Hidden children (such as a clone's .git) are never installed
            if name.to_string_lossy().starts_with('.') {
                debug!("Ignoring hidden {}", child.path().display());
                continue;
            }
            if exclude.contains(&name.to_string_lossy()) {
                debug!("Excluding {}", child.path().display());
                skipped += 1;
                continue;
            }

            let destination = target.join(&name);
            remove_path(&destination)?;
            copy_tree(&child.path(), &destination)?;
            copied += 1;
        }

        Ok(CopyOutcome::Copied { copied, skipped })
    } else if source.exists() {
        let destination = match source.file_name() {
            Some(name) if target.is_dir() => target.join(name),
            _ => target.to_path_buf(),
        };
        if let Some(parent) = destination.parent() {
            create_dir_all(parent)?;
        }
        copy_file(source, &destination)?;
        Ok(CopyOutcome::Copied {
            copied: 1,
            skipped: 0,
        })
    } else {
        warn!(
            "Missing expected file '{}' during copy operation",
            source.display()
        );
        Ok(CopyOutcome::SourceMissing)
    }
}

/// Copy `source` to `target` unless `target` already exists.
///
/// Returns whether a copy happened.
pub fn copy_dir_if_absent(source: &Path, target: &Path) -> Result<bool> {
    if target.exists() {
        debug!("{} already present, not copying", target.display());
        return Ok(false);
    }
    if !source.exists() {
        return Err(Error::Filesystem {
            message: format!("Source '{}' does not exist", source.display()),
        });
    }
    copy_tree(source, target)?;
    Ok(true)
}

/// Recursively copy a file or directory.
///
/// Symlinks inside the tree are recreated as symlinks.
pub fn copy_tree(source: &Path, target: &Path) -> Result<()> {
    for entry in WalkDir::new(source).follow_links(false) {
        let entry = entry.map_err(|e| Error::Filesystem {
            message: format!("Failed to walk '{}': {}", source.display(), e),
        })?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| Error::Filesystem {
                message: format!("Failed to relativize '{}': {}", entry.path().display(), e),
            })?;
        let destination = if relative.as_os_str().is_empty() {
            target.to_path_buf()
        } else {
            target.join(relative)
        };

        let file_type = entry.file_type();
        if file_type.is_dir() {
            create_dir_all(&destination)?;
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &destination)?;
        } else {
            if let Some(parent) = destination.parent() {
                create_dir_all(parent)?;
            }
            copy_file(entry.path(), &destination)?;
        }
    }
    Ok(())
}

/// Remove whatever exists at `path`. Symlinks are removed, not followed.
pub fn remove_path(path: &Path) -> Result<()> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    let result = if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    result.map_err(|e| Error::Filesystem {
        message: format!("Failed to remove '{}': {}", path.display(), e),
    })
}

fn create_dir_all(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| Error::Filesystem {
        message: format!("Failed to create directory '{}': {}", path.display(), e),
    })
}

fn copy_file(source: &Path, destination: &Path) -> Result<()> {
    fs::copy(source, destination)
        .map(|_| ())
        .map_err(|e| Error::Filesystem {
            message: format!(
                "Failed to copy '{}' to '{}': {}",
                source.display(),
                destination.display(),
                e
            ),
        })
}

#[cfg(unix)]
fn copy_symlink(source: &Path, destination: &Path) -> Result<()> {
    let link_target = fs::read_link(source)?;
    remove_path(destination)?;
    std::os::unix::fs::symlink(&link_target, destination).map_err(|e| Error::Filesystem {
        message: format!("Failed to recreate link '{}': {}", destination.display(), e),
    })
}

#[cfg(not(unix))]
fn copy_symlink(source: &Path, destination: &Path) -> Result<()> {
    copy_file(source, destination)
}
