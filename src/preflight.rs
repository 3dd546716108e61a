//! Precondition checks run before anything is written.
//!
//! Each failure is an [`Error::Precondition`] with a hint telling the user
//! how to fix it.

use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

use log::debug;

use crate::cache::community_bundle_sources;
use crate::config::InstallerConfig;
use crate::defaults::{CAB_MANIFEST_FILE_NAME, CAB_SUPPORT_DIR};
use crate::error::{Error, Result};
use crate::manifest::Manifest;

const GIT_HINT: &str =
    "git must be installed. See https://git-scm.com/book/en/v2/Getting-Started-Installing-Git";
const MONO_HINT: &str =
    "mono must be installed. See https://www.mono-project.com/docs/getting-started/install/mac/";

/// The install directory must be an existing directory.
pub fn check_install_dir(install_dir: &Path) -> Result<()> {
    if install_dir.is_dir() {
        return Ok(());
    }
    Err(Error::Precondition {
        message: format!(
            "Failed to find BATTLETECH install directory at '{}'",
            install_dir.display()
        ),
        hint: Some("Pass --install-dir or set RT_INSTALL_DIR".to_string()),
    })
}

/// Whether `program` can be started.
///
/// The program is run with `--version`; only a failure to spawn counts as
/// missing, whatever the exit status.
pub fn tool_available(program: &str) -> bool {
    let spawned = Command::new(program)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
    match spawned {
        Ok(_) => true,
        Err(e) if e.kind() == io::ErrorKind::NotFound => false,
        Err(e) => {
            debug!("Probing {} failed: {}", program, e);
            false
        }
    }
}

/// `program` must be available; `hint` says how to install it.
pub fn require_tool(program: &str, hint: &str) -> Result<()> {
    if tool_available(program) {
        return Ok(());
    }
    Err(Error::Precondition {
        message: format!("'{}' was not found on PATH", program),
        hint: Some(hint.to_string()),
    })
}

/// Whether the run will have to call git.
///
/// Git is not needed when updates are suppressed, both cache roots are
/// already populated and every bundle repository listed in `CabRepos.xml`
/// has been cloned.
pub fn needs_git(config: &InstallerConfig) -> bool {
    let layout = config.layout();
    let support_dir = layout.cab_cache.join(CAB_SUPPORT_DIR);
    config.check_updates
        || !layout.rt_cache.is_dir()
        || !support_dir.is_dir()
        || missing_bundles(&support_dir.join(CAB_MANIFEST_FILE_NAME), &layout.cab_cache)
}

/// Whether a listed bundle repository has no clone yet.
///
/// An unreadable list needs no git here; reading it later reports the error.
fn missing_bundles(cab_manifest: &Path, cab_root: &Path) -> bool {
    let sources = match Manifest::load(cab_manifest)
        .and_then(|manifest| community_bundle_sources(&manifest, cab_root))
    {
        Ok(sources) => sources,
        Err(e) => {
            debug!("Not checking bundle clones: {}", e);
            return false;
        }
    };
    sources.iter().any(|source| {
        let missing = !source.path.is_dir();
        if missing {
            debug!("Bundle '{}' is not cloned yet", source.alias);
        }
        missing
    })
}

/// Checks for listing the install options.
pub fn check_for_list(config: &InstallerConfig) -> Result<()> {
    check_install_dir(&config.install_dir)?;
    if needs_git(config) {
        require_tool("git", GIT_HINT)?;
    }
    Ok(())
}

/// Checks for a full install, which also runs the injector.
pub fn check_for_install(config: &InstallerConfig) -> Result<()> {
    check_install_dir(&config.install_dir)?;
    require_tool(&config.injector_runtime, MONO_HINT)?;
    if needs_git(config) {
        require_tool("git", GIT_HINT)?;
    }
    Ok(())
}
