//! Binary patcher adapter
//!
//! ModTek hooks into the game by patching its managed assemblies with
//! `ModTekInjector.exe`, run under the mono runtime. Installing first runs a
//! restore pass, which undoes any earlier patching, and then an install pass.

use std::path::{Path, PathBuf};
use std::process::Command;

use log::debug;

use crate::defaults::INJECTOR_EXECUTABLE;
use crate::error::{Error, Result};

/// Applies or reverts the assembly patch.
pub trait AssemblyPatcher {
    /// Run the restore pass when `restore` is true, the install pass otherwise.
    fn apply_patch(&self, restore: bool) -> Result<()>;
}

/// Restore then install, the order a fresh patch needs.
pub fn repatch(patcher: &dyn AssemblyPatcher) -> Result<()> {
    patcher.apply_patch(true)?;
    patcher.apply_patch(false)
}

/// The ModTek injector run through a .NET runtime.
#[derive(Debug, Clone)]
pub struct ModTekInjector {
    runtime: String,
    injector_dir: PathBuf,
    managed_dir: PathBuf,
}

impl ModTekInjector {
    /// `injector_dir` holds `ModTekInjector.exe`; `managed_dir` is the game's
    /// `Managed` assembly directory.
    pub fn new(runtime: impl Into<String>, injector_dir: &Path, managed_dir: &Path) -> Self {
        Self {
            runtime: runtime.into(),
            injector_dir: injector_dir.to_path_buf(),
            managed_dir: managed_dir.to_path_buf(),
        }
    }

    /// Injector arguments for one pass.
    pub fn arguments(&self, restore: bool) -> Vec<String> {
        let mut args = vec![INJECTOR_EXECUTABLE.to_string()];
        if restore {
            args.push("/restore".to_string());
        } else {
            args.push("/install".to_string());
            args.push("/y".to_string());
        }
        args.push(format!("/manageddir={}", self.managed_dir.display()));
        args
    }
}

impl AssemblyPatcher for ModTekInjector {
    fn apply_patch(&self, restore: bool) -> Result<()> {
        let pass = if restore { "restore" } else { "install" };
        let output = Command::new(&self.runtime)
            .args(self.arguments(restore))
            .current_dir(&self.injector_dir)
            .output()
            .map_err(|e| Error::ExternalTool {
                tool: INJECTOR_EXECUTABLE.to_string(),
                message: format!("failed to start {} pass with {}: {}", pass, self.runtime, e),
            })?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            return Err(Error::ExternalTool {
                tool: INJECTOR_EXECUTABLE.to_string(),
                message: format!(
                    "{} pass exited with {}: {}",
                    pass,
                    output.status,
                    combined.trim()
                ),
            });
        }

        debug!("ModTekInjector /{}: {}", pass, combined.trim());
        Ok(())
    }
}
