//! Default values for installer configuration.
//!
//! This module provides centralized defaults used across the installer:
//! well-known paths, repository locations, manifest names and the list of
//! tasks the generic interpreter leaves alone.

use std::path::PathBuf;

/// Where Steam places the game bundle, relative to the user's home directory.
pub const STEAM_INSTALL_SUBPATH: &str =
    "Library/Application Support/Steam/steamapps/common/BATTLETECH/BattleTech.app";

/// The RogueTech repository holding the manifest and mod components.
pub const ROGUETECH_REPO_URL: &str = "https://github.com/BattletechModders/RogueTech.git";

/// The repository listing the community asset bundle repositories.
pub const CAB_SUPPORT_REPO_URL: &str =
    "https://github.com/BattletechModders/Community-Asset-Bundle-Data.git";

/// Task manifest file name, at the root of the RogueTech repository.
pub const MANIFEST_FILE_NAME: &str = "RtConfig.xml";

/// Repository list file name, at the root of the CAB support repository.
pub const CAB_MANIFEST_FILE_NAME: &str = "CabRepos.xml";

/// Path expression addressing every task node of the manifest.
pub const TASKS_ROOT: &str = "/RogueTechConfig/Tasks/InstallTask";

/// Path expression addressing every install option of the manifest.
pub const OPTIONS_ROOT: &str = "/RogueTechConfig/Options/InstallOption";

/// Path expression addressing every repository in `CabRepos.xml`.
pub const CAB_REPOS_ROOT: &str = "/CabRepoData/Repos/CabRepo";

/// Separators used when `excludePaths` is a single string.
pub const EXCLUDE_DELIMITERS: &[char] = &[','];

/// Separators used when multi-component paths are a single string.
pub const PATH_DELIMITERS: &[char] = &[','];

/// Tasks never run by the generic interpreter.
///
/// ModTek and the performance fix are installed by dedicated steps before the
/// manifest is processed. The portrait loader is already part of the default
/// install and would only be copied twice.
pub const TASK_BLACKLIST: &[&str] = &["modtekInstall", "perfixInstall", "CommanderPortraitLoader"];

/// Cache sub-directory of the CAB support repository.
pub const CAB_SUPPORT_DIR: &str = "CabSupRepoData";

/// Program used to run the ModTek injector.
pub const INJECTOR_RUNTIME: &str = "mono64";

/// The ModTek injector executable, inside the ModTek directory.
pub const INJECTOR_EXECUTABLE: &str = "ModTekInjector.exe";

/// Component directory names handled outside the manifest.
pub const MODTEK_DIR: &str = "ModTek";
pub const PERFFIX_DIR: &str = "RogueTechPerfFix";

/// Returns the default game install directory.
///
/// Falls back to a path relative to the current directory when the home
/// directory cannot be determined.
///
/// This can be overridden by the `--install-dir` CLI flag or the
/// `RT_INSTALL_DIR` environment variable.
pub fn default_install_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(STEAM_INSTALL_SUBPATH)
}

/// Returns the default architecture identifier of this build.
pub fn default_arch() -> String {
    std::env::consts::ARCH.to_string()
}
