//! # Installer Configuration
//!
//! [`InstallerConfig`] gathers everything a run can be told from outside:
//! where the game lives, whether caches are refreshed, how task failures are
//! handled, which architecture is assumed and which programs do the external
//! work. The binary builds it from command-line flags and environment
//! variables; tests build it directly.
//!
//! [`Layout`] derives every directory the installer touches from the game
//! install root, so no operation depends on the process working directory.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::defaults::{self, MANIFEST_FILE_NAME};

/// What the interpreter does when a task fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop at the first failed task.
    #[default]
    Abort,
    /// Keep going and report every failed task at the end.
    Continue,
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "abort" => Ok(FailurePolicy::Abort),
            "continue" => Ok(FailurePolicy::Continue),
            other => Err(format!(
                "unknown failure policy '{}' (expected 'abort' or 'continue')",
                other
            )),
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::Abort => write!(f, "abort"),
            FailurePolicy::Continue => write!(f, "continue"),
        }
    }
}

/// Settings for one installer run.
#[derive(Debug, Clone)]
pub struct InstallerConfig {
    /// The game bundle (`BattleTech.app`).
    pub install_dir: PathBuf,
    /// Refresh existing repository caches.
    pub check_updates: bool,
    pub failure_policy: FailurePolicy,
    /// Architecture identifier, such as `x86_64` or `arm64`.
    pub arch: String,
    /// Program running the ModTek injector.
    pub injector_runtime: String,
    /// External merge command; the built-in merge is used when unset.
    pub json_merge_command: Option<String>,
}

impl InstallerConfig {
    /// Defaults for the given install directory.
    pub fn new(install_dir: impl Into<PathBuf>) -> Self {
        Self {
            install_dir: install_dir.into(),
            check_updates: true,
            failure_policy: FailurePolicy::default(),
            arch: defaults::default_arch(),
            injector_runtime: defaults::INJECTOR_RUNTIME.to_string(),
            json_merge_command: None,
        }
    }

    pub fn layout(&self) -> Layout {
        Layout::new(&self.install_dir)
    }

    /// Whether the architecture is ARM-class.
    pub fn is_arm(&self) -> bool {
        is_arm_arch(&self.arch)
    }
}

/// `arm`, `arm64`, `aarch64`, `armv7l` and similar.
pub fn is_arm_arch(arch: &str) -> bool {
    let arch = arch.trim().to_ascii_lowercase();
    arch.starts_with("arm") || arch.starts_with("aarch64")
}

/// Directories and files derived from the game install root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// The game bundle.
    pub base: PathBuf,
    pub contents: PathBuf,
    pub resources: PathBuf,
    /// Where the game reads mods from.
    pub mod_dir: PathBuf,
    /// `Contents/MacOS/BattleTech_Data`, a link to `Resources/Data`.
    pub data_dir: PathBuf,
    /// Root of all repository caches, next to the bundle.
    pub cache_root: PathBuf,
    /// Clone of the RogueTech repository.
    pub rt_cache: PathBuf,
    /// Community asset bundle clones.
    pub cab_cache: PathBuf,
}

impl Layout {
    pub fn new(base: &Path) -> Self {
        let base = base.to_path_buf();
        let contents = base.join("Contents");
        let resources = contents.join("Resources");
        let parent = base.parent().map(Path::to_path_buf).unwrap_or_else(|| base.clone());
        let cache_root = parent.join("RtlCache");

        Self {
            mod_dir: resources.join("Mods"),
            data_dir: contents.join("MacOS").join("BattleTech_Data"),
            rt_cache: cache_root.join("RtCache"),
            cab_cache: cache_root.join("CabCache"),
            cache_root,
            resources,
            contents,
            base,
        }
    }

    /// The managed assemblies patched by the injector.
    pub fn managed_dir(&self) -> PathBuf {
        self.data_dir.join("Managed")
    }

    /// The manifest inside the RogueTech cache.
    pub fn manifest(&self) -> PathBuf {
        self.rt_cache.join(MANIFEST_FILE_NAME)
    }

    /// The manifest snapshot kept next to the installed mods.
    pub fn installed_manifest(&self) -> PathBuf {
        self.mod_dir.join(MANIFEST_FILE_NAME)
    }

    /// `(target, link)` pairs of the directory scaffold.
    pub fn scaffold_links(&self) -> Vec<(PathBuf, PathBuf)> {
        let outer_mods = self
            .base
            .parent()
            .map(|p| p.join("Mods"))
            .unwrap_or_else(|| self.base.join("Mods"));
        vec![
            (self.resources.join("Data"), self.data_dir.clone()),
            (self.mod_dir.clone(), outer_mods),
            (self.mod_dir.clone(), self.contents.join("MacOS").join("Mods")),
        ]
    }

    /// `(target, link)` exposing the CAB cache inside the mod directory.
    pub fn cab_link(&self) -> (PathBuf, PathBuf) {
        (self.cab_cache.clone(), self.mod_dir.join("cabs"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_policy_parse() {
        assert_eq!("abort".parse::<FailurePolicy>().unwrap(), FailurePolicy::Abort);
        assert_eq!(
            "Continue".parse::<FailurePolicy>().unwrap(),
            FailurePolicy::Continue
        );
        assert!("sometimes".parse::<FailurePolicy>().is_err());
        assert_eq!(FailurePolicy::default().to_string(), "abort");
    }

    #[test]
    fn test_is_arm_arch() {
        assert!(is_arm_arch("arm"));
        assert!(is_arm_arch("arm64"));
        assert!(is_arm_arch("aarch64"));
        assert!(is_arm_arch(" ARMv7l "));
        assert!(!is_arm_arch("x86_64"));
        assert!(!is_arm_arch("i386"));
    }

    #[test]
    fn test_config_defaults() {
        let config = InstallerConfig::new("/games/BattleTech.app");
        assert!(config.check_updates);
        assert_eq!(config.failure_policy, FailurePolicy::Abort);
        assert_eq!(config.injector_runtime, "mono64");
        assert!(config.json_merge_command.is_none());
    }

    #[test]
    fn test_layout_paths() {
        let layout = Layout::new(Path::new("/games/BattleTech.app"));
        assert_eq!(
            layout.mod_dir,
            PathBuf::from("/games/BattleTech.app/Contents/Resources/Mods")
        );
        assert_eq!(
            layout.data_dir,
            PathBuf::from("/games/BattleTech.app/Contents/MacOS/BattleTech_Data")
        );
        assert_eq!(layout.rt_cache, PathBuf::from("/games/RtlCache/RtCache"));
        assert_eq!(layout.cab_cache, PathBuf::from("/games/RtlCache/CabCache"));
        assert_eq!(
            layout.manifest(),
            PathBuf::from("/games/RtlCache/RtCache/RtConfig.xml")
        );
        assert_eq!(
            layout.managed_dir(),
            PathBuf::from("/games/BattleTech.app/Contents/MacOS/BattleTech_Data/Managed")
        );
    }

    #[test]
    fn test_scaffold_links() {
        let layout = Layout::new(Path::new("/games/BattleTech.app"));
        let links = layout.scaffold_links();
        assert_eq!(links.len(), 3);
        assert_eq!(links[1].1, PathBuf::from("/games/Mods"));
        assert_eq!(
            layout.cab_link().1,
            PathBuf::from("/games/BattleTech.app/Contents/Resources/Mods/cabs")
        );
    }
}
