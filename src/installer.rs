//! # Install Orchestration
//!
//! Ties the pieces together in the order an install needs:
//!
//! 1. Directory scaffold: the mod directory and the symlinks the game and
//!    the mod loader expect.
//! 2. Repository caches: RogueTech itself, the CAB support repository and
//!    every CAB repository it lists.
//! 3. Special components: ModTek (copied if absent, then re-patched into the
//!    game assemblies) and RogueTechPerfFix (copied if absent, except on ARM).
//! 4. A snapshot of the manifest next to the installed mods.
//! 5. The manifest tasks, through the [`Interpreter`].
//!
//! The patcher and the JSON merger are passed in so tests can substitute
//! recording fakes for the external programs.

use std::fs;

use log::{debug, info};

use crate::cache::RepositoryCache;
use crate::config::{InstallerConfig, Layout};
use crate::defaults::{MODTEK_DIR, PERFFIX_DIR, ROGUETECH_REPO_URL};
use crate::error::{Error, Result};
use crate::filesystem;
use crate::injector::{self, AssemblyPatcher, ModTekInjector};
use crate::interpreter::{Interpreter, RunReport};
use crate::manifest::Manifest;
use crate::merge::{BuiltinJsonMerger, ExternalJsonMerger, JsonMerger};

/// What happened to a special component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentOutcome {
    Copied,
    AlreadyPresent,
    /// Not installed on this platform.
    Skipped,
}

/// Runs the install steps for one game installation.
pub struct Installer {
    config: InstallerConfig,
    layout: Layout,
    cache: RepositoryCache,
}

impl Installer {
    /// An installer using the system `git`.
    pub fn new(config: InstallerConfig) -> Self {
        let cache = RepositoryCache::new(config.check_updates);
        Self::with_cache(config, cache)
    }

    /// An installer using the given cache manager.
    pub fn with_cache(config: InstallerConfig, cache: RepositoryCache) -> Self {
        let layout = config.layout();
        Self {
            config,
            layout,
            cache,
        }
    }

    pub fn config(&self) -> &InstallerConfig {
        &self.config
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Create the mod directory and the scaffold symlinks.
    pub fn prepare_scaffold(&self) -> Result<()> {
        fs::create_dir_all(&self.layout.mod_dir)?;
        for (target, link) in self.layout.scaffold_links() {
            let outcome = filesystem::symlink_dir_if_needed(&target, &link)?;
            debug!("{} -> {}: {:?}", link.display(), target.display(), outcome);
        }
        Ok(())
    }

    /// Scaffold the game directory and bring every cache up to date.
    pub fn cache_roguetech_files(&self) -> Result<()> {
        self.prepare_scaffold()?;

        fs::create_dir_all(&self.layout.cache_root)?;
        self.cache.ensure(&self.layout.rt_cache, ROGUETECH_REPO_URL)?;

        let bundles = self.cache.sync_community_bundles(&self.layout.cab_cache)?;
        debug!("{} community asset bundle repositories cached", bundles.len());

        let (target, link) = self.layout.cab_link();
        filesystem::symlink_dir_if_needed(&target, &link)?;
        Ok(())
    }

    /// Copy ModTek into the mod directory if absent, then re-patch the game.
    pub fn install_modtek(&self, patcher: &dyn AssemblyPatcher) -> Result<ComponentOutcome> {
        info!("Installing ModTek...");
        let outcome = self.copy_component(MODTEK_DIR)?;
        injector::repatch(patcher)?;
        Ok(outcome)
    }

    /// Copy RogueTechPerfFix if absent. Skipped on ARM.
    pub fn install_perffix(&self) -> Result<ComponentOutcome> {
        if self.config.is_arm() {
            info!(
                "Skipping install of {} due to black screen error on ARM ({}).",
                PERFFIX_DIR, self.config.arch
            );
            return Ok(ComponentOutcome::Skipped);
        }
        self.copy_component(PERFFIX_DIR)
    }

    fn copy_component(&self, name: &str) -> Result<ComponentOutcome> {
        let source = self.layout.rt_cache.join(name);
        let target = self.layout.mod_dir.join(name);
        if filesystem::copy_dir_if_absent(&source, &target)? {
            Ok(ComponentOutcome::Copied)
        } else {
            Ok(ComponentOutcome::AlreadyPresent)
        }
    }

    /// Copy the cached manifest next to the installed mods.
    pub fn snapshot_manifest(&self) -> Result<()> {
        info!("Copying RogueTech config...");
        let source = self.layout.manifest();
        let target = self.layout.installed_manifest();
        fs::copy(&source, &target).map_err(|e| Error::Filesystem {
            message: format!(
                "Failed to copy '{}' to '{}': {}",
                source.display(),
                target.display(),
                e
            ),
        })?;
        Ok(())
    }

    /// Install everything from an already populated cache.
    pub fn perform_install(
        &self,
        patcher: &dyn AssemblyPatcher,
        merger: &dyn JsonMerger,
    ) -> Result<RunReport> {
        self.install_modtek(patcher)?;
        self.install_perffix()?;
        self.snapshot_manifest()?;

        info!("Performing install...");
        let manifest = Manifest::load(&self.layout.manifest())?;
        Interpreter::new(&self.layout.rt_cache, &self.layout.mod_dir, merger)
            .with_policy(self.config.failure_policy)
            .run(&manifest)
    }

    /// The injector for this installation.
    pub fn modtek_injector(&self) -> ModTekInjector {
        ModTekInjector::new(
            self.config.injector_runtime.clone(),
            &self.layout.mod_dir.join(MODTEK_DIR),
            &self.layout.managed_dir(),
        )
    }

    /// The configured merger: external when a command is set, built-in
    /// otherwise.
    pub fn json_merger(&self) -> Result<Box<dyn JsonMerger>> {
        match self.config.json_merge_command.as_deref() {
            Some(command) => Ok(Box::new(ExternalJsonMerger::from_command_line(command)?)),
            None => Ok(Box::new(BuiltinJsonMerger)),
        }
    }

    /// Manifest used for listing: the installed snapshot when present, the
    /// cached copy otherwise.
    pub fn listing_manifest(&self) -> Result<Manifest> {
        let installed = self.layout.installed_manifest();
        if installed.is_file() {
            debug!("Using previously installed config file.");
            Manifest::load(&installed)
        } else {
            debug!("Using default config file.");
            Manifest::load(&self.layout.manifest())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::GitOperations;
    use std::cell::RefCell;
    use std::path::{Path, PathBuf};
    use std::rc::Rc;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"<RogueTechConfig>
  <Tasks>
    <InstallTask>
      <Id>modtekInstall</Id><jobType>Install</jobType><isSelected>true</isSelected>
      <sourcePath>ModTek</sourcePath><targetPath>ModTekCopy</targetPath>
    </InstallTask>
    <InstallTask>
      <Id>Core</Id><jobType>Install</jobType><isSelected>true</isSelected>
      <sourcePath>Core</sourcePath><targetPath>Core</targetPath>
      <excludePaths>Docs</excludePaths>
    </InstallTask>
  </Tasks>
</RogueTechConfig>"#;

    #[derive(Default)]
    struct RecordingPatcher {
        passes: RefCell<Vec<bool>>,
    }

    impl AssemblyPatcher for RecordingPatcher {
        fn apply_patch(&self, restore: bool) -> Result<()> {
            self.passes.borrow_mut().push(restore);
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct FakeGit {
        calls: Rc<RefCell<Vec<String>>>,
    }

    impl GitOperations for FakeGit {
        fn clone_shallow(&self, url: &str, target_dir: &Path) -> Result<()> {
            self.calls.borrow_mut().push(format!("clone {}", url));
            fs::create_dir_all(target_dir)?;
            if url.contains("Community-Asset-Bundle-Data") {
                fs::write(
                    target_dir.join("CabRepos.xml"),
                    "<CabRepoData><Repos><CabRepo><cacheSubPath>Cab1</cacheSubPath>\
                     <repoUrl>https://example.com/cab1.git</repoUrl></CabRepo></Repos></CabRepoData>",
                )?;
            }
            Ok(())
        }

        fn discard_changes(&self, _repo_dir: &Path, url: &str) -> Result<()> {
            self.calls.borrow_mut().push(format!("checkout {}", url));
            Ok(())
        }

        fn fetch_shallow(&self, _repo_dir: &Path, url: &str) -> Result<()> {
            self.calls.borrow_mut().push(format!("fetch {}", url));
            Ok(())
        }
    }

    fn populated(temp: &TempDir, arch: &str) -> (Installer, PathBuf) {
        let base = temp.path().join("BattleTech.app");
        fs::create_dir_all(&base).unwrap();
        let mut config = InstallerConfig::new(&base);
        config.arch = arch.to_string();
        config.check_updates = false;
        let installer = Installer::with_cache(
            config,
            RepositoryCache::with_git(Box::new(FakeGit::default()), false),
        );

        let rt = installer.layout().rt_cache.clone();
        for dir in ["ModTek", "RogueTechPerfFix", "Core/Docs", "Core/Weapons"] {
            fs::create_dir_all(rt.join(dir)).unwrap();
        }
        fs::write(rt.join("ModTek/ModTekInjector.exe"), "").unwrap();
        fs::write(rt.join("Core/Weapons/laser.json"), "{}").unwrap();
        fs::write(rt.join("RtConfig.xml"), MANIFEST).unwrap();
        fs::create_dir_all(&installer.layout().mod_dir).unwrap();
        (installer, base)
    }

    #[cfg(unix)]
    #[test]
    fn test_cache_roguetech_files_builds_scaffold() {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("BattleTech.app");
        fs::create_dir_all(base.join("Contents/Resources/Data")).unwrap();
        let git = FakeGit::default();
        let calls = git.calls.clone();
        let installer = Installer::with_cache(
            InstallerConfig::new(&base),
            RepositoryCache::with_git(Box::new(git), true),
        );

        installer.cache_roguetech_files().unwrap();

        let layout = installer.layout();
        for (_, link) in layout.scaffold_links() {
            assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        }
        assert!(fs::symlink_metadata(layout.cab_link().1)
            .unwrap()
            .file_type()
            .is_symlink());
        assert_eq!(
            *calls.borrow(),
            vec![
                format!("clone {}", ROGUETECH_REPO_URL),
                format!("clone {}", crate::defaults::CAB_SUPPORT_REPO_URL),
                "clone https://example.com/cab1.git".to_string(),
            ]
        );

        // Second run refreshes instead of cloning
        installer.cache_roguetech_files().unwrap();
        assert!(calls.borrow()[3].starts_with("checkout"));
    }

    #[test]
    fn test_perform_install() {
        let temp = TempDir::new().unwrap();
        let (installer, _) = populated(&temp, "x86_64");
        let patcher = RecordingPatcher::default();

        let report = installer.perform_install(&patcher, &BuiltinJsonMerger).unwrap();

        let mods = &installer.layout().mod_dir;
        assert_eq!(*patcher.passes.borrow(), vec![true, false]);
        assert!(mods.join("ModTek/ModTekInjector.exe").is_file());
        assert!(mods.join("RogueTechPerfFix").is_dir());
        assert!(mods.join("RtConfig.xml").is_file());
        assert!(mods.join("Core/Weapons/laser.json").is_file());
        assert!(!mods.join("Core/Docs").exists());
        assert!(!mods.join("ModTekCopy").exists());
        assert_eq!(report.executed, vec!["Core"]);
        assert_eq!(report.skipped, vec!["modtekInstall"]);
    }

    #[test]
    fn test_perffix_skipped_on_arm() {
        testing_logger::setup();
        let temp = TempDir::new().unwrap();
        let (installer, _) = populated(&temp, "arm64");

        assert_eq!(installer.install_perffix().unwrap(), ComponentOutcome::Skipped);
        assert!(!installer.layout().mod_dir.join(PERFFIX_DIR).exists());
        testing_logger::validate(|captured| {
            assert!(captured
                .iter()
                .any(|log| log.level == log::Level::Info && log.body.contains("ARM")));
        });
    }

    #[test]
    fn test_components_not_copied_twice() {
        let temp = TempDir::new().unwrap();
        let (installer, _) = populated(&temp, "x86_64");
        let patcher = RecordingPatcher::default();

        assert_eq!(installer.install_modtek(&patcher).unwrap(), ComponentOutcome::Copied);
        assert_eq!(
            installer.install_modtek(&patcher).unwrap(),
            ComponentOutcome::AlreadyPresent
        );
        assert_eq!(patcher.passes.borrow().len(), 4);
    }

    #[test]
    fn test_listing_manifest_prefers_installed_copy() {
        let temp = TempDir::new().unwrap();
        let (installer, _) = populated(&temp, "x86_64");
        assert!(installer.listing_manifest().unwrap().origin().ends_with("RtCache/RtConfig.xml"));

        installer.snapshot_manifest().unwrap();
        assert!(installer.listing_manifest().unwrap().origin().ends_with("Mods/RtConfig.xml"));
    }

    #[test]
    fn test_json_merger_selection() {
        let temp = TempDir::new().unwrap();
        let mut config = InstallerConfig::new(temp.path());
        config.json_merge_command = Some("   ".to_string());
        assert!(Installer::new(config.clone()).json_merger().is_err());

        config.json_merge_command = None;
        assert!(Installer::new(config).json_merger().is_ok());
    }

    #[test]
    fn test_modtek_injector_paths() {
        let temp = TempDir::new().unwrap();
        let (installer, base) = populated(&temp, "x86_64");
        let args = installer.modtek_injector().arguments(false);
        assert_eq!(
            args.last().unwrap(),
            &format!(
                "/manageddir={}",
                base.join("Contents/MacOS/BattleTech_Data/Managed").display()
            )
        );
    }
}
