//! Shared test utilities for integration and E2E tests.
//!
//! [`GameFixture`] lays out a fake game installation next to pre-populated
//! repository caches, so the installer can run with `--noupdate` without
//! git or network access.
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! let fixture = GameFixture::new().with_manifest(manifests::STANDARD);
//! let mut cmd = fixture.command();
//! cmd.arg("--list").assert().success();
//! ```

use assert_fs::prelude::*;
use std::env;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::manifests;
    #[allow(unused_imports)]
    pub use super::should_skip_network_tests;
    pub use super::GameFixture;
}

/// Manifest documents used across tests.
#[allow(dead_code)]
pub mod manifests {
    /// Core content, an optional pack, a merge and a blacklisted task.
    pub const STANDARD: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<RogueTechConfig>
  <Options>
    <InstallOption><optionId>core</optionId><optionUiName>RogueTech Core</optionUiName></InstallOption>
    <InstallOption><optionId>extras</optionId><optionUiName>Extras</optionUiName></InstallOption>
  </Options>
  <Tasks>
    <InstallTask>
      <Id>modtekInstall</Id><jobType>Install</jobType><isSelected>true</isSelected>
      <canSelect>false</canSelect><sourcePath>ModTek</sourcePath><targetPath>ModTek</targetPath>
    </InstallTask>
    <InstallTask>
      <Id>Foo</Id><jobType>Install</jobType><isSelected>true</isSelected>
      <canSelect>false</canSelect><optionGroupId>core</optionGroupId>
      <sourcePath>Foo</sourcePath><targetPath>Foo</targetPath>
      <excludePaths>Docs,Legacy</excludePaths>
    </InstallTask>
    <InstallTask>
      <Id>Sounds</Id><jobType>Install</jobType><isSelected>true</isSelected>
      <canSelect>true</canSelect><optionGroupId>core</optionGroupId>
      <uiName>Better Sounds</uiName>
      <sourcePath>Sounds</sourcePath><targetPath>Sounds</targetPath>
    </InstallTask>
    <InstallTask>
      <Id>Portraits</Id><jobType>Install</jobType><isSelected>false</isSelected>
      <canSelect>true</canSelect><optionGroupId>extras</optionGroupId>
      <uiDescription>Adds pilot portraits.</uiDescription>
      <sourcePath>Portraits</sourcePath><targetPath>Portraits</targetPath>
    </InstallTask>
    <InstallTask>
      <Id>Settings</Id><jobType>BasicJsonMerge</jobType><isSelected>true</isSelected>
      <sourcePath>patches/settings.json</sourcePath><targetPath>Foo/A/settings.json</targetPath>
    </InstallTask>
    <InstallTask>
      <Id>Launcher</Id><jobType>LauncherOnly</jobType><isSelected>true</isSelected>
    </InstallTask>
  </Tasks>
</RogueTechConfig>
"#;

    /// A selected multi-component task whose path lists do not pair up.
    pub const BROKEN_MULTI: &str = r#"<RogueTechConfig>
  <Tasks>
    <InstallTask>
      <Id>Broken</Id><jobType>MultiComponentInstall</jobType><isSelected>true</isSelected>
      <sourcePath>Foo/A,Foo/B</sourcePath><targetPath>A</targetPath>
    </InstallTask>
    <InstallTask>
      <Id>Sounds</Id><jobType>Install</jobType><isSelected>true</isSelected>
      <sourcePath>Sounds</sourcePath><targetPath>Sounds</targetPath>
    </InstallTask>
  </Tasks>
</RogueTechConfig>
"#;
}

/// Check if network tests should be skipped.
#[allow(dead_code)]
pub fn should_skip_network_tests() -> bool {
    env::var("SKIP_NETWORK_TESTS").is_ok()
}

/// A fake game installation with populated caches.
///
/// Layout under the temporary directory:
///
/// ```text
/// BattleTech.app/Contents/Resources/Data/
/// RtlCache/RtCache/{RtConfig.xml, ModTek, RogueTechPerfFix, Foo, Sounds, ...}
/// RtlCache/CabCache/CabSupRepoData/CabRepos.xml
/// ```
pub struct GameFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl GameFixture {
    pub fn new() -> Self {
        let temp_dir = assert_fs::TempDir::new().expect("Failed to create temp directory");
        let fixture = Self { temp_dir };

        fixture
            .child("BattleTech.app/Contents/Resources/Data")
            .create_dir_all()
            .expect("Failed to create game data directory");
        fixture
            .child("RtlCache/CabCache/CabSupRepoData/CabRepos.xml")
            .write_str("<CabRepoData><Repos/></CabRepoData>")
            .expect("Failed to write CabRepos.xml");

        for (path, content) in [
            ("ModTek/ModTekInjector.exe", "injector"),
            ("RogueTechPerfFix/mod.json", "{}"),
            ("Foo/A/mod.json", "{}"),
            ("Foo/A/settings.json", r#"{"difficulty": 1, "tags": ["a"]}"#),
            ("Foo/B/mod.json", "{}"),
            ("Foo/Docs/readme.txt", "docs"),
            ("Foo/Legacy/old.json", "{}"),
            ("Sounds/mod.json", "{}"),
            ("Portraits/mod.json", "{}"),
            ("patches/settings.json", "{\n  // harder\n  \"difficulty\": 2,\n  \"tags\": [\"b\"],\n}"),
        ] {
            fixture
                .cache_child(path)
                .write_str(content)
                .expect("Failed to write cache file");
        }
        fixture
    }

    /// Write the cached `RtConfig.xml`.
    pub fn with_manifest(self, content: &str) -> Self {
        self.cache_child("RtConfig.xml")
            .write_str(content)
            .expect("Failed to write manifest");
        self
    }

    /// The temporary directory holding everything.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// The game bundle passed as `--install-dir`.
    pub fn install_dir(&self) -> PathBuf {
        self.path().join("BattleTech.app")
    }

    pub fn mod_dir(&self) -> PathBuf {
        self.install_dir().join("Contents/Resources/Mods")
    }

    pub fn rt_cache(&self) -> PathBuf {
        self.path().join("RtlCache/RtCache")
    }

    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    pub fn cache_child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(format!("RtlCache/RtCache/{}", path))
    }

    /// The installer binary, pointed at this installation with updates
    /// suppressed and the environment overrides cleared.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("roguetech-installer");
        cmd.current_dir(self.path())
            .env_remove("RT_ARCH")
            .env_remove("RT_JSON_MERGE_COMMAND")
            .env_remove("RT_INJECTOR_RUNTIME")
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1")
            .arg("--noupdate")
            .arg("--install-dir")
            .arg(self.install_dir());
        cmd
    }
}

impl Default for GameFixture {
    fn default() -> Self {
        Self::new()
    }
}
