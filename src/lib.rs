//! # RogueTech Installer Library
//!
//! Installs the RogueTech mod collection into a BATTLETECH game directory.
//! The `roguetech-installer` binary is a thin wrapper around this library.
//!
//! ## Quick Example
//!
//! ```
//! use roguetech_installer::manifest::Manifest;
//! use roguetech_installer::task::selected_task_ids;
//!
//! let manifest = Manifest::parse(
//!     "<RogueTechConfig><Tasks>\
//!      <InstallTask><Id>Core</Id><isSelected>true</isSelected></InstallTask>\
//!      <InstallTask><Id>Extra</Id><isSelected>false</isSelected></InstallTask>\
//!      </Tasks></RogueTechConfig>",
//! )
//! .unwrap();
//!
//! assert_eq!(selected_task_ids(&manifest).unwrap(), vec!["Core"]);
//! ```
//!
//! ## Core Concepts
//!
//! - **Manifest (`manifest`)**: the `RtConfig.xml` document shipped with the
//!   mod, queried with a small XPath subset.
//! - **Tasks (`task`, `interpreter`)**: each manifest entry describes one unit
//!   of install work; the interpreter dispatches the selected ones.
//! - **Repository caches (`git`, `cache`)**: shallow clones of the mod
//!   repositories, kept next to the game.
//! - **Filesystem bridge (`filesystem`)**: symlinks and filtered copies.
//! - **External tools (`injector`, `merge`)**: the ModTek assembly injector
//!   and JSON merging.
//!
//! ## Execution Flow
//!
//! [`installer::Installer`] runs an install in this order:
//!
//! 1.  **Scaffold**: create the mod directory and the symlinks the game needs.
//! 2.  **Caches**: clone or refresh every repository cache.
//! 3.  **Special components**: ModTek and the performance fix.
//! 4.  **Snapshot**: copy the manifest next to the installed mods.
//! 5.  **Tasks**: run the selected manifest tasks in document order.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod defaults;
pub mod error;
pub mod filesystem;
pub mod git;
pub mod injector;
pub mod installer;
pub mod interpreter;
pub mod manifest;
pub mod merge;
pub mod output;
pub mod preflight;
pub mod task;
