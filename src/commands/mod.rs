//! # CLI Command Implementations
//!
//! The installer has two modes, each in its own module with an `execute`
//! function taking the resolved [`InstallerConfig`]:
//!
//! - `install`: the full install (default).
//! - `list`: print the install options and whether each is selected.
//!
//! Both check preconditions first and bring the repository caches up to
//! date before reading the manifest.
//!
//! [`InstallerConfig`]: roguetech_installer::config::InstallerConfig

pub mod install;
pub mod list;
