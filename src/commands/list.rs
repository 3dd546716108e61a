//! List command implementation
//!
//! Prints every user-selectable task grouped by install option, marked `+`
//! when selected and `-` otherwise. The manifest snapshot from a previous
//! install is preferred over the cached manifest.

use anyhow::Result;

use roguetech_installer::catalog;
use roguetech_installer::config::InstallerConfig;
use roguetech_installer::installer::Installer;
use roguetech_installer::preflight;

/// Execute the listing
pub fn execute(config: InstallerConfig) -> Result<()> {
    preflight::check_for_list(&config)?;

    let installer = Installer::new(config);
    installer.cache_roguetech_files()?;

    let manifest = installer.listing_manifest()?;
    let groups = catalog::option_groups(&manifest)?;
    print!("{}", catalog::render(&groups));
    Ok(())
}
