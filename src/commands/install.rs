//! Install command implementation
//!
//! Runs the whole install: precondition checks, scaffold and caches, the
//! special components, then the manifest tasks.

use std::time::Instant;

use anyhow::Result;

use roguetech_installer::config::InstallerConfig;
use roguetech_installer::installer::Installer;
use roguetech_installer::output::{Marker, OutputConfig};
use roguetech_installer::preflight;

/// Execute the install
pub fn execute(config: InstallerConfig, output: &OutputConfig) -> Result<()> {
    let start_time = Instant::now();

    preflight::check_for_install(&config)?;

    println!(
        "{}",
        output.status(
            Marker::Start,
            &format!("Installing RogueTech into {}", config.install_dir.display())
        )
    );

    let installer = Installer::new(config);
    installer.cache_roguetech_files()?;

    let patcher = installer.modtek_injector();
    let merger = installer.json_merger()?;

    match installer.perform_install(&patcher, merger.as_ref()) {
        Ok(report) => {
            let duration = start_time.elapsed();
            println!(
                "{}",
                output.status(
                    Marker::Success,
                    &format!("Installed in {:.2}s", duration.as_secs_f64())
                )
            );
            println!("   {} tasks installed", report.executed.len());
            if !report.unsupported.is_empty() {
                println!(
                    "{}",
                    output.status(
                        Marker::Skipped,
                        &format!("Unsupported tasks: {}", report.unsupported.join(", "))
                    )
                );
            }
            Ok(())
        }
        Err(e) => {
            println!("{}", output.status(Marker::Failure, "Install failed"));
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_execute_missing_install_dir() {
        let temp_dir = TempDir::new().unwrap();
        let config = InstallerConfig::new(temp_dir.path().join("BattleTech.app"));

        let result = execute(config, &OutputConfig { use_color: false });

        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Failed to find BATTLETECH install directory"));
    }

    #[test]
    fn test_execute_missing_runtime() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = InstallerConfig::new(temp_dir.path());
        config.injector_runtime = "definitely-not-mono".to_string();

        let result = execute(config, &OutputConfig { use_color: false });

        assert!(result.unwrap_err().to_string().contains("mono must be installed"));
    }
}
