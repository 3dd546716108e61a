//! CLI argument parsing and command dispatch

use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser};

use roguetech_installer::config::{FailurePolicy, InstallerConfig};
use roguetech_installer::defaults::{self, INJECTOR_RUNTIME};
use roguetech_installer::output::OutputConfig;

use crate::commands;

/// RogueTech Installer - Install the RogueTech mod collection for BATTLETECH
#[derive(Parser, Debug)]
#[command(name = "roguetech-installer")]
#[command(version, about, long_about = None, disable_help_flag = true)]
pub struct Cli {
    /// List the enabled and disabled RogueTech options and exit
    #[arg(short, long)]
    pub list: bool,

    /// Suppress checking for updates of RogueTech data
    #[arg(short, long)]
    pub noupdate: bool,

    /// Print verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Colorize output (always, never, auto)
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    pub color: String,

    /// BATTLETECH install directory (the BattleTech.app bundle)
    #[arg(long, value_name = "PATH", env = "RT_INSTALL_DIR")]
    pub install_dir: Option<PathBuf>,

    /// What to do when a task fails (abort, continue)
    #[arg(long, value_name = "POLICY", default_value = "abort")]
    pub on_task_error: FailurePolicy,

    /// Architecture identifier, such as x86_64 or arm64
    #[arg(long, value_name = "ID", env = "RT_ARCH")]
    pub arch: Option<String>,

    /// External program for BasicJsonMerge tasks, called with source and target
    #[arg(long, value_name = "CMD", env = "RT_JSON_MERGE_COMMAND")]
    pub json_merge_command: Option<String>,

    /// Program used to run the ModTek injector
    #[arg(long, value_name = "PROGRAM", env = "RT_INJECTOR_RUNTIME", default_value = INJECTOR_RUNTIME)]
    pub injector_runtime: String,

    /// Print help
    #[arg(short, long)]
    pub help: bool,
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        let output = OutputConfig::from_env_and_flag(&self.color);
        let list = self.list;
        let config = self.installer_config();

        if list {
            commands::list::execute(config)
        } else {
            commands::install::execute(config, &output)
        }
    }

    /// Log filter used when `RUST_LOG` is unset.
    pub fn log_filter(&self) -> &str {
        if self.verbose {
            "debug"
        } else {
            self.log_level.as_str()
        }
    }

    pub fn print_help() {
        // Nothing useful to do if stdout is gone
        let _ = Self::command().print_help();
    }

    pub fn installer_config(self) -> InstallerConfig {
        let install_dir = self
            .install_dir
            .unwrap_or_else(defaults::default_install_dir);
        let mut config = InstallerConfig::new(install_dir);
        config.check_updates = !self.noupdate;
        config.failure_policy = self.on_task_error;
        if let Some(arch) = self.arch {
            config.arch = arch;
        }
        config.json_merge_command = self.json_merge_command;
        config.injector_runtime = self.injector_runtime;
        config
    }
}
