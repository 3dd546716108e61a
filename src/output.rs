//! # Output Configuration
//!
//! Summary lines printed by the binary use emoji markers on colour-capable
//! terminals and bracketed text markers elsewhere.
//!
//! In `auto` mode the following are honoured:
//! - `NO_COLOR` set to anything disables markers (https://no-color.org/)
//! - `CLICOLOR=0` disables them
//! - `CLICOLOR_FORCE=1` enables them even without a TTY
//! - `TERM=dumb` disables them
//!
//! ```rust,ignore
//! use roguetech_installer::output::{OutputConfig, Marker};
//!
//! let config = OutputConfig::from_env_and_flag("auto");
//! println!("{}", config.status(Marker::Success, "Installed"));
//! ```

use std::env;

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether emoji markers should be used.
    pub use_color: bool,
}

/// Kinds of summary line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Start,
    Success,
    Failure,
    Skipped,
}

impl Marker {
    fn emoji(self) -> &'static str {
        match self {
            Marker::Start => "🔧",
            Marker::Success => "✅",
            Marker::Failure => "❌",
            Marker::Skipped => "⏭️",
        }
    }

    fn plain(self) -> &'static str {
        match self {
            Marker::Start => "[....]",
            Marker::Success => "[OK]",
            Marker::Failure => "[FAIL]",
            Marker::Skipped => "[SKIP]",
        }
    }
}

impl OutputConfig {
    /// `color_flag` is `always`, `never` or `auto`; anything else means
    /// `auto`.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        // Presence alone disables, even when empty
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }

    /// `marker` followed by `message`.
    pub fn status(&self, marker: Marker, message: &str) -> String {
        format!(
            "{} {}",
            emoji(self, marker.emoji(), marker.plain()),
            message
        )
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// `emoji_str` when colours are enabled, `plain` otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}
