//! Colour management for snapshot output
//!
//! Honors `--no-color` and the `NO_COLOR` environment variable, and falls
//! back to plain text whenever colours are off.

use colored::{ColoredString, Colorize};

/// Manages colour output for the CLI application
#[derive(Debug, Clone)]
pub struct ColourManager {
    enabled: bool,
}

impl ColourManager {
    /// Create a ColourManager with explicit colour control
    ///
    /// `NO_COLOR` still wins over an explicit enable.
    pub fn with_colours(enabled: bool) -> Self {
        let no_color_env = std::env::var_os("NO_COLOR").map_or(false, |v| !v.is_empty());
        Self {
            enabled: enabled && !no_color_env,
        }
    }

    /// Create a ColourManager from the `--no-color` flag
    pub fn from_args(no_color_flag: bool) -> Self {
        Self::with_colours(!no_color_flag)
    }

    pub fn colours_enabled(&self) -> bool {
        self.enabled
    }

    /// Title of a destructive toast
    pub fn destructive(&self, text: &str) -> ColoredString {
        if self.enabled {
            text.red().bold()
        } else {
            text.normal()
        }
    }

    /// A toast that has been dismissed and awaits removal
    pub fn closed(&self, text: &str) -> ColoredString {
        if self.enabled {
            text.dimmed()
        } else {
            text.normal()
        }
    }

    /// Snapshot headers
    pub fn header(&self, text: &str) -> ColoredString {
        if self.enabled {
            text.cyan()
        } else {
            text.normal()
        }
    }

    /// Action labels
    pub fn action(&self, text: &str) -> ColoredString {
        if self.enabled {
            text.yellow()
        } else {
            text.normal()
        }
    }
}
