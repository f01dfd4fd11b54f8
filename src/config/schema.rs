//! Configuration schema for buildinfo
//!
//! Configuration is stored at `~/.config/buildinfo/config.toml`

use crate::command::BuildSystemName;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InfoConfig {
    /// Build system the binary belongs to
    pub build_system: BuildSystemName,

    /// Build binary to run (default: the build system's lowercase name on PATH)
    pub binary_path: Option<String>,

    /// Give up waiting for `info` after N seconds (0 or unset = no limit)
    pub timeout_secs: Option<u64>,

    /// Flags placed before the `info` subcommand
    pub startup_flags: Vec<String>,

    /// Flags placed after the `info` subcommand
    pub info_flags: Vec<String>,

    /// Show a progress line while waiting
    pub show_progress: bool,
}

impl InfoConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Configured binary, or the build system's default binary name
    pub fn binary_path(&self) -> &str {
        self.binary_path
            .as_deref()
            .unwrap_or_else(|| self.build_system.lowercase_name())
    }
}

impl Default for InfoConfig {
    fn default() -> Self {
        Self {
            build_system: BuildSystemName::default(),
            binary_path: None,
            timeout_secs: None,
            startup_flags: Vec::new(),
            info_flags: Vec::new(),
            show_progress: true,
        }
    }
}
