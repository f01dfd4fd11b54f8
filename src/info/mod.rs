//! Parsed `info` output
//!
//! [`BuildInfo`] is created once per successful invocation and never changes
//! afterwards; callers share it through an `Arc`.

mod parser;

pub use parser::parse_info_output;

use crate::command::BuildSystemName;
use indexmap::IndexMap;
use serde::Serialize;
use std::path::Path;

pub const EXECUTION_ROOT_KEY: &str = "execution_root";
pub const OUTPUT_BASE_KEY: &str = "output_base";
pub const OUTPUT_PATH_KEY: &str = "output_path";
pub const PACKAGE_PATH_KEY: &str = "package_path";
pub const RELEASE_KEY: &str = "release";

/// Immutable `key -> value` report from `<binary> info`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildInfo {
    build_system: BuildSystemName,
    entries: IndexMap<String, String>,
}

impl BuildInfo {
    pub fn new(build_system: BuildSystemName, entries: IndexMap<String, String>) -> Self {
        Self {
            build_system,
            entries,
        }
    }

    /// Parse decoded `info` output
    pub fn from_output(build_system: BuildSystemName, text: &str) -> Self {
        Self::new(build_system, parse_info_output(text))
    }

    pub fn build_system(&self) -> BuildSystemName {
        self.build_system
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Entries in the order they first appeared in the output
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn as_map(&self) -> &IndexMap<String, String> {
        &self.entries
    }

    pub fn execution_root(&self) -> Option<&Path> {
        self.get(EXECUTION_ROOT_KEY).map(Path::new)
    }

    pub fn output_base(&self) -> Option<&Path> {
        self.get(OUTPUT_BASE_KEY).map(Path::new)
    }

    pub fn output_path(&self) -> Option<&Path> {
        self.get(OUTPUT_PATH_KEY).map(Path::new)
    }

    pub fn package_path(&self) -> Option<&str> {
        self.get(PACKAGE_PATH_KEY)
    }

    pub fn release(&self) -> Option<&str> {
        self.get(RELEASE_KEY)
    }

    /// `blaze-bin` or `bazel-bin`, depending on the build system
    pub fn bin_directory(&self) -> Option<&Path> {
        self.output_dir("bin")
    }

    pub fn genfiles_directory(&self) -> Option<&Path> {
        self.output_dir("genfiles")
    }

    pub fn testlogs_directory(&self) -> Option<&Path> {
        self.output_dir("testlogs")
    }

    fn output_dir(&self, suffix: &str) -> Option<&Path> {
        let key = format!("{}-{}", self.build_system.lowercase_name(), suffix);
        self.get(&key).map(Path::new)
    }
}
