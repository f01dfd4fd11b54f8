//! Build command descriptions
//!
//! A [`BuildCommand`] is the executable description of one build-tool
//! invocation: binary, subcommand and flags. Running it is the job of an
//! [`InfoRunner`](crate::invocation::InfoRunner).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Which build system a binary belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildSystemName {
    Blaze,
    #[default]
    Bazel,
}

impl BuildSystemName {
    /// Human-readable name used in progress and error messages
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Blaze => "Blaze",
            Self::Bazel => "Bazel",
        }
    }

    /// Lowercase name, also the prefix of output directory keys (`bazel-bin`)
    pub fn lowercase_name(&self) -> &'static str {
        match self {
            Self::Blaze => "blaze",
            Self::Bazel => "bazel",
        }
    }
}

impl fmt::Display for BuildSystemName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Build tool subcommand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandName {
    Info,
    Build,
    Query,
}

impl CommandName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Build => "build",
            Self::Query => "query",
        }
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One build tool command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildCommand {
    binary_path: String,
    name: CommandName,
    startup_flags: Vec<String>,
    flags: Vec<String>,
    working_dir: Option<PathBuf>,
}

impl BuildCommand {
    /// Start building a command for `binary_path <name>`
    pub fn builder(binary_path: impl Into<String>, name: CommandName) -> BuildCommandBuilder {
        BuildCommandBuilder {
            command: BuildCommand {
                binary_path: binary_path.into(),
                name,
                startup_flags: Vec::new(),
                flags: Vec::new(),
                working_dir: None,
            },
        }
    }

    pub fn binary_path(&self) -> &str {
        &self.binary_path
    }

    pub fn name(&self) -> CommandName {
        self.name
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }

    /// Arguments after the binary: startup flags, subcommand, command flags
    pub fn args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.startup_flags.len() + self.flags.len() + 1);
        args.extend(self.startup_flags.iter().cloned());
        args.push(self.name.as_str().to_string());
        args.extend(self.flags.iter().cloned());
        args
    }
}

impl fmt::Display for BuildCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.binary_path)?;
        for arg in self.args() {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Builder for [`BuildCommand`]
#[derive(Debug, Clone)]
pub struct BuildCommandBuilder {
    command: BuildCommand,
}

impl BuildCommandBuilder {
    /// Add a flag placed before the subcommand (e.g. `--output_base=...`)
    pub fn startup_flag(mut self, flag: impl Into<String>) -> Self {
        self.command.startup_flags.push(flag.into());
        self
    }

    pub fn startup_flags<I, S>(mut self, flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.command
            .startup_flags
            .extend(flags.into_iter().map(Into::into));
        self
    }

    /// Add a flag placed after the subcommand
    pub fn flag(mut self, flag: impl Into<String>) -> Self {
        self.command.flags.push(flag.into());
        self
    }

    pub fn flags<I, S>(mut self, flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.command.flags.extend(flags.into_iter().map(Into::into));
        self
    }

    /// Directory the command runs in, usually the workspace root
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.command.working_dir = Some(dir.into());
        self
    }

    pub fn build(self) -> BuildCommand {
        self.command
    }
}
