//! Error types for buildinfo
//!
//! Failures are layered: [`InvocationError`] covers running the build binary,
//! [`WaitError`] covers waiting for that run, and [`InfoError`] is what callers
//! of the public API see. Parsing never fails.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for buildinfo operations
pub type InfoResult<T> = Result<T, InfoError>;

/// All errors surfaced by the public API
///
/// `Clone` so that one cached failure can be handed to every caller of an
/// owner, present and future.
#[derive(Error, Debug, Clone)]
pub enum InfoError {
    #[error("Failed to run `{binary_path} info`")]
    SyncFailed {
        binary_path: String,
        #[source]
        cause: Arc<WaitError>,
    },

    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: Arc<std::io::Error>,
    },
}

impl InfoError {
    /// Create a sync failure for the given build binary
    pub fn sync_failed(binary_path: impl Into<String>, cause: WaitError) -> Self {
        Self::SyncFailed {
            binary_path: binary_path.into(),
            cause: Arc::new(cause),
        }
    }

    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source: Arc::new(source),
        }
    }

    /// The wait-level cause of a sync failure, if any
    pub fn wait_cause(&self) -> Option<&WaitError> {
        match self {
            Self::SyncFailed { cause, .. } => Some(cause),
            _ => None,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self.wait_cause()? {
            WaitError::Invocation(InvocationError::Spawn { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                Some("Check that the build binary path exists and is executable")
            }
            WaitError::TimedOut(_) => Some("Raise `timeout_secs` in the buildinfo config"),
            _ => None,
        }
    }
}

/// Failure while waiting for an in-flight invocation
#[derive(Error, Debug)]
pub enum WaitError {
    #[error(transparent)]
    Invocation(#[from] InvocationError),

    #[error("Timed out after {0:?}")]
    TimedOut(Duration),

    #[error("Cancelled")]
    Cancelled,

    #[error("Worker task failed: {0}")]
    WorkerFailed(String),
}

/// Failure running the build binary or reading its output
#[derive(Error, Debug)]
pub enum InvocationError {
    #[error("Command failed to start: {command}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read output of: {command}")]
    Read {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command failed: {command}, exit code: {code}, stderr: {stderr}")]
    Exit {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("Command terminated by signal: {command}")]
    Signaled { command: String },
}

impl InvocationError {
    /// Create a spawn error
    pub fn spawn(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::Spawn {
            command: command.into(),
            source,
        }
    }

    /// Create a read error
    pub fn read(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::Read {
            command: command.into(),
            source,
        }
    }
}
