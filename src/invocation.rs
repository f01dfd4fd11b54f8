//! Running `<binary> info`
//!
//! [`InfoRunner`] is the seam between this crate and the process that
//! produces the report; [`ProcessRunner`] is the implementation that spawns
//! the real build binary. [`spawn_info`] submits a run to the worker pool and
//! turns its stdout into a [`BuildInfo`].

use crate::command::{BuildCommand, BuildSystemName};
use crate::error::InvocationError;
use crate::executor::WorkerPool;
use crate::info::BuildInfo;
use async_trait::async_trait;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Max number of stderr lines kept in exit errors.
const STDERR_TAIL_LINES: usize = 20;

/// Runs an `info` command and returns its raw stdout
#[async_trait]
pub trait InfoRunner: Send + Sync {
    async fn run_info(&self, command: &BuildCommand) -> Result<Vec<u8>, InvocationError>;
}

/// Runs the build binary as a child process
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl InfoRunner for ProcessRunner {
    async fn run_info(&self, command: &BuildCommand) -> Result<Vec<u8>, InvocationError> {
        let rendered = command.to_string();
        debug!(command = %rendered, "Spawning build tool");

        let mut cmd = Command::new(command.binary_path());
        cmd.args(command.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // The child is killed and reaped if this future is dropped or a read fails.
            .kill_on_drop(true);
        if let Some(dir) = command.working_dir() {
            cmd.current_dir(dir);
        }

        let mut child = cmd
            .spawn()
            .map_err(|e| InvocationError::spawn(rendered.clone(), e))?;

        let (stdout, stderr) =
            tokio::try_join!(read_pipe(child.stdout.take()), read_pipe(child.stderr.take()))
                .map_err(|e| InvocationError::read(rendered.clone(), e))?;

        let status = child
            .wait()
            .await
            .map_err(|e| InvocationError::read(rendered.clone(), e))?;

        if !status.success() {
            let stderr = stderr_tail(&String::from_utf8_lossy(&stderr));
            warn!(command = %rendered, status = %status, "Build tool failed");
            return Err(match status.code() {
                Some(code) => InvocationError::Exit {
                    command: rendered,
                    code,
                    stderr,
                },
                None => InvocationError::Signaled { command: rendered },
            });
        }

        debug!(command = %rendered, bytes = stdout.len(), "Build tool finished");
        Ok(stdout)
    }
}

async fn read_pipe<R: AsyncRead + Unpin>(pipe: Option<R>) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

/// Last `STDERR_TAIL_LINES` lines of stderr, enough to be actionable.
fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

/// Decode raw `info` output as UTF-8 and trim the whole blob.
///
/// Invalid sequences become U+FFFD rather than failing the invocation.
pub fn decode_output(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim().to_string()
}

/// Submit one `info` run to the pool.
///
/// The returned handle resolves to the parsed report; decoding and parsing
/// run on the pool after the runner finishes.
pub fn spawn_info(
    pool: &WorkerPool,
    runner: Arc<dyn InfoRunner>,
    command: BuildCommand,
    build_system: BuildSystemName,
) -> JoinHandle<Result<BuildInfo, InvocationError>> {
    pool.submit(async move {
        let bytes = runner.run_info(&command).await?;
        Ok(BuildInfo::from_output(build_system, &decode_output(&bytes)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandName;

    struct FixedRunner(&'static [u8]);

    #[async_trait]
    impl InfoRunner for FixedRunner {
        async fn run_info(&self, _command: &BuildCommand) -> Result<Vec<u8>, InvocationError> {
            Ok(self.0.to_vec())
        }
    }

    struct FailingRunner;

    #[async_trait]
    impl InfoRunner for FailingRunner {
        async fn run_info(&self, command: &BuildCommand) -> Result<Vec<u8>, InvocationError> {
            Err(InvocationError::Exit {
                command: command.to_string(),
                code: 37,
                stderr: "server crashed".to_string(),
            })
        }
    }

    fn info_command() -> BuildCommand {
        BuildCommand::builder("bazel", CommandName::Info).build()
    }

    #[test]
    fn decode_trims_and_replaces_invalid_utf8() {
        assert_eq!(decode_output(b"\n  release: 7 \n\n"), "release: 7");
        assert_eq!(decode_output(b"key: \xff"), "key: \u{fffd}");
        assert_eq!(decode_output(b""), "");
    }

    #[test]
    fn stderr_tail_keeps_last_lines() {
        let stderr: String = (0..30).map(|i| format!("line {}\n", i)).collect();
        let tail = stderr_tail(&stderr);
        assert!(tail.starts_with("line 10"));
        assert!(tail.ends_with("line 29"));
        assert_eq!(stderr_tail("only"), "only");
    }

    #[tokio::test]
    async fn spawn_info_parses_output() {
        let pool = WorkerPool::current();
        let runner = Arc::new(FixedRunner(b"noise\noutput_base: /o\nrelease: 7\n"));
        let info = spawn_info(&pool, runner, info_command(), BuildSystemName::Bazel)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(info.get("output_base"), Some("/o"));
        assert_eq!(info.len(), 2);
        assert_eq!(info.build_system(), BuildSystemName::Bazel);
    }

    #[tokio::test]
    async fn spawn_info_propagates_runner_error() {
        let pool = WorkerPool::current();
        let err = spawn_info(&pool, Arc::new(FailingRunner), info_command(), BuildSystemName::Blaze)
            .await
            .unwrap()
            .unwrap_err();

        assert!(matches!(err, InvocationError::Exit { code: 37, .. }));
    }

    #[tokio::test]
    async fn process_runner_reports_missing_binary() {
        let command = BuildCommand::builder("/nonexistent/buildinfo-test-binary", CommandName::Info)
            .build();
        let err = ProcessRunner::new().run_info(&command).await.unwrap_err();
        assert!(matches!(err, InvocationError::Spawn { .. }));
    }
}
