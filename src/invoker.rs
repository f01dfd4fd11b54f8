//! Build invokers: the owners an `info` cache is bound to
//!
//! Capabilities are split across traits. [`InfoInvoker`] is all an owner
//! needs to answer `info`; [`BuildInvoker`] adds the operations only a full
//! build integration can provide. An owner that cannot build simply does not
//! implement [`BuildInvoker`], so those calls cannot be written against it.

use crate::cache::{CacheState, InfoCache, Outcome};
use crate::command::{BuildCommand, BuildSystemName, CommandName};
use crate::config::InfoConfig;
use crate::context::{BuildContext, EventType};
use crate::error::{InfoError, InfoResult};
use crate::executor::WorkerPool;
use crate::info::BuildInfo;
use crate::invocation::{spawn_info, InfoRunner, ProcessRunner};
use crate::wait::wait_for;
use async_trait::async_trait;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// An owner that can report its build binary's `info`
#[async_trait]
pub trait InfoInvoker: Send + Sync {
    fn binary_path(&self) -> &str;

    fn build_system_name(&self) -> BuildSystemName;

    /// The owner's `info` report, computed at most once per owner.
    ///
    /// A failure is also computed once: later calls return the same error.
    async fn build_info(&self) -> InfoResult<Arc<BuildInfo>>;
}

/// An owner that can also run builds
pub trait BuildInvoker: InfoInvoker {
    /// Collects outputs of a finished build
    type ResultHelper;
    /// Runs build commands for this owner
    type CommandRunner;
    /// Capability queries for the build system
    type BuildSystem;

    fn create_build_result_helper(&self) -> Self::ResultHelper;

    fn command_runner(&self) -> Self::CommandRunner;

    fn supports_home_rc(&self) -> bool;

    fn build_system(&self) -> &Self::BuildSystem;

    fn supports_parallelism(&self) -> bool;
}

/// Owner that only answers `info`
///
/// Holds one [`InfoCache`], created empty with the invoker and dropped with
/// it. It is not a [`BuildInvoker`]:
///
/// ```compile_fail
/// use buildinfo::{BuildInvoker, InfoOnlyInvoker};
///
/// fn needs_builds<I: BuildInvoker>(_: &I) {}
///
/// fn check(invoker: &InfoOnlyInvoker) {
///     needs_builds(invoker);
/// }
/// ```
pub struct InfoOnlyInvoker {
    binary_path: String,
    build_system: BuildSystemName,
    context: Arc<BuildContext>,
    pool: WorkerPool,
    runner: Arc<dyn InfoRunner>,
    startup_flags: Vec<String>,
    info_flags: Vec<String>,
    working_dir: Option<PathBuf>,
    cache: InfoCache,
}

impl InfoOnlyInvoker {
    /// Invoker that runs `binary_path` as a child process
    pub fn new(
        binary_path: impl Into<String>,
        build_system: BuildSystemName,
        context: Arc<BuildContext>,
        pool: WorkerPool,
    ) -> Self {
        Self {
            binary_path: binary_path.into(),
            build_system,
            context,
            pool,
            runner: Arc::new(ProcessRunner::new()),
            startup_flags: Vec::new(),
            info_flags: Vec::new(),
            working_dir: None,
            cache: InfoCache::new(),
        }
    }

    /// Invoker for the binary, build system and flags in `config`
    pub fn from_config(config: &InfoConfig, context: Arc<BuildContext>, pool: WorkerPool) -> Self {
        let mut invoker = Self::new(config.binary_path(), config.build_system, context, pool);
        invoker.startup_flags = config.startup_flags.clone();
        invoker.info_flags = config.info_flags.clone();
        invoker
    }

    /// Replace how the `info` command is run
    pub fn with_runner(mut self, runner: Arc<dyn InfoRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Run `info` in this directory (usually the workspace root)
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn context(&self) -> &Arc<BuildContext> {
        &self.context
    }

    pub fn cache_state(&self) -> CacheState {
        self.cache.state()
    }

    /// The command `build_info` runs
    pub fn info_command(&self) -> BuildCommand {
        let mut builder = BuildCommand::builder(self.binary_path.clone(), CommandName::Info)
            .startup_flags(self.startup_flags.iter().cloned())
            .flags(self.info_flags.iter().cloned());
        if let Some(dir) = &self.working_dir {
            builder = builder.working_dir(dir.clone());
        }
        builder.build()
    }

    /// Submit the run now and return the wait for it.
    fn fetch(&self) -> impl Future<Output = Outcome> + Send + 'static {
        let command = self.info_command();
        debug!(command = %command, "Requesting build info");

        let handle = spawn_info(
            &self.pool,
            Arc::clone(&self.runner),
            command,
            self.build_system,
        );
        let name = self.build_system.display_name();
        let wait = wait_for(Arc::clone(&self.context), handle)
            .timed(format!("{}Info", name), EventType::BuildInvocation)
            .with_progress_message(format!("Running {} info...", name))
            .on_success(format!("{} info done", name))
            .on_error(format!("Could not run {} info", name));
        let binary_path = self.binary_path.clone();

        async move {
            wait.run()
                .await
                .into_result()
                .map(Arc::new)
                .map_err(|cause| InfoError::sync_failed(binary_path, cause))
        }
    }
}

#[async_trait]
impl InfoInvoker for InfoOnlyInvoker {
    fn binary_path(&self) -> &str {
        &self.binary_path
    }

    fn build_system_name(&self) -> BuildSystemName {
        self.build_system
    }

    async fn build_info(&self) -> InfoResult<Arc<BuildInfo>> {
        self.cache.get_or_fetch(&self.pool, || self.fetch()).await
    }
}
