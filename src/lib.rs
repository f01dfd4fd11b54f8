//! buildinfo - memoized access to a build tool's `info` output
//!
//! Runs `<binary> info` at most once per owner, parses its `key: value`
//! report, and caches the report (or the failure) for the owner's lifetime.
//! Concurrent callers share one in-flight run.
//!
//! ```rust,ignore
//! use buildinfo::{BuildContext, InfoInvoker, InfoOnlyInvoker, UiContext, WorkerPool};
//! use buildinfo::BuildSystemName;
//!
//! let context = Arc::new(BuildContext::new(UiContext::detect()));
//! let invoker = InfoOnlyInvoker::new("bazel", BuildSystemName::Bazel, context, WorkerPool::current());
//!
//! let info = invoker.build_info().await?;
//! println!("execution root: {:?}", info.execution_root());
//! ```

pub mod cache;
pub mod command;
pub mod config;
pub mod context;
pub mod error;
pub mod executor;
pub mod info;
pub mod invocation;
pub mod invoker;
pub mod ui;
pub mod wait;

pub use cache::{CacheState, InfoCache};
pub use command::{BuildCommand, BuildSystemName, CommandName};
pub use config::{ConfigManager, InfoConfig};
pub use context::{BuildContext, EventType, TimingEvent};
pub use error::{InfoError, InfoResult, InvocationError, WaitError};
pub use executor::WorkerPool;
pub use info::BuildInfo;
pub use invocation::{InfoRunner, ProcessRunner};
pub use invoker::{BuildInvoker, InfoInvoker, InfoOnlyInvoker};
pub use ui::UiContext;
