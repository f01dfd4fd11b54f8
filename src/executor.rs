//! Worker pool handle
//!
//! The pool is a tokio runtime owned by the host application. This crate
//! only submits work to it and never starts or shuts it down.

use std::future::Future;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Submits work to an externally owned tokio runtime
#[derive(Debug, Clone)]
pub struct WorkerPool {
    handle: Handle,
}

impl WorkerPool {
    /// Use the runtime the caller is running on
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime, like [`Handle::current`].
    /// Use [`WorkerPool::try_current`] where that is possible.
    pub fn current() -> Self {
        Self {
            handle: Handle::current(),
        }
    }

    /// Use the runtime the caller is running on, if there is one
    pub fn try_current() -> Option<Self> {
        Handle::try_current().ok().map(Self::from_handle)
    }

    pub fn from_handle(handle: Handle) -> Self {
        Self { handle }
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    /// Run a future on the pool; returns immediately
    pub fn submit<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.handle.spawn(future)
    }

    /// Run blocking work on the pool's blocking threads
    pub fn submit_blocking<F, R>(&self, work: F) -> JoinHandle<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        self.handle.spawn_blocking(work)
    }
}
