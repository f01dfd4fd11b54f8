//! Timed, cancellable waits on pool work
//!
//! ```rust,ignore
//! let result = wait_for(context, handle)
//!     .timed("BazelInfo", EventType::BuildInvocation)
//!     .with_progress_message("Running Bazel info...")
//!     .on_success("Bazel info done")
//!     .on_error("Could not run Bazel info")
//!     .run()
//!     .await;
//! ```

use crate::context::{BuildContext, EventType, TimingEvent};
use crate::error::{InvocationError, WaitError};
use crate::ui::TaskSpinner;
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Outcome of a [`WaitForFuture`]
#[derive(Debug)]
pub struct FutureResult<T> {
    outcome: Result<T, WaitError>,
}

impl<T> FutureResult<T> {
    pub fn success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn result(&self) -> Option<&T> {
        self.outcome.as_ref().ok()
    }

    pub fn error(&self) -> Option<&WaitError> {
        self.outcome.as_ref().err()
    }

    pub fn into_result(self) -> Result<T, WaitError> {
        self.outcome
    }
}

/// Start describing a wait on `handle` within `context`
pub fn wait_for<T>(
    context: Arc<BuildContext>,
    handle: JoinHandle<Result<T, InvocationError>>,
) -> WaitForFuture<T> {
    WaitForFuture {
        context,
        handle,
        timing: None,
        progress_message: None,
        success_message: None,
        error_message: None,
    }
}

/// Builder for a wait; nothing happens until [`WaitForFuture::run`]
pub struct WaitForFuture<T> {
    context: Arc<BuildContext>,
    handle: JoinHandle<Result<T, InvocationError>>,
    timing: Option<(String, EventType)>,
    progress_message: Option<String>,
    success_message: Option<String>,
    error_message: Option<String>,
}

impl<T: Send + 'static> WaitForFuture<T> {
    /// Record a timing event under `name` when the wait ends
    pub fn timed(mut self, name: impl Into<String>, event_type: EventType) -> Self {
        self.timing = Some((name.into(), event_type));
        self
    }

    pub fn with_progress_message(mut self, message: impl Into<String>) -> Self {
        self.progress_message = Some(message.into());
        self
    }

    /// Message shown when the wait succeeds; without one the spinner is cleared
    pub fn on_success(mut self, message: impl Into<String>) -> Self {
        self.success_message = Some(message.into());
        self
    }

    /// Message shown and logged when the wait fails
    pub fn on_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    /// Wait for the work, bounded by the context's timeout and cancellation.
    ///
    /// Work that has already finished wins over cancellation. The pool task is
    /// aborted when the wait gives up on it.
    pub async fn run(self) -> FutureResult<T> {
        let mut spinner = TaskSpinner::new(self.context.ui());
        if self.context.show_progress() {
            if let Some(message) = &self.progress_message {
                spinner.start(message);
            }
        }

        let started_at = Utc::now();
        let start = Instant::now();
        let outcome = join_bounded(
            self.handle,
            self.context.cancellation_token(),
            self.context.timeout(),
        )
        .await;
        let duration = start.elapsed();

        if let Some((name, event_type)) = self.timing {
            debug!(event = %name, ?duration, success = outcome.is_ok(), "Timed wait finished");
            self.context.record_timing(TimingEvent {
                name,
                event_type,
                started_at,
                duration,
                success: outcome.is_ok(),
            });
        }

        match &outcome {
            Ok(_) => match &self.success_message {
                Some(message) if self.context.show_progress() => spinner.stop(message),
                _ => spinner.clear(),
            },
            Err(e) => {
                let message = self.error_message.as_deref().unwrap_or("Wait failed");
                warn!(error = %e, "{}", message);
                if self.context.show_progress() {
                    spinner.stop_error(message);
                }
            }
        }

        FutureResult { outcome }
    }
}

async fn join_bounded<T>(
    handle: JoinHandle<Result<T, InvocationError>>,
    cancel: &CancellationToken,
    timeout: Option<Duration>,
) -> Result<T, WaitError> {
    let abort = handle.abort_handle();

    let joined = async move {
        match handle.await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(WaitError::Invocation(e)),
            Err(e) => Err(WaitError::WorkerFailed(e.to_string())),
        }
    };

    let bounded = async move {
        match timeout {
            Some(limit) => tokio::time::timeout(limit, joined)
                .await
                .unwrap_or(Err(WaitError::TimedOut(limit))),
            None => joined.await,
        }
    };

    let outcome = tokio::select! {
        biased;
        outcome = bounded => outcome,
        _ = cancel.cancelled() => Err(WaitError::Cancelled),
    };

    if matches!(outcome, Err(WaitError::Cancelled | WaitError::TimedOut(_))) {
        abort.abort();
    }
    outcome
}
