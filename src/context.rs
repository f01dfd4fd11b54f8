//! Owner context: progress display, cancellation, wait policy and timings

use crate::config::InfoConfig;
use crate::ui::UiContext;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Category of a timed wait
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    BuildInvocation,
}

/// One completed timed wait
#[derive(Debug, Clone, Serialize)]
pub struct TimingEvent {
    pub name: String,
    pub event_type: EventType,
    pub started_at: DateTime<Utc>,
    pub duration: Duration,
    pub success: bool,
}

/// Context shared by everything running on behalf of one owner session
///
/// Usually held in an `Arc`; cancelling it fails every wait in progress.
#[derive(Debug)]
pub struct BuildContext {
    ui: UiContext,
    cancel: CancellationToken,
    timeout: Option<Duration>,
    show_progress: bool,
    timings: Mutex<Vec<TimingEvent>>,
}

impl BuildContext {
    pub fn new(ui: UiContext) -> Self {
        Self {
            ui,
            cancel: CancellationToken::new(),
            timeout: None,
            show_progress: true,
            timings: Mutex::new(Vec::new()),
        }
    }

    /// Context with the wait policy taken from config
    pub fn from_config(ui: UiContext, config: &InfoConfig) -> Self {
        let mut ctx = Self::new(ui).with_progress(config.show_progress);
        ctx.timeout = config.timeout();
        ctx
    }

    /// Bound every wait in this context
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn ui(&self) -> &UiContext {
        &self.ui
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn show_progress(&self) -> bool {
        self.show_progress
    }

    /// Cancel the session; waits in progress fail with `Cancelled`
    pub fn cancel(&self) {
        debug!("Build context cancelled");
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn record_timing(&self, event: TimingEvent) {
        self.lock_timings().push(event);
    }

    /// Snapshot of the timings recorded so far, oldest first
    pub fn timings(&self) -> Vec<TimingEvent> {
        self.lock_timings().clone()
    }

    fn lock_timings(&self) -> MutexGuard<'_, Vec<TimingEvent>> {
        self.timings.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
