//! Single-flight cache for one owner's `info` report
//!
//! The slot moves `Empty -> Pending -> Ready` or `Empty -> Pending -> Failed`
//! and never leaves `Ready` or `Failed`. Failures are cached like successes:
//! a fresh attempt needs a fresh owner.
//!
//! The slot lock is only held to inspect or swap the state, never across an
//! await. While `Pending`, the slot holds a shared handle to the in-flight
//! future, so concurrent callers join the same computation instead of starting
//! one. A driver task on the worker pool also awaits that future and settles
//! the slot, so it reaches `Ready` or `Failed` even when every caller has
//! stopped waiting.

use crate::error::InfoError;
use crate::executor::WorkerPool;
use crate::info::BuildInfo;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Result handed to every caller of a cache
pub type Outcome = Result<Arc<BuildInfo>, InfoError>;

type InFlight = Shared<BoxFuture<'static, Outcome>>;

enum Slot {
    Empty,
    Pending(InFlight),
    Ready(Arc<BuildInfo>),
    Failed(InfoError),
}

/// Observable state of an [`InfoCache`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Empty,
    Pending,
    Ready,
    Failed,
}

/// Holds at most one `info` report (or failure) for its owner's lifetime
pub struct InfoCache {
    slot: Arc<Mutex<Slot>>,
}

impl InfoCache {
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot::Empty)),
        }
    }

    pub fn state(&self) -> CacheState {
        match &*self.lock() {
            Slot::Empty => CacheState::Empty,
            Slot::Pending(_) => CacheState::Pending,
            Slot::Ready(_) => CacheState::Ready,
            Slot::Failed(_) => CacheState::Failed,
        }
    }

    /// The stored report, if the slot is `Ready`
    pub fn cached(&self) -> Option<Arc<BuildInfo>> {
        match &*self.lock() {
            Slot::Ready(info) => Some(Arc::clone(info)),
            _ => None,
        }
    }

    /// Return the stored outcome, or compute it with `fetch`.
    ///
    /// `fetch` is called at most once per cache, under the slot lock, and must
    /// only build the future: it should not block. The future is driven to
    /// completion on `pool` whether or not the caller keeps waiting.
    pub async fn get_or_fetch<F, Fut>(&self, pool: &WorkerPool, fetch: F) -> Outcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Outcome> + Send + 'static,
    {
        let in_flight = {
            let mut slot = self.lock();
            let joined = match &*slot {
                Slot::Ready(info) => return Ok(Arc::clone(info)),
                Slot::Failed(err) => return Err(err.clone()),
                Slot::Pending(in_flight) => Some(in_flight.clone()),
                Slot::Empty => None,
            };
            match joined {
                Some(in_flight) => {
                    debug!("Joining in-flight info request");
                    in_flight
                }
                None => {
                    debug!("Info cache empty, starting request");
                    let in_flight = fetch().boxed().shared();
                    *slot = Slot::Pending(in_flight.clone());
                    let driver = in_flight.clone();
                    let target = Arc::clone(&self.slot);
                    pool.submit(async move {
                        let outcome = driver.await;
                        settle(&target, &outcome);
                    });
                    in_flight
                }
            }
        };

        let outcome = in_flight.await;
        settle(&self.slot, &outcome);
        outcome
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        lock(&self.slot)
    }
}

fn lock(slot: &Mutex<Slot>) -> MutexGuard<'_, Slot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Move `Pending` to its terminal state; later observers are no-ops.
fn settle(slot: &Mutex<Slot>, outcome: &Outcome) {
    let mut slot = lock(slot);
    if !matches!(*slot, Slot::Pending(_)) {
        return;
    }
    *slot = match outcome {
        Ok(info) => {
            debug!(entries = info.len(), "Info cached");
            Slot::Ready(Arc::clone(info))
        }
        Err(err) => {
            debug!(error = %err, "Info request failed, caching failure");
            Slot::Failed(err.clone())
        }
    };
}

impl Default for InfoCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InfoCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfoCache")
            .field("state", &self.state())
            .finish()
    }
}
