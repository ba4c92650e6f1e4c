//! Cancellable delayed callbacks.
//!
//! DESIGN
//! ======
//! `ScheduledTask` is a handle to one callback that runs after a delay on the
//! tokio runtime. `Debouncer` keeps at most one of them alive: scheduling a
//! new callback aborts the previous one if it has not fired yet.
//!
//! The callback itself is synchronous. Anything long-running it starts must
//! be spawned separately, so cancelling a timer can never abort work that
//! already began.

#[cfg(test)]
#[path = "debounce_test.rs"]
mod debounce_test;

use std::sync::Mutex;
use std::time::Duration;

use tokio::task::AbortHandle;

use crate::state::lock;

/// Handle to a callback scheduled with [`ScheduledTask::after`].
#[derive(Debug)]
pub struct ScheduledTask {
    handle: AbortHandle,
}

impl ScheduledTask {
    /// Run `callback` once `delay` has elapsed, unless cancelled first.
    ///
    /// Must be called from within a tokio runtime.
    pub fn after<F>(delay: Duration, callback: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let join = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            callback();
        });
        Self { handle: join.abort_handle() }
    }

    /// Cancel the callback. Returns `true` if it had not fired yet.
    pub fn cancel(&self) -> bool {
        let pending = self.is_pending();
        self.handle.abort();
        pending
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        !self.handle.is_finished()
    }
}

/// Coalesces bursts of calls into one callback after a quiet period.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<ScheduledTask>>,
}

impl Debouncer {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self { delay, pending: Mutex::new(None) }
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `callback`, superseding any callback that has not fired yet.
    pub fn schedule<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let task = ScheduledTask::after(self.delay, callback);
        if let Some(previous) = lock(&self.pending).replace(task) {
            previous.cancel();
        }
    }

    /// Cancel the pending callback, if any. Returns `true` if one was dropped.
    pub fn cancel(&self) -> bool {
        lock(&self.pending).take().is_some_and(|task| task.cancel())
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        lock(&self.pending)
            .as_ref()
            .is_some_and(ScheduledTask::is_pending)
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
