use std::time::Duration;

use parking_lot::{Condvar as PlCondvar, MutexGuard};

use crate::error::{SyncError, SyncResult};

/// A condition variable tied to [`crate::Mutex`]'s guard type.
///
/// Spurious wakeups are permitted: callers must re-check the guarded
/// predicate themselves after `wait`/`timed_wait` return, the same
/// contract `std::sync::Condvar` documents.
#[derive(Debug, Default)]
pub struct CondVar {
    inner: PlCondvar,
}

impl CondVar {
    #[must_use]
    pub fn new() -> Self {
        Self { inner: PlCondvar::new() }
    }

    /// Blocks until notified. May return spuriously.
    pub fn wait<T>(&self, guard: &mut MutexGuard<'_, T>) -> SyncResult<()> {
        self.inner.wait(guard);
        Ok(())
    }

    /// Fails with [`SyncError::Timeout`] on expiry. May return spuriously
    /// before the timeout, in which case the result is still `Ok`.
    pub fn timed_wait<T>(
        &self,
        guard:   &mut MutexGuard<'_, T>,
        timeout: Duration,
    ) -> SyncResult<()> {
        if self.inner.wait_for(guard, timeout).timed_out() {
            Err(SyncError::Timeout)
        } else {
            Ok(())
        }
    }

    pub fn notify_one(&self) -> SyncResult<()> {
        self.inner.notify_one();
        Ok(())
    }

    pub fn notify_all(&self) -> SyncResult<()> {
        self.inner.notify_all();
        Ok(())
    }
}
