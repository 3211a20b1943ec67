use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::error::{SyncError, SyncResult};

/// A counting semaphore.
///
/// Built directly on [`parking_lot::Mutex`]/[`Condvar`] rather than on
/// [`crate::Mutex`]/[`crate::CondVar`], since the latter pair's fallible
/// `wait` would force every acquire to thread spurious-wakeup retry logic
/// through two layers of `Result`.
#[derive(Debug)]
pub struct Semaphore {
    state: Mutex<usize>,
    available: Condvar,
}

impl Semaphore {
    #[must_use]
    pub fn new(permits: usize) -> Self {
        Self {
            state: Mutex::new(permits),
            available: Condvar::new(),
        }
    }

    /// Blocks until a permit is available.
    pub fn acquire(&self) -> SyncResult<()> {
        let mut permits = self.state.lock();
        while *permits == 0 {
            self.available.wait(&mut permits);
        }
        *permits -= 1;
        Ok(())
    }

    /// Fails with [`SyncError::WouldBlock`] instead of blocking.
    pub fn try_acquire(&self) -> SyncResult<()> {
        let mut permits = self.state.lock();
        if *permits == 0 {
            return Err(SyncError::WouldBlock);
        }
        *permits -= 1;
        Ok(())
    }

    /// Fails with [`SyncError::Timeout`] if no permit becomes available in time.
    pub fn try_acquire_for(&self, timeout: Duration) -> SyncResult<()> {
        let deadline = Instant::now() + timeout;
        let mut permits = self.state.lock();
        while *permits == 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(SyncError::Timeout);
            }
            let timed_out = self.available.wait_for(&mut permits, remaining).timed_out();
            if timed_out && *permits == 0 {
                return Err(SyncError::Timeout);
            }
        }
        *permits -= 1;
        Ok(())
    }

    /// Releases a single permit back to the semaphore.
    pub fn release(&self) -> SyncResult<()> {
        *self.state.lock() += 1;
        self.available.notify_one();
        Ok(())
    }
}
