use std::fmt::{self, Debug, Formatter};
use std::time::Duration;

use parking_lot::Mutex as PlMutex;
pub use parking_lot::MutexGuard;

use crate::error::{SyncError, SyncResult};

/// A non-recursive mutex with a fallible contract.
///
/// Reentrant locking from the same thread is a programmer error: like
/// [`parking_lot::Mutex`], this type deadlocks rather than panics on
/// self-deadlock. Callers that need reentrant locking must track that
/// themselves; `kvcore-wal`'s append lock and `kvcore-skiplist`'s level
/// RNG are both written to never re-enter.
pub struct Mutex<T: ?Sized> {
    inner: PlMutex<T>,
}

impl<T> Mutex<T> {
    #[must_use]
    pub fn new(value: T) -> Self {
        Self { inner: PlMutex::new(value) }
    }

    pub fn into_inner(self) -> T {
        self.inner.into_inner()
    }
}

impl<T: ?Sized> Mutex<T> {
    /// Blocks until the lock is acquired.
    pub fn lock(&self) -> SyncResult<MutexGuard<'_, T>> {
        Ok(self.inner.lock())
    }

    /// Fails with [`SyncError::WouldBlock`] instead of blocking.
    pub fn try_lock(&self) -> SyncResult<MutexGuard<'_, T>> {
        self.inner.try_lock().ok_or(SyncError::WouldBlock)
    }

    /// Fails with [`SyncError::Timeout`] if the lock isn't acquired in time.
    pub fn try_lock_for(&self, timeout: Duration) -> SyncResult<MutexGuard<'_, T>> {
        self.inner.try_lock_for(timeout).ok_or(SyncError::Timeout)
    }
}

impl<T: Debug + ?Sized> Debug for Mutex<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mutex").field("inner", &self.inner).finish()
    }
}
