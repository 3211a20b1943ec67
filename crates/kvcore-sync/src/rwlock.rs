use std::fmt::{self, Debug, Formatter};
use std::time::Duration;

use parking_lot::RwLock as PlRwLock;
pub use parking_lot::{RwLockReadGuard, RwLockWriteGuard};

use crate::error::{SyncError, SyncResult};

/// A reader-preferring read/write lock with a fallible contract.
///
/// Built on [`parking_lot::RwLock`]: concurrent readers never block each
/// other, and parking_lot's eventual-fairness scheme is relied on to
/// prevent writer starvation rather than strict reader priority. This is
/// the documented implementation choice for the "reader-preferring"
/// contract; `kvcore-skiplist` uses one of these per level so that readers
/// traversing a level never contend with each other, only with the rare
/// writer splicing that level.
pub struct RwLock<T: ?Sized> {
    inner: PlRwLock<T>,
}

impl<T> RwLock<T> {
    #[must_use]
    pub fn new(value: T) -> Self {
        Self { inner: PlRwLock::new(value) }
    }

    pub fn into_inner(self) -> T {
        self.inner.into_inner()
    }
}

impl<T: ?Sized> RwLock<T> {
    pub fn read(&self) -> SyncResult<RwLockReadGuard<'_, T>> {
        Ok(self.inner.read())
    }

    pub fn try_read(&self) -> SyncResult<RwLockReadGuard<'_, T>> {
        self.inner.try_read().ok_or(SyncError::WouldBlock)
    }

    pub fn try_read_for(&self, timeout: Duration) -> SyncResult<RwLockReadGuard<'_, T>> {
        self.inner.try_read_for(timeout).ok_or(SyncError::Timeout)
    }

    pub fn write(&self) -> SyncResult<RwLockWriteGuard<'_, T>> {
        Ok(self.inner.write())
    }

    pub fn try_write(&self) -> SyncResult<RwLockWriteGuard<'_, T>> {
        self.inner.try_write().ok_or(SyncError::WouldBlock)
    }

    pub fn try_write_for(&self, timeout: Duration) -> SyncResult<RwLockWriteGuard<'_, T>> {
        self.inner.try_write_for(timeout).ok_or(SyncError::Timeout)
    }
}

impl<T: Debug + ?Sized> Debug for RwLock<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("RwLock").field("inner", &self.inner).finish()
    }
}
