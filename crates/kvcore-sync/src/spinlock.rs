#![expect(unsafe_code, reason = "hand-rolled lock needs raw access to its UnsafeCell")]

use std::cell::UnsafeCell;
use std::fmt::{self, Debug, Formatter};
use std::hint;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{SyncError, SyncResult};

/// A busy-waiting lock for short critical sections where parking a thread
/// would cost more than spinning.
///
/// Not reentrant; spinning on a lock already held by the current thread
/// spins forever.
pub struct Spinlock<T: ?Sized> {
    locked: AtomicBool,
    value:  UnsafeCell<T>,
}

// SAFETY: `locked` gates all access to `value`; only one `SpinlockGuard`
// can exist at a time, which is enough to make `T: Send` sufficient for
// `Sync`, same as `std::sync::Mutex`.
unsafe impl<T: ?Sized + Send> Sync for Spinlock<T> {}

impl<T> Spinlock<T> {
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            locked: AtomicBool::new(false),
            value:  UnsafeCell::new(value),
        }
    }

    pub fn into_inner(self) -> T {
        self.value.into_inner()
    }
}

impl<T: ?Sized> Spinlock<T> {
    pub fn lock(&self) -> SyncResult<SpinlockGuard<'_, T>> {
        while self
            .locked
            .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            hint::spin_loop();
        }
        Ok(SpinlockGuard { lock: self })
    }

    pub fn try_lock(&self) -> SyncResult<SpinlockGuard<'_, T>> {
        self.locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .map(|_| SpinlockGuard { lock: self })
            .map_err(|_| SyncError::WouldBlock)
    }
}

pub struct SpinlockGuard<'a, T: ?Sized> {
    lock: &'a Spinlock<T>,
}

impl<T: ?Sized> Deref for SpinlockGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: holding the guard implies `locked` was successfully set,
        // and is only cleared on guard drop, so access is exclusive.
        unsafe { &*self.lock.value.get() }
    }
}

impl<T: ?Sized> DerefMut for SpinlockGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: see `Deref`.
        unsafe { &mut *self.lock.value.get() }
    }
}

impl<T: ?Sized> Drop for SpinlockGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.locked.store(false, Ordering::Release);
    }
}

impl<T: Debug + ?Sized> Debug for Spinlock<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.try_lock() {
            Ok(guard) => f.debug_struct("Spinlock").field("value", &*guard).finish(),
            Err(_) => f.write_str("Spinlock { <locked> }"),
        }
    }
}
