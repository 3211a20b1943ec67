//! Fallible synchronization primitives: [`Mutex`], [`RwLock`], [`Spinlock`],
//! [`Semaphore`], [`CondVar`], and [`Atomic64`].
//!
//! Every operation returns a [`SyncResult`] instead of panicking, so that
//! components several layers up (the skiplist's per-level locks, the WAL's
//! append lock) can propagate a typed failure to their callers rather than
//! aborting the process.

mod atomic;
mod condvar;
mod error;
mod mutex;
mod rwlock;
mod semaphore;
mod spinlock;

pub use self::atomic::Atomic64;
pub use self::condvar::CondVar;
pub use self::error::{SyncError, SyncResult};
pub use self::mutex::{Mutex, MutexGuard};
pub use self::rwlock::{RwLock, RwLockReadGuard, RwLockWriteGuard};
pub use self::semaphore::Semaphore;
pub use self::spinlock::{Spinlock, SpinlockGuard};
