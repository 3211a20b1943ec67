use thiserror::Error;

/// Failure kinds shared by every synchronization primitive in this crate.
///
/// Every primitive in `kvcore-sync` returns a [`SyncResult`] rather than
/// panicking or silently succeeding, so that callers several layers up
/// (the skiplist's level locks, the WAL's append mutex) can propagate a
/// typed failure instead of aborting the process.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncError {
    #[error("invalid argument")]
    InvalidArgument,
    #[error("primitive failed to initialize")]
    InitFailed,
    #[error("failed to acquire lock")]
    LockFailed,
    #[error("failed to release lock")]
    UnlockFailed,
    #[error("wait on condition variable failed")]
    WaitFailed,
    #[error("signal or notify failed")]
    SignalFailed,
    #[error("operation timed out")]
    Timeout,
    #[error("operation would block")]
    WouldBlock,
}

pub type SyncResult<T> = Result<T, SyncError>;
