use kvcore_arena::ArenaError;
use kvcore_skiplist::SkiplistError;
use kvcore_sync::SyncError;
use kvcore_vfs::VfsError;
use kvcore_wal::WalError;
use thiserror::Error;

/// Closed error taxonomy for the engine (spec §7). `NotFound` and
/// `AlreadyExists` are not variants here: a missing key on `get`/`delete`
/// is absence, not failure (see [`crate::engine::Engine::get`]), and
/// `AlreadyExists` never escapes the skiplist layer.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid argument")]
    InvalidArgument,
    #[error("write-ahead log I/O failed, store is now degraded: {0}")]
    IoFailed(#[source] std::io::Error),
    #[error("write-ahead log is corrupted beyond automatic truncation tolerance: {0}")]
    Corrupted(String),
    #[error("lost a race with a concurrent mutation and retry also failed")]
    Busy,
    #[error("operation was cancelled")]
    Cancelled,
    #[error("operation timed out")]
    Timeout,
    #[error("engine is closed")]
    Closed,
    #[error("internal invariant violated: {0}")]
    Internal(String),
}

pub type EngineResult<T> = Result<T, EngineError>;

impl From<WalError> for EngineError {
    fn from(err: WalError) -> Self {
        match err {
            WalError::Io(VfsError::Io(io_err)) => Self::IoFailed(io_err),
            WalError::Io(other) => Self::IoFailed(std::io::Error::other(other.to_string())),
            WalError::InvalidArgument => Self::InvalidArgument,
            WalError::Corrupt(msg) => Self::Corrupted(msg),
        }
    }
}

impl From<VfsError> for EngineError {
    fn from(err: VfsError) -> Self {
        match err {
            VfsError::Io(io_err) => Self::IoFailed(io_err),
            other => Self::IoFailed(std::io::Error::other(other.to_string())),
        }
    }
}

impl From<SkiplistError> for EngineError {
    fn from(err: SkiplistError) -> Self {
        match err {
            SkiplistError::InvalidArgument => Self::InvalidArgument,
            SkiplistError::Busy => Self::Busy,
            SkiplistError::AlreadyExists | SkiplistError::NotFound => {
                Self::Internal(format!("unexpected skiplist error surfaced to engine: {err}"))
            }
        }
    }
}

impl From<SyncError> for EngineError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Timeout => Self::Timeout,
            SyncError::WouldBlock => Self::Busy,
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<ArenaError> for EngineError {
    fn from(err: ArenaError) -> Self {
        Self::Internal(err.to_string())
    }
}
