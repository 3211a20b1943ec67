use kvcore_vfs::VfsError;
use thiserror::Error;

/// Failures from appending to or replaying a write-ahead log.
///
/// None of these are meant to be retried automatically: an [`Io`](WalError::Io)
/// during append should be surfaced to the engine as a degraded-mode trigger,
/// and [`Corrupt`](WalError::Corrupt) should only ever come from `replay`
/// encountering a segment file name it can't parse (bad records within a
/// segment are not an error; see [`crate::replay`]).
#[derive(Error, Debug)]
pub enum WalError {
    #[error("filesystem error: {0}")]
    Io(#[from] VfsError),
    #[error("invalid argument")]
    InvalidArgument,
    #[error("segment file name is not a valid WAL segment: {0}")]
    Corrupt(String),
}

pub type WalResult<T> = Result<T, WalError>;
