use kvcore_sync::SyncError;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkiplistError {
    #[error("invalid argument")]
    InvalidArgument,
    #[error("key already exists")]
    AlreadyExists,
    #[error("key not found")]
    NotFound,
    #[error("lost a race with a concurrent mutation, retry")]
    Busy,
}

pub type SkiplistResult<T> = Result<T, SkiplistError>;

// A `kvcore_sync` lock only reports `SyncError` for the `try_*`/timed
// variants, never for plain `read`/`write`; this conversion exists so `?`
// reads without resorting to `unwrap` at every call site.
impl From<SyncError> for SkiplistError {
    fn from(_: SyncError) -> Self {
        Self::Busy
    }
}
