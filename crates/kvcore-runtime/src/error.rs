use std::io;

use thiserror::Error;

/// Failures from the runtime itself, distinct from whatever error type a
/// task's own future resolves to.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("invalid argument")]
    InvalidArgument,
    #[error("task was cancelled")]
    Cancelled,
    #[error("operation timed out")]
    Timeout,
    #[error("I/O readiness poller failed: {0}")]
    PollFailed(#[source] io::Error),
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;
