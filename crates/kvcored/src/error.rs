use kvcore_engine::EngineError;
use thiserror::Error;

/// Top-level failure of the binary, carrying enough information to pick
/// the right process exit code.
#[derive(Error, Debug)]
pub(crate) enum KvcoredError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("I/O error opening the store: {0}")]
    Open(#[source] std::io::Error),
    #[error("write-ahead log is corrupted beyond automatic truncation tolerance: {0}")]
    Corrupted(String),
    #[error("internal invariant violated: {0}")]
    Internal(String),
}

impl From<EngineError> for KvcoredError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::IoFailed(io_err) => Self::Open(io_err),
            EngineError::Corrupted(msg) => Self::Corrupted(msg),
            EngineError::InvalidArgument => Self::Internal("invalid argument reached process-level code".to_owned()),
            EngineError::Busy | EngineError::Cancelled | EngineError::Timeout | EngineError::Closed => {
                Self::Internal(err.to_string())
            }
            EngineError::Internal(msg) => Self::Internal(msg),
        }
    }
}

impl KvcoredError {
    /// Maps this failure onto the process exit code table: 1 = configuration
    /// error, 2 = I/O error on open, 3 = corrupted WAL beyond tolerance,
    /// 4 = internal invariant violation.
    #[must_use]
    pub(crate) fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 1,
            Self::Open(_) => 2,
            Self::Corrupted(_) => 3,
            Self::Internal(_) => 4,
        }
    }
}
