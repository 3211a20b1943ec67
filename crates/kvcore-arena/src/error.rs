use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArenaError {
    #[error("invalid argument")]
    InvalidArgument,
    #[error("allocator failed to initialize")]
    InitFailed,
    #[error("underlying allocation failed")]
    AllocFailed,
    #[error("mode switch attempted with outstanding allocations")]
    ArenaBusy,
}

pub type ArenaResult<T> = Result<T, ArenaError>;
