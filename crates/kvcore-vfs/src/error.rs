use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VfsError {
    #[error("no such file or directory")]
    NotFound,
    #[error("lockfile is already held")]
    AlreadyLocked,
    #[error("invalid argument")]
    InvalidArgument,
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl VfsError {
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
            || matches!(self, Self::Io(err) if err.kind() == io::ErrorKind::NotFound)
    }
}

pub type VfsResult<T> = Result<T, VfsError>;
