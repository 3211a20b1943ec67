//! Filesystem abstraction the write-ahead log and engine open their data
//! directory through: a real-disk implementation for production and an
//! in-memory one for tests, behind the same [`Filesystem`] trait.

mod error;
mod memory_fs;
mod std_fs;
mod traits;

pub use self::error::{VfsError, VfsResult};
pub use self::memory_fs::{MemoryAppendFile, MemoryFilesystem, MemoryLockfile, MemoryReadFile};
pub use self::std_fs::{write_file_sync, StdFilesystem, StdLockfile};
pub use self::traits::{Filesystem, Lockfile, ReadableFile, WritableFile};
