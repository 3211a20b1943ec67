use std::io::{Read, Result as IoResult, Write};
use std::path::{Path, PathBuf};

use crate::error::VfsResult;

/// A file opened for sequential reading, used to replay WAL segments.
pub trait ReadableFile: Read {}
impl<T: Read> ReadableFile for T {}

/// A file opened for sequential appends, used for WAL segment writes.
///
/// Plain [`Write`] plus an explicit durability barrier, since buffered
/// writers otherwise only promise the data reached the OS, not the disk.
pub trait WritableFile: Write {
    /// Flushes data (not necessarily metadata) to persistent storage.
    /// See [`std::fs::File::sync_data`].
    fn sync_data(&mut self) -> IoResult<()>;
}

/// An advisory lock held on the engine's data directory, preventing a
/// second process from opening the same store concurrently. Dropping it
/// releases the lock; it is intentionally not [`Clone`].
pub trait Lockfile {}

/// Filesystem operations the write-ahead log and engine need: append/read
/// WAL segment files, list and delete them, and hold one advisory lock on
/// the data directory for the lifetime of an open engine.
pub trait Filesystem {
    type ReadFile: ReadableFile;
    type AppendFile: WritableFile;
    type Lockfile: Lockfile;

    /// Creates `path` and any missing parent directories, tolerating an
    /// already-existing directory.
    fn create_dir_all(&self, path: &Path) -> VfsResult<()>;

    /// Opens `path` for sequential reading. Fails with
    /// [`crate::VfsError::NotFound`] if it does not exist.
    fn open_read(&self, path: &Path) -> VfsResult<Self::ReadFile>;

    /// Opens `path` for appending, creating it if it does not exist and
    /// leaving any existing contents untouched.
    fn open_append(&self, path: &Path) -> VfsResult<Self::AppendFile>;

    /// Returns whether a filesystem entry exists at `path`.
    fn exists(&self, path: &Path) -> VfsResult<bool>;

    /// Returns the size, in bytes, of the file at `path`.
    fn size_of(&self, path: &Path) -> VfsResult<u64>;

    /// Lists the immediate children of a directory, as file names (not
    /// full paths) relative to `dir`.
    fn list_dir(&self, dir: &Path) -> VfsResult<Vec<PathBuf>>;

    /// Deletes the file at `path`. Tolerates it already being absent.
    fn remove_file(&self, path: &Path) -> VfsResult<()>;

    /// Opens (creating if necessary) and locks `path` as an advisory
    /// single-holder lock. Fails with [`crate::VfsError::AlreadyLocked`]
    /// if another lock holder is already present.
    fn lock_directory(&self, path: &Path) -> VfsResult<Self::Lockfile>;
}
