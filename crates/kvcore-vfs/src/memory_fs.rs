use std::collections::{HashMap, HashSet};
use std::io::{Cursor, Read, Result as IoResult, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use kvcore_sync::Mutex;

use crate::error::{VfsError, VfsResult};
use crate::traits::{Filesystem, Lockfile, WritableFile};

#[derive(Default)]
struct Inner {
    files: HashMap<PathBuf, Vec<u8>>,
    dirs: HashSet<PathBuf>,
    locks: HashSet<PathBuf>,
}

/// An in-memory filesystem for tests that would otherwise need a real
/// `tempfile::TempDir`: exercises the same [`Filesystem`] contract the WAL
/// and engine are written against, without touching disk. Does not model
/// symlinks or permissions; good enough for crash-free unit tests, not for
/// testing actual durability.
#[derive(Default, Clone)]
pub struct MemoryFilesystem {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryFilesystem {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

pub struct MemoryReadFile {
    cursor: Cursor<Vec<u8>>,
}

impl Read for MemoryReadFile {
    fn read(&mut self, buf: &mut [u8]) -> IoResult<usize> {
        self.cursor.read(buf)
    }
}

pub struct MemoryAppendFile {
    inner: Arc<Mutex<Inner>>,
    path: PathBuf,
}

impl Write for MemoryAppendFile {
    fn write(&mut self, buf: &[u8]) -> IoResult<usize> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| std::io::Error::other("memory filesystem lock poisoned"))?;
        inner.files.entry(self.path.clone()).or_default().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> IoResult<()> {
        Ok(())
    }
}

impl WritableFile for MemoryAppendFile {
    fn sync_data(&mut self) -> IoResult<()> {
        Ok(())
    }
}

pub struct MemoryLockfile {
    inner: Arc<Mutex<Inner>>,
    path: PathBuf,
}

impl Lockfile for MemoryLockfile {}

impl Drop for MemoryLockfile {
    fn drop(&mut self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.locks.remove(&self.path);
        }
    }
}

fn parent_chain(path: &Path) -> impl Iterator<Item = &Path> {
    path.ancestors().skip(1)
}

impl Filesystem for MemoryFilesystem {
    type ReadFile = MemoryReadFile;
    type AppendFile = MemoryAppendFile;
    type Lockfile = MemoryLockfile;

    fn create_dir_all(&self, path: &Path) -> VfsResult<()> {
        let mut inner = self.inner.lock().map_err(|_| VfsError::InvalidArgument)?;
        inner.dirs.insert(path.to_path_buf());
        for ancestor in parent_chain(path) {
            inner.dirs.insert(ancestor.to_path_buf());
        }
        Ok(())
    }

    fn open_read(&self, path: &Path) -> VfsResult<Self::ReadFile> {
        let inner = self.inner.lock().map_err(|_| VfsError::InvalidArgument)?;
        let contents = inner.files.get(path).ok_or(VfsError::NotFound)?.clone();
        Ok(MemoryReadFile { cursor: Cursor::new(contents) })
    }

    fn open_append(&self, path: &Path) -> VfsResult<Self::AppendFile> {
        let mut inner = self.inner.lock().map_err(|_| VfsError::InvalidArgument)?;
        inner.files.entry(path.to_path_buf()).or_default();
        Ok(MemoryAppendFile { inner: Arc::clone(&self.inner), path: path.to_path_buf() })
    }

    fn exists(&self, path: &Path) -> VfsResult<bool> {
        let inner = self.inner.lock().map_err(|_| VfsError::InvalidArgument)?;
        Ok(inner.files.contains_key(path) || inner.dirs.contains(path))
    }

    fn size_of(&self, path: &Path) -> VfsResult<u64> {
        let inner = self.inner.lock().map_err(|_| VfsError::InvalidArgument)?;
        let len = inner.files.get(path).ok_or(VfsError::NotFound)?.len();
        u64::try_from(len).map_err(|_| VfsError::InvalidArgument)
    }

    fn list_dir(&self, dir: &Path) -> VfsResult<Vec<PathBuf>> {
        let inner = self.inner.lock().map_err(|_| VfsError::InvalidArgument)?;
        let mut names: Vec<PathBuf> = inner
            .files
            .keys()
            .filter(|path| path.parent() == Some(dir))
            .filter_map(|path| path.file_name().map(PathBuf::from))
            .collect();
        names.sort();
        Ok(names)
    }

    fn remove_file(&self, path: &Path) -> VfsResult<()> {
        let mut inner = self.inner.lock().map_err(|_| VfsError::InvalidArgument)?;
        inner.files.remove(path);
        Ok(())
    }

    fn lock_directory(&self, path: &Path) -> VfsResult<Self::Lockfile> {
        let mut inner = self.inner.lock().map_err(|_| VfsError::InvalidArgument)?;
        if !inner.locks.insert(path.to_path_buf()) {
            return Err(VfsError::AlreadyLocked);
        }
        Ok(MemoryLockfile { inner: Arc::clone(&self.inner), path: path.to_path_buf() })
    }
}
