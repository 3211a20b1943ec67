use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Result as IoResult, Write};
use std::path::{Path, PathBuf};

use fs4::fs_std::FileExt;

use crate::error::{VfsError, VfsResult};
use crate::traits::{Filesystem, Lockfile, WritableFile};

impl WritableFile for BufWriter<File> {
    fn sync_data(&mut self) -> IoResult<()> {
        self.get_ref().sync_data()
    }
}

/// A held advisory lock on the engine's data directory. Unlocks on drop;
/// errors from the unlock syscall are swallowed since there is nothing a
/// destructor can usefully do with them.
pub struct StdLockfile {
    file: File,
}

impl Lockfile for StdLockfile {}

impl Drop for StdLockfile {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

fn map_io(err: std::io::Error) -> VfsError {
    if err.kind() == std::io::ErrorKind::NotFound {
        VfsError::NotFound
    } else {
        VfsError::Io(err)
    }
}

/// Filesystem backed by the real operating system, rooted at no particular
/// directory (callers pass absolute or relative paths through as-is).
#[derive(Debug, Default, Clone, Copy)]
pub struct StdFilesystem;

impl Filesystem for StdFilesystem {
    type ReadFile = BufReader<File>;
    type AppendFile = BufWriter<File>;
    type Lockfile = StdLockfile;

    fn create_dir_all(&self, path: &Path) -> VfsResult<()> {
        fs::create_dir_all(path).map_err(map_io)
    }

    fn open_read(&self, path: &Path) -> VfsResult<Self::ReadFile> {
        File::open(path).map(BufReader::new).map_err(map_io)
    }

    fn open_append(&self, path: &Path) -> VfsResult<Self::AppendFile> {
        File::options()
            .append(true)
            .create(true)
            .open(path)
            .map(BufWriter::new)
            .map_err(map_io)
    }

    fn exists(&self, path: &Path) -> VfsResult<bool> {
        path.try_exists().map_err(map_io)
    }

    fn size_of(&self, path: &Path) -> VfsResult<u64> {
        path.metadata().map(|metadata| metadata.len()).map_err(map_io)
    }

    fn list_dir(&self, dir: &Path) -> VfsResult<Vec<PathBuf>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir).map_err(map_io)? {
            entries.push(entry.map_err(map_io)?.file_name().into());
        }
        Ok(entries)
    }

    fn remove_file(&self, path: &Path) -> VfsResult<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(VfsError::Io(err)),
        }
    }

    fn lock_directory(&self, path: &Path) -> VfsResult<Self::Lockfile> {
        // `append` instead of `write` so opening an existing lockfile never
        // truncates whatever a previous holder left in it.
        let file = File::options()
            .append(true)
            .create(true)
            .open(path)
            .map_err(map_io)?;
        match FileExt::try_lock_exclusive(&file) {
            Ok(true) => Ok(StdLockfile { file }),
            Ok(false) => Err(VfsError::AlreadyLocked),
            Err(err) => Err(map_io(err)),
        }
    }
}

/// Writes `contents` to `path`, truncating if it exists, and syncs. Used by
/// callers that need a one-shot full rewrite rather than the append path
/// (e.g. writing a fresh `CURRENT`-style marker file).
pub fn write_file_sync(path: &Path, contents: &[u8]) -> VfsResult<()> {
    let mut file = File::create(path).map_err(map_io)?;
    file.write_all(contents).map_err(map_io)?;
    file.sync_data().map_err(map_io)?;
    Ok(())
}
