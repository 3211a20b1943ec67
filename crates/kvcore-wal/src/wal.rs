use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;

use kvcore_sync::{Atomic64, Mutex};
use kvcore_vfs::{Filesystem, VfsError, WritableFile};

use crate::config::{SyncPolicy, WalConfig};
use crate::error::{WalError, WalResult};
use crate::record::{encode_record, read_record, ReadOutcome, RecordKind};
use crate::replay::ReplaySink;
use crate::segment::{parse_segment_name, segment_path};

fn list_segments<F: Filesystem>(fs: &F, dir: &Path) -> WalResult<Vec<u64>> {
    let mut sequences: Vec<u64> = fs
        .list_dir(dir)?
        .into_iter()
        .filter_map(|name| parse_segment_name(&name.to_string_lossy()))
        .collect();
    sequences.sort_unstable();
    Ok(sequences)
}

fn map_io(err: std::io::Error) -> WalError {
    WalError::Io(VfsError::Io(err))
}

struct WriterState<F: Filesystem> {
    file: F::AppendFile,
    segment_first_sequence: u64,
    segment_size: u64,
}

/// The append-only write-ahead log: one append mutex, any number of segment
/// files in `dir`, and the sequence counter that names them (§4.4, §6.1).
pub struct Wal<F: Filesystem> {
    fs: F,
    dir: PathBuf,
    config: WalConfig,
    next_sequence: Atomic64,
    writer: Mutex<WriterState<F>>,
}

impl<F: Filesystem> Wal<F> {
    /// Opens (creating if needed) the WAL rooted at `dir`, replaying every
    /// existing segment into `sink` before returning (§4.4.3).
    pub fn open(
        fs: F,
        dir: impl Into<PathBuf>,
        config: WalConfig,
        sink: &mut impl ReplaySink,
    ) -> WalResult<Self> {
        let dir = dir.into();
        fs.create_dir_all(&dir)?;
        let segments = list_segments(&fs, &dir)?;

        let mut next_sequence = 1_u64;
        'segments: for &first_sequence in &segments {
            let path = segment_path(&dir, first_sequence);
            let mut reader = fs.open_read(&path)?;
            loop {
                match read_record(&mut reader) {
                    ReadOutcome::Record(record) => {
                        match record.kind {
                            RecordKind::Put => sink.apply_put(&record.key, &record.value),
                            RecordKind::Delete => sink.apply_delete(&record.key),
                            RecordKind::Commit => {}
                        }
                        next_sequence = record.sequence.saturating_add(1);
                    }
                    ReadOutcome::EndOfLog => break 'segments,
                }
            }
        }

        let (segment_first_sequence, file, segment_size) =
            Self::open_active_segment(&fs, &dir, &segments, next_sequence, &config)?;

        Ok(Self {
            fs,
            dir,
            config,
            next_sequence: Atomic64::new(next_sequence),
            writer: Mutex::new(WriterState { file, segment_first_sequence, segment_size }),
        })
    }

    fn open_active_segment(
        fs: &F,
        dir: &Path,
        existing: &[u64],
        next_sequence: u64,
        config: &WalConfig,
    ) -> WalResult<(u64, F::AppendFile, u64)> {
        if let Some(&last) = existing.last() {
            let path = segment_path(dir, last);
            let size = fs.size_of(&path)?;
            if size < config.segment_bytes {
                let file = fs.open_append(&path)?;
                return Ok((last, file, size));
            }
        }
        let path = segment_path(dir, next_sequence);
        let file = fs.open_append(&path)?;
        Ok((next_sequence, file, 0))
    }

    /// Appends a record (§4.4.2) and returns its sequence number.
    pub fn append(&self, kind: RecordKind, key: &[u8], value: &[u8]) -> WalResult<u64> {
        if !matches!(kind, RecordKind::Commit) && key.is_empty() {
            return Err(WalError::InvalidArgument);
        }

        let mut writer = self.writer.lock().map_err(|_| WalError::InvalidArgument)?;
        let sequence = self.next_sequence.fetch_add(1, Ordering::AcqRel).map_err(|_| WalError::InvalidArgument)?;

        let mut buf = Vec::new();
        encode_record(&mut buf, kind, sequence, key, value);
        #[expect(clippy::unwrap_used, reason = "a single record is never close to u64::MAX bytes")]
        let record_len = u64::try_from(buf.len()).unwrap();

        if writer.segment_size + record_len > self.config.segment_bytes {
            writer.file.sync_data().map_err(map_io)?;
            let path = segment_path(&self.dir, sequence);
            writer.file = self.fs.open_append(&path)?;
            writer.segment_first_sequence = sequence;
            writer.segment_size = 0;
        }

        writer.file.write_all(&buf).map_err(map_io)?;

        let should_sync = match self.config.sync_policy {
            SyncPolicy::SyncEveryWrite => true,
            SyncPolicy::SyncOnCommit => matches!(kind, RecordKind::Commit),
            SyncPolicy::NoSync => false,
        };
        if should_sync {
            writer.file.sync_data().map_err(map_io)?;
        }

        writer.segment_size += record_len;
        Ok(sequence)
    }

    /// Deletes every segment whose entire sequence range falls below
    /// `sequence`, never touching the active segment. Not part of the core
    /// contract (§4.4); called by the engine after a checkpoint to bound disk
    /// usage, since segments are otherwise append-only and never reclaimed.
    pub fn purge_before(&self, sequence: u64) -> WalResult<()> {
        let writer = self.writer.lock().map_err(|_| WalError::InvalidArgument)?;
        let mut segments = list_segments(&self.fs, &self.dir)?;
        segments.sort_unstable();

        for window in segments.windows(2) {
            #[expect(clippy::indexing_slicing, reason = "windows(2) always yields length-2 slices")]
            let (first, next_first) = (window[0], window[1]);
            if first == writer.segment_first_sequence {
                break;
            }
            if next_first > sequence {
                break;
            }
            self.fs.remove_file(&segment_path(&self.dir, first))?;
        }
        Ok(())
    }

    #[must_use]
    pub fn next_sequence(&self) -> u64 {
        self.next_sequence.load(Ordering::Acquire).unwrap_or_default()
    }

    /// Size in bytes of the currently active segment. Not the total size
    /// of the WAL (older, already-rotated segments aren't counted); good
    /// enough for a stats surface that only needs a sense of recent write
    /// volume, not an exact on-disk footprint.
    #[must_use]
    pub fn active_segment_bytes(&self) -> u64 {
        self.writer.lock().map(|writer| writer.segment_size).unwrap_or(0)
    }
}
