use std::sync::atomic::{AtomicBool, Ordering};

use kvcore_arena::{Arena, ArenaStats};
use kvcore_skiplist::{Skiplist, SkiplistError};
use kvcore_sync::Atomic64;
use kvcore_vfs::Filesystem;
use kvcore_wal::{RecordKind, Wal, WalConfig};
use tracing::{info, instrument, warn};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::recovery::SkiplistSink;
use crate::stats::EngineStats;
use crate::txn::Txn;

const LOCK_FILE_NAME: &str = "LOCK";

/// Owns one skiplist, one WAL, one allocator, and the data-directory lock
/// for their shared lifetime (spec §3 "Engine"). Thread-safe: every method
/// takes `&self`, matching the skiplist and WAL's own internal
/// synchronization (spec §5).
pub struct Engine<F: Filesystem> {
    skiplist: Skiplist,
    wal: Wal<F>,
    arena: Arena,
    _lock: F::Lockfile,
    degraded: AtomicBool,
    closed: AtomicBool,
    puts: Atomic64,
    gets: Atomic64,
    deletes: Atomic64,
    hits: Atomic64,
    misses: Atomic64,
}

impl<F: Filesystem + Clone> Engine<F> {
    /// Opens (creating if needed) the store rooted at `config.data_dir`,
    /// replaying its WAL into a fresh skiplist before returning (spec §4.5
    /// `open`, §4.4.3 `replay`).
    #[instrument(skip(fs, config), fields(data_dir = %config.data_dir.display()))]
    pub fn open(fs: F, config: EngineConfig) -> EngineResult<Self> {
        fs.create_dir_all(&config.data_dir)?;
        let lock = fs.lock_directory(&config.data_dir.join(LOCK_FILE_NAME))?;

        let skiplist = Skiplist::with_max_level(config.max_level.max(1));
        let wal_config = WalConfig { segment_bytes: config.segment_bytes, sync_policy: config.wal_sync_policy() };
        let wal = {
            let mut sink = SkiplistSink::new(&skiplist);
            Wal::open(fs.clone(), &config.data_dir, wal_config, &mut sink)?
        };
        let arena = Arena::new(config.allocator_mode());

        info!(key_count = skiplist.len(), sequence = wal.next_sequence(), "engine opened");

        Ok(Self {
            skiplist,
            wal,
            arena,
            _lock: lock,
            degraded: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            puts: Atomic64::new(0),
            gets: Atomic64::new(0),
            deletes: Atomic64::new(0),
            hits: Atomic64::new(0),
            misses: Atomic64::new(0),
        })
    }
}

impl<F: Filesystem> Engine<F> {
    fn check_open(&self) -> EngineResult<()> {
        if self.closed.load(Ordering::Acquire) { Err(EngineError::Closed) } else { Ok(()) }
    }

    fn check_degraded(&self) -> EngineResult<()> {
        if self.degraded.load(Ordering::Acquire) {
            Err(EngineError::IoFailed(std::io::Error::other(
                "engine is in degraded mode after a prior WAL failure; close and reopen to clear it",
            )))
        } else {
            Ok(())
        }
    }

    fn wal_append(&self, kind: RecordKind, key: &[u8], value: &[u8]) -> EngineResult<u64> {
        self.wal.append(kind, key, value).map_err(|err| {
            self.degraded.store(true, Ordering::Release);
            warn!(error = %err, "wal append failed, engine entering degraded mode");
            EngineError::from(err)
        })
    }

    fn remove_ignoring_absence(&self, key: &[u8]) -> EngineResult<()> {
        match self.skiplist.remove(key) {
            Ok(()) | Err(SkiplistError::NotFound | SkiplistError::Busy) => Ok(()),
            Err(other) => Err(other.into()),
        }
    }

    /// Stops accepting mutations (spec §4.5 `close`). Idempotent: a second
    /// call is a no-op success.
    ///
    /// Does not purge any WAL segment: the skiplist is purely in-memory
    /// and the WAL is the only durable copy of every record in it, so
    /// there is no sequence number below which WAL data is safe to
    /// discard without a separate persisted checkpoint (which this engine
    /// does not produce). `Wal::purge_before` exists for a caller that
    /// does maintain such a watermark; `close` is not that caller.
    pub fn close(&self) -> EngineResult<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        info!("engine closed");
        Ok(())
    }

    /// Direct skiplist lookup; never touches the WAL (spec §4.5 `get`).
    pub fn get(&self, key: &[u8]) -> EngineResult<Option<Box<[u8]>>> {
        self.check_open()?;
        if key.is_empty() {
            return Err(EngineError::InvalidArgument);
        }
        self.gets.fetch_add(1, Ordering::Relaxed)?;
        match self.skiplist.get(key) {
            Ok(value) => {
                self.hits.fetch_add(1, Ordering::Relaxed)?;
                Ok(Some(value))
            }
            Err(SkiplistError::NotFound) => {
                self.misses.fetch_add(1, Ordering::Relaxed)?;
                Ok(None)
            }
            Err(other) => Err(other.into()),
        }
    }

    /// Appends a `Put` WAL record, then composes the insert as
    /// remove-then-insert so an overwrite of an existing key always
    /// succeeds (spec §4.5 `put`). Retries once if the insert loses a race
    /// to a concurrent writer of the same key; a second loss is fatal.
    pub fn put(&self, key: &[u8], value: &[u8]) -> EngineResult<()> {
        self.check_open()?;
        if key.is_empty() {
            return Err(EngineError::InvalidArgument);
        }
        self.check_degraded()?;
        self.wal_append(RecordKind::Put, key, value)?;

        self.remove_ignoring_absence(key)?;
        match self.skiplist.insert(key, value) {
            Ok(()) => {}
            Err(SkiplistError::AlreadyExists) => {
                self.remove_ignoring_absence(key)?;
                match self.skiplist.insert(key, value) {
                    Ok(()) => {}
                    Err(SkiplistError::AlreadyExists) => {
                        return Err(EngineError::Internal(
                            "put retry still raced with a concurrent insert of the same key".to_owned(),
                        ));
                    }
                    Err(other) => return Err(other.into()),
                }
            }
            Err(other) => return Err(other.into()),
        }

        self.puts.fetch_add(1, Ordering::Relaxed)?;
        Ok(())
    }

    /// Appends a `Delete` WAL record, then removes the key from the
    /// skiplist. A missing key is success (delete-of-absent is idempotent,
    /// spec R1); a lost CAS race against another deleter is retried once.
    pub fn delete(&self, key: &[u8]) -> EngineResult<()> {
        self.check_open()?;
        if key.is_empty() {
            return Err(EngineError::InvalidArgument);
        }
        self.check_degraded()?;
        self.wal_append(RecordKind::Delete, key, &[])?;

        match self.skiplist.remove(key) {
            Ok(()) | Err(SkiplistError::NotFound) => {}
            Err(SkiplistError::Busy) => match self.skiplist.remove(key) {
                Ok(()) | Err(SkiplistError::NotFound) => {}
                Err(SkiplistError::Busy) => return Err(EngineError::Busy),
                Err(other) => return Err(other.into()),
            },
            Err(other) => return Err(other.into()),
        }

        self.deletes.fetch_add(1, Ordering::Relaxed)?;
        Ok(())
    }

    /// Begins a single-key transaction buffered in memory until `commit`
    /// (spec §4.5). No isolation above read-committed is promised, and no
    /// multi-key atomicity: a crash between two buffered `put`s may
    /// persist one and not the other.
    #[must_use]
    pub fn begin(&self) -> Txn<'_, F> {
        Txn::new(self)
    }

    pub(crate) fn commit_marker(&self) -> EngineResult<()> {
        self.check_open()?;
        self.check_degraded()?;
        self.wal_append(RecordKind::Commit, &[], &[])?;
        Ok(())
    }

    /// Snapshot of key count, sequence number, operation counters, and
    /// degraded status.
    pub fn stats(&self) -> EngineResult<EngineStats> {
        Ok(EngineStats {
            #[expect(clippy::cast_possible_truncation, reason = "key counts fit comfortably in a u64")]
            key_count: self.skiplist.len() as u64,
            wal_bytes: self.wal.active_segment_bytes(),
            sequence: self.wal.next_sequence(),
            puts: self.puts.load(Ordering::Relaxed)?,
            gets: self.gets.load(Ordering::Relaxed)?,
            deletes: self.deletes.load(Ordering::Relaxed)?,
            hits: self.hits.load(Ordering::Relaxed)?,
            misses: self.misses.load(Ordering::Relaxed)?,
            degraded: self.degraded.load(Ordering::Acquire),
        })
    }

    /// Snapshot of the allocator's own usage counters (spec §4.2 `stats`).
    pub fn arena_stats(&self) -> ArenaStats {
        self.arena.stats()
    }

    pub(crate) fn skiplist(&self) -> &Skiplist {
        &self.skiplist
    }
}
