use kvcore_skiplist::Skiplist;
use kvcore_wal::ReplaySink;

/// Applies replayed WAL records to a fresh skiplist on open (spec §4.4.3
/// step 3, I5): `Put` overwrites any existing key, `Delete` tolerates a
/// missing one. Kept separate from [`crate::engine::Engine`] so recovery
/// can be driven against a bare skiplist in tests without a whole engine.
pub(crate) struct SkiplistSink<'a> {
    skiplist: &'a Skiplist,
}

impl<'a> SkiplistSink<'a> {
    pub(crate) fn new(skiplist: &'a Skiplist) -> Self {
        Self { skiplist }
    }
}

impl ReplaySink for SkiplistSink<'_> {
    fn apply_put(&mut self, key: &[u8], value: &[u8]) {
        // A replayed Put always wins over whatever is already there: the
        // engine itself composes `put` as remove-then-insert (§4.5), and
        // replay must reproduce that end state regardless of how many
        // times `key` was put before within the replayed log.
        let _ = self.skiplist.remove(key);
        if self.skiplist.insert(key, value).is_err() {
            // A logically impossible race on a single-threaded replay
            // path; nothing sensible to do but leave the prior value,
            // which is the same key that just lost the race to be removed.
            tracing::warn!("replay: insert raced against itself for a key, skiplist may be stale");
        }
    }

    fn apply_delete(&mut self, key: &[u8]) {
        let _ = self.skiplist.remove(key);
    }
}
