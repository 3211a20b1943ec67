#![expect(unsafe_code, reason = "reads/writes of Node's next-pointer cells under the level locks")]

use std::fmt::{self, Debug, Formatter};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use kvcore_sync::RwLock;
use oorandom::Rand32;

use crate::comparator::{Comparator, DefaultComparator};
use crate::error::{SkiplistError, SkiplistResult};
use crate::level_height::{random_level, DEFAULT_MAX_LEVEL};
use crate::node::{Link, Node};

/// The predecessor chain produced by [`Skiplist::find`]: one entry per
/// level, from `0` to `max_level - 1`.
type Predecessors = Vec<Arc<Node>>;

/// Concurrent ordered index of byte-key to byte-value, per the spec's
/// per-level lock discipline (§4.3): each level has its own `RwLock`,
/// readers hold only the level they're scanning and release it on descent,
/// and writers take locks in ascending level order.
pub struct Skiplist<C: Comparator = DefaultComparator> {
    cmp: C,
    max_level: usize,
    head: Arc<Node>,
    level_locks: Vec<RwLock<()>>,
    size: AtomicUsize,
    rng: kvcore_sync::Mutex<Rand32>,
}

impl Skiplist<DefaultComparator> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_comparator(DefaultComparator)
    }

    /// Like [`Self::new`] but with an explicit `max_level` (spec §6.3),
    /// keeping the same fixed RNG seed `new()` uses.
    #[must_use]
    pub fn with_max_level(max_level: usize) -> Self {
        Self::with_comparator_seeded(DefaultComparator, max_level, 0x_dead_beef)
    }
}

impl Default for Skiplist<DefaultComparator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Comparator> Skiplist<C> {
    #[must_use]
    pub fn with_comparator(cmp: C) -> Self {
        Self::with_comparator_seeded(cmp, DEFAULT_MAX_LEVEL, 0x_dead_beef)
    }

    /// Builds a skiplist with an explicit `max_level` and RNG seed, so tests
    /// can get a deterministic `random_level()` sequence.
    #[must_use]
    pub fn with_comparator_seeded(cmp: C, max_level: usize, seed: u64) -> Self {
        let max_level = max_level.max(1);
        Self {
            cmp,
            max_level,
            head: Arc::new(Node::head(max_level)),
            level_locks: (0..max_level).map(|_| RwLock::new(())).collect(),
            size: AtomicUsize::new(0),
            rng: kvcore_sync::Mutex::new(Rand32::new(seed)),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.size.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn max_level(&self) -> usize {
        self.max_level
    }

    fn random_level(&self) -> SkiplistResult<usize> {
        let mut rng = self.rng.lock()?;
        Ok(random_level(&mut *rng, self.max_level))
    }

    /// `find(key) -> (predecessors[0..max_level], candidate)`, per spec
    /// §4.3.2: descend from the top level, advancing at each level while the
    /// successor is non-null and strictly less than `key`. Deleted
    /// successors are traversed through, not stopped at: they may still
    /// sit on the path until a writer physically unlinks them, and a
    /// reader must walk past a tombstone to reach a live key beyond it
    /// (spec §4.3.2, "must still traverse through them"). Membership is
    /// decided only at the returned candidate, never during descent.
    fn find(&self, key: &[u8]) -> SkiplistResult<(Predecessors, Link)> {
        let mut predecessors = vec![Arc::clone(&self.head); self.max_level];
        let mut current = Arc::clone(&self.head);
        let mut candidate = None;

        for level in (0..self.max_level).rev() {
            let guard = self.level_locks[level].read()?;
            loop {
                // SAFETY: holding `level_locks[level]` for read.
                let next = unsafe { current.next_at(level) };
                match next {
                    Some(succ) if self.cmp.cmp(succ.key(), key).is_lt() => {
                        current = succ;
                    }
                    _ => break,
                }
            }
            predecessors[level] = Arc::clone(&current);
            if level == 0 {
                // SAFETY: still holding `level_locks[0]` for read.
                candidate = unsafe { current.next_at(0) };
            }
            drop(guard);
        }

        Ok((predecessors, candidate))
    }

    /// Advances `pred` forward at `level`, skipping nodes (active or
    /// tombstoned alike) whose key is strictly less than `key`, same
    /// traverse-through-tombstones rule as `find` (spec §4.3.2). Used by
    /// `insert`/`remove` to re-validate the `find()`-time predecessor hint
    /// against concurrent splices made between `find()` and the moment the
    /// level's write lock is acquired.
    ///
    /// # Safety
    /// The caller must hold `level_locks[level]` (write) for the duration
    /// of the walk.
    unsafe fn advance_predecessor(&self, mut pred: Arc<Node>, level: usize, key: &[u8]) -> Arc<Node> {
        loop {
            // SAFETY: forwarded from the caller's contract.
            let next = unsafe { pred.next_at(level) };
            match next {
                Some(succ) if self.cmp.cmp(succ.key(), key).is_lt() => {
                    pred = succ;
                }
                _ => return pred,
            }
        }
    }

    /// Copies the value out for `key`, or `NotFound` if absent or tombstoned.
    pub fn get(&self, key: &[u8]) -> SkiplistResult<Box<[u8]>> {
        let (_, candidate) = self.find(key)?;
        match candidate {
            Some(node) if node.is_active() && self.cmp.cmp(node.key(), key).is_eq() => {
                Ok(node.value().into())
            }
            _ => Err(SkiplistError::NotFound),
        }
    }

    #[must_use]
    pub fn contains(&self, key: &[u8]) -> bool {
        self.get(key).is_ok()
    }

    /// A point-in-time, key-ordered snapshot of every `Active` entry.
    /// Walks level 0 taking the read lock one hop at a time, so it never
    /// blocks a writer for the whole traversal, only for each single step
    /// (spec §4.3: readers release a level's lock the instant they
    /// descend/advance). Concurrent inserts/removes during the walk are not
    /// reflected consistently; this is a snapshot, not a cursor.
    pub fn entries(&self) -> SkiplistResult<Vec<(Box<[u8]>, Box<[u8]>)>> {
        let mut out = Vec::new();
        let mut current = Arc::clone(&self.head);
        loop {
            let guard = self.level_locks[0].read()?;
            // SAFETY: holding `level_locks[0]` for read.
            let next = unsafe { current.next_at(0) };
            drop(guard);
            let Some(node) = next else { break };
            if node.is_active() {
                out.push((node.key().into(), node.value().into()));
            }
            current = node;
        }
        Ok(out)
    }

    /// Inserts `key` with `value`. Fails with `AlreadyExists` if an `Active`
    /// node with the same key is present, including one spliced in by a
    /// concurrent writer after `find()` ran but before level 0's write lock
    /// was acquired (the engine's `put` retries once on that race, per
    /// spec §4.5).
    pub fn insert(&self, key: &[u8], value: &[u8]) -> SkiplistResult<()> {
        if key.is_empty() {
            return Err(SkiplistError::InvalidArgument);
        }
        let (predecessors, candidate) = self.find(key)?;
        if let Some(node) = &candidate {
            if node.is_active() && self.cmp.cmp(node.key(), key).is_eq() {
                return Err(SkiplistError::AlreadyExists);
            }
        }

        let height = self.random_level()?;
        let node = Arc::new(Node::new(key.into(), value.into(), height));

        // Ordering of level locks is strictly ascending (spec §4.3.3), so
        // the level 0 duplicate re-check below runs before any level is
        // mutated and can still bail out cleanly.
        for level in 0..height {
            let guard = self.level_locks[level].write()?;
            // SAFETY: holding `level_locks[level]` for write.
            let pred = unsafe { self.advance_predecessor(Arc::clone(&predecessors[level]), level, key) };
            // SAFETY: holding `level_locks[level]` for write.
            let next = unsafe { pred.next_at(level) };

            if level == 0 {
                if let Some(existing) = &next {
                    if existing.is_active() && self.cmp.cmp(existing.key(), key).is_eq() {
                        drop(guard);
                        return Err(SkiplistError::AlreadyExists);
                    }
                }
            }

            // SAFETY: holding `level_locks[level]` for write, exclusive of
            // any other reader or writer of this slot.
            unsafe {
                node.set_next_at(level, next);
                pred.set_next_at(level, Some(Arc::clone(&node)));
            }
            drop(guard);
        }

        self.size.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    /// Logically removes `key`: flips its node `Active -> Deleted` with a
    /// CAS, then splices it out of every level it participates in. Fails
    /// with `NotFound` if the key is absent or already tombstoned, or
    /// `Busy` if a concurrent deleter won the CAS first.
    pub fn remove(&self, key: &[u8]) -> SkiplistResult<()> {
        let (predecessors, candidate) = self.find(key)?;
        let node = match candidate {
            Some(node) if node.is_active() && self.cmp.cmp(node.key(), key).is_eq() => node,
            _ => return Err(SkiplistError::NotFound),
        };

        if !node.mark_deleted() {
            return Err(SkiplistError::Busy);
        }

        for level in 0..node.height() {
            let guard = self.level_locks[level].write()?;
            // SAFETY: holding `level_locks[level]` for write.
            let pred = unsafe { self.advance_predecessor(Arc::clone(&predecessors[level]), level, key) };
            // SAFETY: holding `level_locks[level]` for write.
            let next = unsafe { pred.next_at(level) };
            if matches!(&next, Some(n) if Arc::ptr_eq(n, &node)) {
                // SAFETY: holding `level_locks[level]` for write.
                let after = unsafe { node.next_at(level) };
                unsafe {
                    pred.set_next_at(level, after);
                }
            }
            drop(guard);
        }

        self.size.fetch_sub(1, Ordering::AcqRel);
        Ok(())
    }
}

impl<C: Comparator> Debug for Skiplist<C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Skiplist")
            .field("max_level", &self.max_level)
            .field("len", &self.len())
            .finish()
    }
}
