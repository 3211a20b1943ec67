#![expect(unsafe_code, reason = "set_bytes writes raw memory of a checked live allocation")]

use std::alloc::Layout;
use std::collections::HashMap;
use std::ptr::NonNull;

use parking_lot::Mutex;
use tracing::debug;

use crate::backend::ArenaBackend;
use crate::error::{ArenaError, ArenaResult};
use crate::gc::GcBackend;
use crate::mode::AllocatorMode;
use crate::pool::PoolBackend;
use crate::stats::{ArenaStats, StatsTracker};
use crate::system::SystemBackend;

const DEFAULT_ALIGNMENT: usize = 8;

struct Inner {
    mode:    AllocatorMode,
    backend: Box<dyn ArenaBackend>,
    live:    HashMap<usize, Layout>,
    stats:   StatsTracker,
}

fn backend_for(mode: AllocatorMode, alignment: usize) -> Box<dyn ArenaBackend> {
    match mode {
        AllocatorMode::System => Box::new(SystemBackend),
        AllocatorMode::Pool { initial_bytes } => {
            Box::new(PoolBackend::new(initial_bytes, alignment))
        }
        AllocatorMode::Gc => Box::new(GcBackend::default()),
    }
}

/// A pluggable memory arena with `System`, `Pool`, and `Gc`-stub modes
/// (spec §4.2), unified behind one allocation/stats interface.
///
/// Mode switching is refused while allocations from the current mode are
/// still outstanding, per the spec's "requires the former" resolution of
/// that open question: switching with live pointers is a programmer error
/// that this type reports as [`ArenaError::ArenaBusy`] instead of
/// documenting as undefined behavior.
pub struct Arena {
    alignment: usize,
    inner:     Mutex<Inner>,
}

impl Arena {
    #[must_use]
    pub fn new(mode: AllocatorMode) -> Self {
        Self::with_alignment(mode, DEFAULT_ALIGNMENT)
    }

    #[must_use]
    pub fn with_alignment(mode: AllocatorMode, alignment: usize) -> Self {
        let alignment = alignment.next_power_of_two().max(1);
        Self {
            alignment,
            inner: Mutex::new(Inner {
                mode,
                backend: backend_for(mode, alignment),
                live:    HashMap::new(),
                stats:   StatsTracker::default(),
            }),
        }
    }

    #[must_use]
    pub fn mode(&self) -> AllocatorMode {
        self.inner.lock().mode
    }

    /// Switches to a new allocator mode. Fails with
    /// [`ArenaError::ArenaBusy`] if any allocation from the current mode
    /// is still live.
    pub fn set_mode(&self, mode: AllocatorMode) -> ArenaResult<()> {
        let mut inner = self.inner.lock();
        if !inner.stats.is_drained() || !inner.live.is_empty() {
            return Err(ArenaError::ArenaBusy);
        }
        debug!(?mode, "arena: switching allocator mode");
        inner.backend = backend_for(mode, self.alignment);
        inner.mode = mode;
        inner.stats = StatsTracker::default();
        Ok(())
    }

    fn layout_for(&self, size: usize) -> ArenaResult<Layout> {
        if size == 0 {
            return Err(ArenaError::InvalidArgument);
        }
        Layout::from_size_align(size, self.alignment).map_err(|_| ArenaError::InvalidArgument)
    }

    pub fn alloc(&self, size: usize) -> ArenaResult<NonNull<u8>> {
        let layout = self.layout_for(size)?;
        let mut inner = self.inner.lock();
        let ptr = inner.backend.alloc(layout)?;
        inner.live.insert(ptr.as_ptr() as usize, layout);
        inner.stats.record_alloc(size);
        Ok(ptr)
    }

    pub fn realloc(&self, ptr: NonNull<u8>, new_size: usize) -> ArenaResult<NonNull<u8>> {
        if new_size == 0 {
            return Err(ArenaError::InvalidArgument);
        }
        let mut inner = self.inner.lock();
        let addr = ptr.as_ptr() as usize;
        let old_layout = inner.live.remove(&addr).ok_or(ArenaError::InvalidArgument)?;
        let new_layout = Layout::from_size_align(new_size, self.alignment)
            .map_err(|_| ArenaError::InvalidArgument)?;

        let new_ptr = match inner.backend.realloc(ptr, old_layout, new_layout) {
            Ok(new_ptr) => new_ptr,
            Err(err) => {
                // Put the bookkeeping back; the old block is still valid
                // and still owned by the caller since `realloc` failed.
                inner.live.insert(addr, old_layout);
                return Err(err);
            }
        };

        inner.live.insert(new_ptr.as_ptr() as usize, new_layout);
        inner.stats.record_free(old_layout.size());
        inner.stats.record_alloc(new_size);
        Ok(new_ptr)
    }

    pub fn free(&self, ptr: NonNull<u8>) -> ArenaResult<()> {
        let mut inner = self.inner.lock();
        let addr = ptr.as_ptr() as usize;
        let layout = inner.live.remove(&addr).ok_or(ArenaError::InvalidArgument)?;
        inner.backend.free(ptr, layout)?;
        inner.stats.record_free(layout.size());
        Ok(())
    }

    /// Fills `size` bytes starting at `ptr` with `value`, equivalent to C's
    /// `memset`. Fails with [`ArenaError::InvalidArgument`] if `ptr` is not
    /// a live allocation of at least `size` bytes from this arena.
    pub fn set_bytes(&self, ptr: NonNull<u8>, value: u8, size: usize) -> ArenaResult<()> {
        let inner = self.inner.lock();
        let addr = ptr.as_ptr() as usize;
        let layout = inner.live.get(&addr).ok_or(ArenaError::InvalidArgument)?;
        if size > layout.size() {
            return Err(ArenaError::InvalidArgument);
        }
        // SAFETY: `ptr` is a live allocation of at least `size` bytes,
        // checked above, and is exclusively owned by the caller (the
        // arena never hands out aliases to live pointers).
        unsafe {
            std::ptr::write_bytes(ptr.as_ptr(), value, size);
        }
        Ok(())
    }

    #[must_use]
    pub fn stats(&self) -> ArenaStats {
        self.inner.lock().stats.snapshot()
    }
}

impl std::fmt::Debug for Arena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("Arena")
            .field("mode", &inner.mode)
            .field("alignment", &self.alignment)
            .field("stats", &inner.stats.snapshot())
            .finish()
    }
}
