#![expect(unsafe_code, reason = "manual Send impl for the NonNull-holding free lists")]

use std::alloc::Layout;
use std::collections::HashMap;
use std::ptr::NonNull;

use bumpalo::Bump;

use crate::backend::ArenaBackend;
use crate::error::{ArenaError, ArenaResult};

/// A bump allocator backed by a single large reservation (a [`bumpalo::Bump`]
/// arena), with a per-size free list so that `free`d blocks can be reused by
/// a later `alloc` of the same size and alignment instead of growing the
/// underlying reservation forever.
///
/// Individual blocks are never returned to the OS until the whole arena is
/// dropped; `free` only makes a block reusable by a future same-sized
/// `alloc` in this same backend.
pub(crate) struct PoolBackend {
    bump:       Bump,
    free_lists: HashMap<(usize, usize), Vec<NonNull<u8>>>,
    alignment:  usize,
}

impl PoolBackend {
    pub(crate) fn new(initial_bytes: usize, alignment: usize) -> Self {
        Self {
            bump:       Bump::with_capacity(initial_bytes),
            free_lists: HashMap::new(),
            alignment:  alignment.max(1),
        }
    }

    fn effective_layout(&self, layout: Layout) -> ArenaResult<Layout> {
        Layout::from_size_align(layout.size(), layout.align().max(self.alignment))
            .map_err(|_| ArenaError::InvalidArgument)
    }
}

// SAFETY: `PoolBackend` is only ever accessed through `Arena`'s own mutex,
// so no two threads touch the `Bump` or free lists concurrently; the raw
// pointers in `free_lists` point into memory owned by `bump`, which is
// itself `Send`.
unsafe impl Send for PoolBackend {}

impl ArenaBackend for PoolBackend {
    fn alloc(&mut self, layout: Layout) -> ArenaResult<NonNull<u8>> {
        if layout.size() == 0 {
            return Err(ArenaError::InvalidArgument);
        }
        let layout = self.effective_layout(layout)?;
        let key = (layout.size(), layout.align());

        if let Some(reused) = self.free_lists.get_mut(&key).and_then(Vec::pop) {
            return Ok(reused);
        }

        let slice = self.bump.alloc_layout(layout);
        Ok(slice)
    }

    fn free(&mut self, ptr: NonNull<u8>, layout: Layout) -> ArenaResult<()> {
        let layout = self.effective_layout(layout)?;
        let key = (layout.size(), layout.align());
        self.free_lists.entry(key).or_default().push(ptr);
        Ok(())
    }
}
