#![expect(unsafe_code, reason = "raw std::alloc calls backing the System arena mode")]

use std::alloc::{self, Layout};
use std::ptr::NonNull;

use crate::backend::ArenaBackend;
use crate::error::{ArenaError, ArenaResult};

/// Passes every request straight through to the platform allocator.
#[derive(Debug, Default)]
pub(crate) struct SystemBackend;

impl ArenaBackend for SystemBackend {
    fn alloc(&mut self, layout: Layout) -> ArenaResult<NonNull<u8>> {
        if layout.size() == 0 {
            return Err(ArenaError::InvalidArgument);
        }
        // SAFETY: `layout` has nonzero size, checked above.
        let raw = unsafe { alloc::alloc(layout) };
        NonNull::new(raw).ok_or(ArenaError::AllocFailed)
    }

    fn realloc(
        &mut self,
        ptr:        NonNull<u8>,
        old_layout: Layout,
        new_layout: Layout,
    ) -> ArenaResult<NonNull<u8>> {
        if new_layout.align() != old_layout.align() {
            // `std::alloc::realloc` cannot change alignment; fall back to the
            // generic alloc-copy-free path from the default trait method.
            return self.alloc(new_layout).and_then(|new_ptr| {
                let copy_len = old_layout.size().min(new_layout.size());
                // SAFETY: both blocks are valid for `copy_len` bytes.
                unsafe {
                    std::ptr::copy_nonoverlapping(ptr.as_ptr(), new_ptr.as_ptr(), copy_len);
                }
                self.free(ptr, old_layout)?;
                Ok(new_ptr)
            });
        }
        if new_layout.size() == 0 {
            return Err(ArenaError::InvalidArgument);
        }
        // SAFETY: `ptr` was allocated with `old_layout` by this allocator, and
        // `new_layout`'s alignment matches `old_layout`'s, as checked above.
        let raw = unsafe { alloc::realloc(ptr.as_ptr(), old_layout, new_layout.size()) };
        NonNull::new(raw).ok_or(ArenaError::AllocFailed)
    }

    fn free(&mut self, ptr: NonNull<u8>, layout: Layout) -> ArenaResult<()> {
        // SAFETY: caller guarantees `ptr`/`layout` match a prior `alloc` call
        // to this backend.
        unsafe { alloc::dealloc(ptr.as_ptr(), layout) };
        Ok(())
    }
}
