#![expect(unsafe_code, reason = "default realloc copies between two raw allocations")]

use std::alloc::Layout;
use std::ptr::NonNull;

use crate::error::ArenaResult;

/// Mode-specific allocation strategy behind [`crate::Arena`].
///
/// Implementations track their own outstanding-allocation bookkeeping
/// only to the extent needed to implement `realloc`/`free`; the arena-wide
/// usage statistics live in `Arena` itself, not here.
pub(crate) trait ArenaBackend: Send {
    fn alloc(&mut self, layout: Layout) -> ArenaResult<NonNull<u8>>;

    /// Default implementation allocates a fresh block, copies `old_layout.size()`
    /// (or `new_layout.size()`, whichever is smaller) bytes over, and frees the
    /// original block. Backends for which this can be done in place may override it.
    fn realloc(
        &mut self,
        ptr:        NonNull<u8>,
        old_layout: Layout,
        new_layout: Layout,
    ) -> ArenaResult<NonNull<u8>> {
        let new_ptr = self.alloc(new_layout)?;
        let copy_len = old_layout.size().min(new_layout.size());
        // SAFETY: `ptr` is valid for `old_layout.size()` bytes by the caller's
        // contract, `new_ptr` was just allocated for at least `new_layout.size()`
        // bytes, and `copy_len` does not exceed either.
        unsafe {
            std::ptr::copy_nonoverlapping(ptr.as_ptr(), new_ptr.as_ptr(), copy_len);
        }
        self.free(ptr, old_layout)?;
        Ok(new_ptr)
    }

    fn free(&mut self, ptr: NonNull<u8>, layout: Layout) -> ArenaResult<()>;
}
