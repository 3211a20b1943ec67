#![expect(unsafe_code, reason = "manual Send impl for the NonNull-holding root set")]

use std::alloc::Layout;
use std::ptr::NonNull;

use crate::backend::ArenaBackend;
use crate::error::ArenaResult;
use crate::system::SystemBackend;

/// Stub for a future mark-sweep collector (spec open question): for now
/// this passes every request through to [`SystemBackend`] and records the
/// set of live roots, without ever actually collecting. See `DESIGN.md`
/// for why this is intentionally conservative rather than a functioning
/// collector.
#[derive(Debug, Default)]
pub(crate) struct GcBackend {
    system: SystemBackend,
    roots:  Vec<NonNull<u8>>,
}

// SAFETY: mirrors `SystemBackend`'s reasoning; `roots` is only ever
// touched through `Arena`'s mutex.
unsafe impl Send for GcBackend {}

impl GcBackend {
    pub(crate) fn live_root_count(&self) -> usize {
        self.roots.len()
    }
}

impl ArenaBackend for GcBackend {
    fn alloc(&mut self, layout: Layout) -> ArenaResult<NonNull<u8>> {
        let ptr = self.system.alloc(layout)?;
        self.roots.push(ptr);
        Ok(ptr)
    }

    fn free(&mut self, ptr: NonNull<u8>, layout: Layout) -> ArenaResult<()> {
        self.roots.retain(|&root| root != ptr);
        self.system.free(ptr, layout)
    }
}
