/// Selects which backend an [`crate::Arena`] allocates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AllocatorMode {
    /// Pass-through to the platform allocator.
    #[default]
    System,
    /// Bump allocator with an initial reservation, in bytes, and a
    /// per-size free list.
    Pool { initial_bytes: usize },
    /// Stub that defers to the platform allocator while recording roots
    /// for a future mark-sweep collector.
    Gc,
}
