use std::fmt::{self, Display, Formatter};

/// Snapshot of engine activity: key count and WAL position alongside
/// per-operation counters and cache-style hit/miss totals. See
/// `kvcore-arena::ArenaStats` for the allocator-side numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineStats {
    pub key_count: u64,
    pub wal_bytes: u64,
    pub sequence: u64,
    pub puts: u64,
    pub gets: u64,
    pub deletes: u64,
    pub hits: u64,
    pub misses: u64,
    pub degraded: bool,
}

impl Display for EngineStats {
    /// Renders as `key=value` lines, one per field (spec §6.2 `Stats`
    /// response payload).
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "key_count={}", self.key_count)?;
        writeln!(f, "wal_bytes={}", self.wal_bytes)?;
        writeln!(f, "sequence={}", self.sequence)?;
        writeln!(f, "puts={}", self.puts)?;
        writeln!(f, "gets={}", self.gets)?;
        writeln!(f, "deletes={}", self.deletes)?;
        writeln!(f, "hits={}", self.hits)?;
        writeln!(f, "misses={}", self.misses)?;
        write!(f, "degraded={}", self.degraded)
    }
}
