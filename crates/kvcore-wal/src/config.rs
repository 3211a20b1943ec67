/// When an append forces an `fsync` before the append mutex is released
/// (§4.4.2 step 5, §6.3 `sync_policy`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncPolicy {
    /// Never fsync from the WAL itself. Benchmarks only; durable operation
    /// requires one of the other two policies.
    NoSync,
    /// Fsync only when a `Commit` record is appended.
    SyncOnCommit,
    /// Fsync after every record. The spec's required default.
    #[default]
    SyncEveryWrite,
}

/// Default rotation threshold: 64 MiB (§6.3).
pub const DEFAULT_SEGMENT_BYTES: u64 = 64 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalConfig {
    pub segment_bytes: u64,
    pub sync_policy: SyncPolicy,
}

impl Default for WalConfig {
    fn default() -> Self {
        Self { segment_bytes: DEFAULT_SEGMENT_BYTES, sync_policy: SyncPolicy::default() }
    }
}
