use std::path::PathBuf;

use kvcore_arena::AllocatorMode;
use kvcore_skiplist::DEFAULT_MAX_LEVEL;
use kvcore_wal::{SyncPolicy, DEFAULT_SEGMENT_BYTES};
use serde::Deserialize;

/// Mirrors [`SyncPolicy`] with a `serde::Deserialize` impl of its own,
/// since `kvcore-wal` deliberately stays free of a `serde` dependency (it
/// takes a plain [`kvcore_wal::WalConfig`], not parsed config).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPolicyConfig {
    NoSync,
    SyncOnCommit,
    #[default]
    SyncEveryWrite,
}

impl From<SyncPolicyConfig> for SyncPolicy {
    fn from(config: SyncPolicyConfig) -> Self {
        match config {
            SyncPolicyConfig::NoSync => Self::NoSync,
            SyncPolicyConfig::SyncOnCommit => Self::SyncOnCommit,
            SyncPolicyConfig::SyncEveryWrite => Self::SyncEveryWrite,
        }
    }
}

/// Which allocator backend `allocator_mode` selects (spec §6.3). A separate
/// enum from [`AllocatorMode`] because the wire/config form of `Pool` takes
/// its reservation size from the sibling `pool_initial_bytes` field instead
/// of carrying it inline, matching the flat shape of the configuration
/// table in the spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocatorModeConfig {
    #[default]
    System,
    Pool,
    Gc,
}

/// Engine-level configuration (spec §6.3). `kvcored` loads a superset of
/// this (logging, listen address) from a TOML file and forwards this part
/// to [`crate::Engine::open`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub data_dir: PathBuf,
    pub segment_bytes: u64,
    pub sync_policy: SyncPolicyConfig,
    pub max_level: usize,
    pub allocator_mode: AllocatorModeConfig,
    pub pool_initial_bytes: usize,
    pub runtime_threads: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            segment_bytes: DEFAULT_SEGMENT_BYTES,
            sync_policy: SyncPolicyConfig::default(),
            max_level: DEFAULT_MAX_LEVEL,
            allocator_mode: AllocatorModeConfig::default(),
            pool_initial_bytes: 1024 * 1024,
            runtime_threads: 1,
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn allocator_mode(&self) -> AllocatorMode {
        match self.allocator_mode {
            AllocatorModeConfig::System => AllocatorMode::System,
            AllocatorModeConfig::Pool => AllocatorMode::Pool { initial_bytes: self.pool_initial_bytes },
            AllocatorModeConfig::Gc => AllocatorMode::Gc,
        }
    }

    #[must_use]
    pub fn wal_sync_policy(&self) -> SyncPolicy {
        self.sync_policy.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_a_safe_sync_policy_and_system_allocator() {
        let config = EngineConfig::default();
        assert_eq!(config.sync_policy, SyncPolicyConfig::SyncEveryWrite);
        assert_eq!(config.allocator_mode, AllocatorModeConfig::System);
        assert!(matches!(config.allocator_mode(), AllocatorMode::System));
    }

    #[test]
    fn pool_allocator_mode_carries_its_initial_reservation_size() {
        let config =
            EngineConfig { allocator_mode: AllocatorModeConfig::Pool, pool_initial_bytes: 4096, ..EngineConfig::default() };
        assert!(matches!(config.allocator_mode(), AllocatorMode::Pool { initial_bytes: 4096 }));
    }

    #[test]
    fn sync_policy_config_maps_onto_the_wal_crates_own_enum() {
        let no_sync: SyncPolicy = SyncPolicyConfig::NoSync.into();
        let on_commit: SyncPolicy = SyncPolicyConfig::SyncOnCommit.into();
        let every_write: SyncPolicy = SyncPolicyConfig::SyncEveryWrite.into();
        assert!(matches!(no_sync, SyncPolicy::NoSync));
        assert!(matches!(on_commit, SyncPolicy::SyncOnCommit));
        assert!(matches!(every_write, SyncPolicy::SyncEveryWrite));
    }
}
