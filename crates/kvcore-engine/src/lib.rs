//! Engine facade binding the skiplist and WAL into one key-value store
//! (spec §3, §4.5): single-key transactions, the request dispatcher's wire
//! protocol (§4.6), the service-shell lifecycle (§4.8), and crash recovery
//! plus stats (recovery & stats, §2).

mod config;
mod dispatcher;
mod engine;
mod error;
mod recovery;
mod service;
mod stats;
mod txn;

pub use self::config::{AllocatorModeConfig, EngineConfig, SyncPolicyConfig};
pub use self::dispatcher::{Dispatcher, Request, Status};
pub use self::engine::Engine;
pub use self::error::{EngineError, EngineResult};
pub use self::service::{EngineService, Service, ServiceState};
pub use self::stats::EngineStats;
pub use self::txn::Txn;
