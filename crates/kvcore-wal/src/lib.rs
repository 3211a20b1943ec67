//! The append-only write-ahead log every mutation goes through before it
//! reaches the skiplist: on-disk record format, segment rotation and naming,
//! and the crash-tolerant reader that drives replay on open.

mod config;
mod error;
mod record;
mod replay;
mod segment;
mod wal;

pub use self::config::{SyncPolicy, WalConfig, DEFAULT_SEGMENT_BYTES};
pub use self::error::{WalError, WalResult};
pub use self::record::{Record, RecordKind, MAGIC};
pub use self::replay::ReplaySink;
pub use self::segment::{parse_segment_name, segment_file_name, segment_path};
pub use self::wal::Wal;
