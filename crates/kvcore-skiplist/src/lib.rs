//! Concurrent ordered byte-key skiplist, the centerpiece of the storage
//! engine's in-memory index (spec §3, §4.3). One `RwLock` per level gates
//! all reads and writes of that level's forward pointers across the whole
//! list; readers release a level's lock the instant they descend, so
//! traversal never blocks behind another reader, only behind the rare
//! writer splicing that level.

mod comparator;
mod error;
mod level_height;
mod node;
mod skiplist;

pub use self::comparator::{Comparator, DefaultComparator};
pub use self::error::{SkiplistError, SkiplistResult};
pub use self::level_height::DEFAULT_MAX_LEVEL;
pub use self::skiplist::Skiplist;
