//! Single-threaded cooperative async runtime (spec §4.7, §5): one FIFO
//! ready queue, one timer min-heap, and one [`mio`] poller per [`Runtime`]
//! instance. A process hosting several runtimes pins each to its own
//! thread; the skiplist and engine below this layer are the ones doing the
//! actual cross-thread synchronization (`kvcore-sync`, `kvcore-skiplist`).
//!
//! Suspension happens only at socket/file readiness
//! ([`Handle::readiness`]), timer expiry ([`Handle::sleep`]), and explicit
//! [`Handle::yield_now`]. Every task carries a cancellation token; cancelling
//! one takes effect at its next suspension point, never mid-syscall.

mod error;
mod io;
mod runtime;
mod task;
mod timer;
mod yield_now;

pub use self::error::{RuntimeError, RuntimeResult};
pub use self::io::{IoReady, IoToken};
pub use self::runtime::{Handle, Runtime};
pub use self::task::{is_current_task_cancelled, CancelToken, TaskHandle, TaskId};
pub use self::timer::Sleep;
pub use self::yield_now::{yield_now, YieldNow};

pub use mio::Interest;
