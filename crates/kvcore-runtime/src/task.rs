use std::cell::Cell;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Identifies one spawned task within a single [`crate::Runtime`] instance.
/// Not meaningful across runtimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub(crate) u64);

#[derive(Debug, Default)]
pub(crate) struct TaskIds(AtomicU64);

impl TaskIds {
    pub(crate) fn next(&self) -> TaskId {
        TaskId(self.0.fetch_add(1, Ordering::Relaxed))
    }
}

/// Every task carries one of these; cancelling a task flips it, and every
/// suspension point (sleep, I/O readiness, `yield_now`) checks it before
/// parking, per spec §4.7.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

thread_local! {
    /// The cancellation token of whichever task is presently being polled
    /// by the owning runtime. Suspension futures read this instead of
    /// threading a token through every combinator; it is only ever set for
    /// the duration of one `Future::poll` call on the runtime's own thread.
    static CURRENT_CANCEL: Cell<Option<CancelToken>> = const { Cell::new(None) };
}

/// Sets the thread-local "currently polling" token for the duration of `f`.
pub(crate) fn with_current_cancel<R>(token: &CancelToken, f: impl FnOnce() -> R) -> R {
    let previous = CURRENT_CANCEL.with(|cell| cell.replace(Some(token.clone())));
    let result = f();
    CURRENT_CANCEL.with(|cell| cell.set(previous));
    result
}

/// Whether the task currently being polled has been cancelled. Every
/// suspension point in this crate calls this first; a task's own future may
/// call it too if it wants to bail out early between suspension points.
#[must_use]
pub fn is_current_task_cancelled() -> bool {
    CURRENT_CANCEL.with(|cell| {
        let token = cell.take();
        let cancelled = token.as_ref().is_some_and(CancelToken::is_cancelled);
        cell.set(token);
        cancelled
    })
}

/// A handle to a spawned task: its cancellation token, and a slot its result
/// lands in once the task's future resolves.
///
/// This is intentionally not a `Future` itself — `kvcore-runtime` is a
/// cooperative, non-`Send` single-threaded executor, not a general-purpose
/// joinable-task system. Callers poll [`TaskHandle::take_result`] from
/// their own driving loop (typically right after `Runtime::turn`).
#[derive(Debug)]
pub struct TaskHandle<T> {
    pub(crate) id:       TaskId,
    pub(crate) cancel:   CancelToken,
    pub(crate) finished: Rc<Cell<bool>>,
    pub(crate) result:   Rc<Cell<Option<T>>>,
}

impl<T> TaskHandle<T> {
    #[must_use]
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Requests cancellation. Takes effect at the task's next suspension
    /// point, not immediately (spec §4.7: "in-flight syscalls are not
    /// interrupted mid-call").
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished.get()
    }

    /// Takes the task's result, if it has finished. Returns `None` both
    /// before completion and after a previous call has already taken it.
    pub fn take_result(&self) -> Option<T> {
        self.result.take()
    }
}
