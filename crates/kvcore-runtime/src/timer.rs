use std::cmp::Ordering;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll, Waker};
use std::time::{Duration, Instant};

use crate::error::{RuntimeError, RuntimeResult};
use crate::runtime::Handle;
use crate::task::is_current_task_cancelled;

/// One pending timer registration: fires in non-decreasing deadline order,
/// ties broken by insertion order (`seq`), per spec §4.7.
#[derive(Debug)]
pub(crate) struct TimerEntry {
    pub(crate) deadline: Instant,
    pub(crate) seq:      u64,
    pub(crate) waker:    Waker,
}

impl PartialEq for TimerEntry {
    fn eq(&self, other: &Self) -> bool {
        (self.deadline, self.seq) == (other.deadline, other.seq)
    }
}

impl Eq for TimerEntry {}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.deadline, self.seq).cmp(&(other.deadline, other.seq))
    }
}

/// A future that resolves once `Instant::now() >= deadline`, or with
/// [`RuntimeError::Cancelled`] if the owning task is cancelled first.
#[derive(Debug)]
pub struct Sleep {
    handle:     Handle,
    deadline:   Instant,
    registered: bool,
}

impl Sleep {
    pub(crate) fn new(handle: Handle, deadline: Instant) -> Self {
        Self { handle, deadline, registered: false }
    }
}

impl Future for Sleep {
    type Output = RuntimeResult<()>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if is_current_task_cancelled() {
            return Poll::Ready(Err(RuntimeError::Cancelled));
        }
        if Instant::now() >= self.deadline {
            return Poll::Ready(Ok(()));
        }
        if !self.registered {
            self.handle.register_timer(self.deadline, cx.waker().clone());
            self.registered = true;
        }
        Poll::Pending
    }
}

/// How long to sleep before the next call to a timed-wait style future
/// resolves, expressed relative to now. A thin convenience over
/// [`Handle::sleep`] for call sites that only have a [`Duration`].
#[must_use]
pub fn deadline_from(duration: Duration) -> Instant {
    Instant::now() + duration
}
