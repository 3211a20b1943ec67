use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::error::{RuntimeError, RuntimeResult};
use crate::task::is_current_task_cancelled;

/// Hands control back to the runtime once, then resumes. The yielding task
/// is re-queued at the tail of the ready queue (spec §4.7), not given any
/// priority over tasks that became ready while it was running.
#[derive(Debug)]
pub struct YieldNow {
    yielded: bool,
}

impl Future for YieldNow {
    type Output = RuntimeResult<()>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if is_current_task_cancelled() {
            return Poll::Ready(Err(RuntimeError::Cancelled));
        }
        if self.yielded {
            return Poll::Ready(Ok(()));
        }
        self.yielded = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}

#[must_use]
pub fn yield_now() -> YieldNow {
    YieldNow { yielded: false }
}
