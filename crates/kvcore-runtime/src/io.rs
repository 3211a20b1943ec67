use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::error::{RuntimeError, RuntimeResult};
use crate::runtime::Handle;
use crate::task::is_current_task_cancelled;

/// A registered interest in one [`mio`] source's readiness, obtained from
/// [`Handle::register`]. Sources are registered lazily by the caller on
/// first use and must be explicitly deregistered (spec §4.7: "File
/// descriptors are registered lazily on first use and unregistered on
/// close").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IoToken(pub(crate) mio::Token);

/// A future that resolves once the runtime's poller reports the registered
/// source behind `token` as ready, or with [`RuntimeError::Cancelled`] if
/// the owning task is cancelled first.
#[derive(Debug)]
pub struct IoReady {
    handle: Handle,
    token:  IoToken,
}

impl IoReady {
    pub(crate) fn new(handle: Handle, token: IoToken) -> Self {
        Self { handle, token }
    }
}

impl Future for IoReady {
    type Output = RuntimeResult<()>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if is_current_task_cancelled() {
            return Poll::Ready(Err(RuntimeError::Cancelled));
        }
        if self.handle.take_io_ready(self.token) {
            return Poll::Ready(Ok(()));
        }
        self.handle.register_io_waker(self.token, cx.waker().clone());
        Poll::Pending
    }
}
