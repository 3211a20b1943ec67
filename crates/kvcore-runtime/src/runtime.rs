use std::cell::{Cell, RefCell};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};
use std::fmt::{self, Debug, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll, Wake, Waker};
use std::time::{Duration, Instant};

use mio::event::Source;
use mio::{Events, Interest, Poll as MioPoll, Token};
use parking_lot::Mutex;
use tracing::trace;

use crate::error::{RuntimeError, RuntimeResult};
use crate::io::{IoReady, IoToken};
use crate::task::{with_current_cancel, CancelToken, TaskHandle, TaskId, TaskIds};
use crate::timer::{Sleep, TimerEntry};
use crate::yield_now::{yield_now, YieldNow};

const DEFAULT_EVENT_CAPACITY: usize = 1024;

type BoxFuture = Pin<Box<dyn Future<Output = ()>>>;

struct TaskSlot {
    future: Option<BoxFuture>,
    cancel: CancelToken,
}

struct Shared {
    ready:          VecDeque<TaskId>,
    queued:         HashSet<TaskId>,
    wake_queue:     Arc<Mutex<VecDeque<TaskId>>>,
    tasks:          HashMap<TaskId, TaskSlot>,
    timers:         BinaryHeap<Reverse<TimerEntry>>,
    next_timer_seq: u64,
    poll:           MioPoll,
    events:         Events,
    io_wakers:      HashMap<Token, Waker>,
    io_ready:       HashSet<Token>,
    next_token:     usize,
    task_ids:       TaskIds,
}

/// Wakes whichever task it was handed to, by pushing that task's id back
/// onto the runtime's wake queue. Built as `Arc<TaskWaker>` so it satisfies
/// `Wake`'s `Send + Sync` bound even though the rest of the runtime is
/// single-threaded and `!Send` (only this narrow notification path needs
/// to be thread-safe, in case a future's waker is ever cloned out to
/// another thread; nothing in this crate does that today).
struct TaskWaker {
    id:    TaskId,
    queue: Arc<Mutex<VecDeque<TaskId>>>,
}

impl Wake for TaskWaker {
    fn wake(self: Arc<Self>) {
        self.wake_by_ref();
    }

    fn wake_by_ref(self: &Arc<Self>) {
        self.queue.lock().push_back(self.id);
    }
}

/// A single-threaded cooperative task scheduler (spec §4.7): one FIFO ready
/// queue, one min-heap of timers, and one [`mio::Poll`] instance shared by
/// every task spawned onto it. There are no parallel worker threads; a
/// process that wants concurrency runs multiple `Runtime`s, each pinned to
/// its own thread (spec §5).
pub struct Runtime {
    shared: Rc<RefCell<Shared>>,
}

/// A cloneable reference to a [`Runtime`], passed into task bodies so they
/// can call [`Handle::sleep`], [`Handle::register`]/[`Handle::readiness`],
/// and [`Handle::spawn`] from inside an `async` block.
#[derive(Clone)]
pub struct Handle {
    shared: Rc<RefCell<Shared>>,
}

impl Runtime {
    pub fn new() -> RuntimeResult<Self> {
        Self::with_event_capacity(DEFAULT_EVENT_CAPACITY)
    }

    pub fn with_event_capacity(capacity: usize) -> RuntimeResult<Self> {
        let poll = MioPoll::new().map_err(RuntimeError::PollFailed)?;
        let events = Events::with_capacity(capacity);
        let shared = Shared {
            ready:          VecDeque::new(),
            queued:         HashSet::new(),
            wake_queue:     Arc::new(Mutex::new(VecDeque::new())),
            tasks:          HashMap::new(),
            timers:         BinaryHeap::new(),
            next_timer_seq: 0,
            poll,
            events,
            io_wakers:      HashMap::new(),
            io_ready:       HashSet::new(),
            next_token:     0,
            task_ids:       TaskIds::default(),
        };
        Ok(Self { shared: Rc::new(RefCell::new(shared)) })
    }

    #[must_use]
    pub fn handle(&self) -> Handle {
        Handle { shared: Rc::clone(&self.shared) }
    }

    pub fn spawn<F>(&self, future: F) -> TaskHandle<F::Output>
    where
        F: Future + 'static,
        F::Output: 'static,
    {
        self.handle().spawn(future)
    }

    /// Runs `future` to completion on this runtime, driving every other
    /// spawned task's suspension points along the way, and returns its
    /// result.
    pub fn block_on<F>(&self, future: F) -> RuntimeResult<F::Output>
    where
        F: Future + 'static,
        F::Output: 'static,
    {
        let task = self.spawn(future);
        loop {
            if let Some(result) = task.take_result() {
                return Ok(result);
            }
            self.turn()?;
        }
    }

    /// Runs one scheduling step: drains wakeups, polls the I/O reactor and
    /// fires expired timers (blocking on the poller only if no task is
    /// otherwise ready to run), then polls at most one ready task.
    pub fn turn(&self) -> RuntimeResult<()> {
        self.drain_wake_queue();
        let should_block = self.shared.borrow().ready.is_empty();
        self.poll_io_and_timers(should_block)?;
        self.drain_wake_queue();
        if !self.shared.borrow().ready.is_empty() {
            self.poll_one_ready_task();
        }
        Ok(())
    }

    /// Drains the ready queue without ever blocking on the I/O poller,
    /// returning the number of tasks polled. Useful for tests that want to
    /// observe a steady state without a timer or I/O event to wake them.
    pub fn run_until_stalled(&self) -> RuntimeResult<usize> {
        self.drain_wake_queue();
        self.poll_io_and_timers(false)?;
        self.drain_wake_queue();
        let mut polled = 0_usize;
        while !self.shared.borrow().ready.is_empty() {
            self.poll_one_ready_task();
            self.drain_wake_queue();
            polled += 1;
        }
        Ok(polled)
    }

    #[must_use]
    pub fn pending_task_count(&self) -> usize {
        self.shared.borrow().tasks.len()
    }

    fn drain_wake_queue(&self) {
        let mut shared = self.shared.borrow_mut();
        let woken: Vec<TaskId> = {
            let mut queue = shared.wake_queue.lock();
            std::mem::take(&mut *queue).into_iter().collect()
        };
        for id in woken {
            if shared.tasks.contains_key(&id) && shared.queued.insert(id) {
                shared.ready.push_back(id);
            }
        }
    }

    fn poll_io_and_timers(&self, block: bool) -> RuntimeResult<()> {
        let timeout = {
            let shared = self.shared.borrow();
            if !block {
                Some(Duration::ZERO)
            } else if let Some(Reverse(entry)) = shared.timers.peek() {
                Some(entry.deadline.saturating_duration_since(Instant::now()))
            } else {
                None
            }
        };

        {
            let mut shared = self.shared.borrow_mut();
            let Shared { poll, events, .. } = &mut *shared;
            match poll.poll(events, timeout) {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::Interrupted => {}
                Err(err) => return Err(RuntimeError::PollFailed(err)),
            }
        }

        let ready_tokens: Vec<Token> = {
            let shared = self.shared.borrow();
            shared.events.iter().map(mio::event::Event::token).collect()
        };

        {
            let mut shared = self.shared.borrow_mut();
            for token in ready_tokens {
                shared.io_ready.insert(token);
                if let Some(waker) = shared.io_wakers.remove(&token) {
                    waker.wake();
                }
            }
        }

        loop {
            let now = Instant::now();
            let expired = {
                let mut shared = self.shared.borrow_mut();
                match shared.timers.peek() {
                    Some(Reverse(entry)) if entry.deadline <= now => shared.timers.pop(),
                    _ => None,
                }
            };
            let Some(Reverse(entry)) = expired else { break };
            entry.waker.wake();
        }

        Ok(())
    }

    fn poll_one_ready_task(&self) {
        let id = {
            let mut shared = self.shared.borrow_mut();
            let id = shared.ready.pop_front();
            if let Some(id) = id {
                shared.queued.remove(&id);
            }
            id
        };
        let Some(id) = id else { return };

        let taken = {
            let mut shared = self.shared.borrow_mut();
            shared
                .tasks
                .get_mut(&id)
                .and_then(|slot| slot.future.take().map(|future| (future, slot.cancel.clone())))
        };
        let Some((mut future, cancel)) = taken else { return };

        let wake_queue = Arc::clone(&self.shared.borrow().wake_queue);
        let waker = Waker::from(Arc::new(TaskWaker { id, queue: wake_queue }));
        let mut cx = Context::from_waker(&waker);

        let poll_result = with_current_cancel(&cancel, || future.as_mut().poll(&mut cx));

        let mut shared = self.shared.borrow_mut();
        match poll_result {
            Poll::Ready(()) => {
                shared.tasks.remove(&id);
            }
            Poll::Pending => {
                if let Some(slot) = shared.tasks.get_mut(&id) {
                    slot.future = Some(future);
                }
            }
        }
    }
}

impl Default for Runtime {
    /// # Panics
    /// Panics if the platform I/O poller fails to initialize; see
    /// [`Runtime::new`] for the fallible constructor.
    fn default() -> Self {
        #[expect(clippy::expect_used, reason = "Default has no fallible signature; use Runtime::new for that")]
        Self::new().expect("failed to initialize runtime poller")
    }
}

impl Debug for Runtime {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("pending_tasks", &self.pending_task_count())
            .finish_non_exhaustive()
    }
}

impl Handle {
    pub fn spawn<F>(&self, future: F) -> TaskHandle<F::Output>
    where
        F: Future + 'static,
        F::Output: 'static,
    {
        let result: Rc<Cell<Option<F::Output>>> = Rc::new(Cell::new(None));
        let finished: Rc<Cell<bool>> = Rc::new(Cell::new(false));
        let result_slot = Rc::clone(&result);
        let finished_slot = Rc::clone(&finished);
        let wrapped = async move {
            let value = future.await;
            result_slot.set(Some(value));
            finished_slot.set(true);
        };
        let cancel = CancelToken::new();

        let mut shared = self.shared.borrow_mut();
        let id = shared.task_ids.next();
        shared.tasks.insert(id, TaskSlot { future: Some(Box::pin(wrapped)), cancel: cancel.clone() });
        shared.ready.push_back(id);
        shared.queued.insert(id);
        drop(shared);

        trace!(task = id.0, "runtime: spawned task");
        TaskHandle { id, cancel, finished, result }
    }

    /// Suspends until `duration` has elapsed.
    #[must_use]
    pub fn sleep(&self, duration: Duration) -> Sleep {
        Sleep::new(self.clone(), Instant::now() + duration)
    }

    /// Hands control back to the scheduler once before resuming.
    #[must_use]
    pub fn yield_now(&self) -> YieldNow {
        yield_now()
    }

    /// Registers `source` with this runtime's poller under a freshly
    /// allocated token, watching for `interest`. The source must stay
    /// alive (and not be moved) for as long as it is registered.
    pub fn register<S: Source>(&self, source: &mut S, interest: Interest) -> RuntimeResult<IoToken> {
        let mut shared = self.shared.borrow_mut();
        let token = Token(shared.next_token);
        shared.next_token += 1;
        shared
            .poll
            .registry()
            .register(source, token, interest)
            .map_err(RuntimeError::PollFailed)?;
        Ok(IoToken(token))
    }

    /// Deregisters `source`, dropping any pending waker and readiness
    /// recorded for `token` (spec §4.7: "unregistered on close").
    pub fn deregister<S: Source>(&self, source: &mut S, token: IoToken) -> RuntimeResult<()> {
        let mut shared = self.shared.borrow_mut();
        shared.poll.registry().deregister(source).map_err(RuntimeError::PollFailed)?;
        shared.io_wakers.remove(&token.0);
        shared.io_ready.remove(&token.0);
        Ok(())
    }

    /// A future that resolves once `token`'s source is reported ready.
    #[must_use]
    pub fn readiness(&self, token: IoToken) -> IoReady {
        IoReady::new(self.clone(), token)
    }

    pub(crate) fn register_timer(&self, deadline: Instant, waker: Waker) {
        let mut shared = self.shared.borrow_mut();
        let seq = shared.next_timer_seq;
        shared.next_timer_seq += 1;
        shared.timers.push(Reverse(TimerEntry { deadline, seq, waker }));
    }

    pub(crate) fn take_io_ready(&self, token: IoToken) -> bool {
        self.shared.borrow_mut().io_ready.remove(&token.0)
    }

    pub(crate) fn register_io_waker(&self, token: IoToken, waker: Waker) {
        self.shared.borrow_mut().io_wakers.insert(token.0, waker);
    }
}

impl Debug for Handle {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle").finish_non_exhaustive()
    }
}
