//! Single-consumer task queue.
//!
//! Producers on any thread push boxed closures through a [`TaskSender`];
//! the thread that owns the [`TaskQueue`] runs them with
//! [`drain_and_run`](TaskQueue::drain_and_run), handing each one mutable
//! access to that thread's state.

use std::any::Any;
use std::fmt;
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// A deferred closure that runs on the consumer thread.
pub type Task<S> = Box<dyn FnOnce(&mut S) + Send>;

/// Called after every successful submit, from the submitting thread.
///
/// Event loops that cannot park on the queue's condition variable (a GUI
/// toolkit's own loop) install a hook that schedules a "run later" callback
/// which drains the queue.
pub type WakeHook = Arc<dyn Fn() + Send + Sync>;

/// Error returned when submitting to a queue whose consumer is gone.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("task queue '{0}' is closed")]
    Closed(&'static str),
}

/// Outcome of one [`TaskQueue::drain_and_run`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Tasks that ran to completion.
    pub executed: usize,
    /// Tasks that panicked. They were logged and skipped.
    pub panicked: usize,
}

impl DrainReport {
    /// Total number of tasks taken off the queue.
    pub fn total(&self) -> usize {
        self.executed + self.panicked
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

struct Pending<S> {
    tasks: Vec<Task<S>>,
    /// Consumer is parked in `wait_for_tasks`.
    waiting: bool,
    closed: bool,
}

struct Shared<S> {
    name: &'static str,
    pending: Mutex<Pending<S>>,
    ready: Condvar,
    wake: Option<WakeHook>,
}

/// Producer handle of a [`TaskQueue`]. Cheap to clone and `Send + Sync`.
pub struct TaskSender<S> {
    shared: Arc<Shared<S>>,
}

impl<S> Clone for TaskSender<S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S> TaskSender<S> {
    /// Enqueues a task for the consumer thread.
    ///
    /// Never blocks beyond the short critical section that appends to the
    /// pending list. Wakes the consumer if it is parked and calls the wake
    /// hook, if any.
    pub fn submit(&self, task: impl FnOnce(&mut S) + Send + 'static) -> Result<(), SubmitError> {
        let parked = {
            let mut pending = self.shared.pending.lock();
            if pending.closed {
                return Err(SubmitError::Closed(self.shared.name));
            }
            pending.tasks.push(Box::new(task));
            pending.waiting
        };
        if parked {
            self.shared.ready.notify_one();
        }
        if let Some(wake) = &self.shared.wake {
            wake();
        }
        Ok(())
    }

    pub fn name(&self) -> &'static str {
        self.shared.name
    }

    /// Number of tasks waiting for the next drain.
    pub fn pending(&self) -> usize {
        self.shared.pending.lock().tasks.len()
    }

    pub fn is_closed(&self) -> bool {
        self.shared.pending.lock().closed
    }
}

impl<S> fmt::Debug for TaskSender<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskSender")
            .field("name", &self.shared.name)
            .finish()
    }
}

/// Consumer end of a task mailbox bound to one thread.
///
/// The queue is owned by the consumer thread's loop. Tasks run one at a
/// time in submission order, never concurrently. A drain swaps the whole
/// pending list into a local buffer under the lock and runs it outside the
/// lock, so a task may submit further tasks; those run on the next drain.
///
/// # Example
///
/// ```
/// use sseditor_core::executor::TaskQueue;
///
/// let mut queue = TaskQueue::<Vec<u32>>::new("render");
/// let sender = queue.sender();
///
/// std::thread::spawn(move || {
///     sender.submit(|log| log.push(1)).unwrap();
///     sender.submit(|log| log.push(2)).unwrap();
/// })
/// .join()
/// .unwrap();
///
/// let mut log = Vec::new();
/// let report = queue.drain_and_run(&mut log);
/// assert_eq!(report.executed, 2);
/// assert_eq!(log, vec![1, 2]);
/// ```
pub struct TaskQueue<S> {
    shared: Arc<Shared<S>>,
    buffer: Vec<Task<S>>,
}

impl<S> TaskQueue<S> {
    /// Creates a queue. `name` shows up in logs and errors.
    pub fn new(name: &'static str) -> Self {
        Self::build(name, None)
    }

    /// Creates a queue that calls `hook` after every submit.
    pub fn with_wake_hook(name: &'static str, hook: impl Fn() + Send + Sync + 'static) -> Self {
        Self::build(name, Some(Arc::new(hook)))
    }

    fn build(name: &'static str, wake: Option<WakeHook>) -> Self {
        Self {
            shared: Arc::new(Shared {
                name,
                pending: Mutex::new(Pending {
                    tasks: Vec::new(),
                    waiting: false,
                    closed: false,
                }),
                ready: Condvar::new(),
                wake,
            }),
            buffer: Vec::new(),
        }
    }

    /// Returns a new producer handle.
    pub fn sender(&self) -> TaskSender<S> {
        TaskSender {
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn name(&self) -> &'static str {
        self.shared.name
    }

    /// Number of tasks waiting for the next drain.
    pub fn pending(&self) -> usize {
        self.shared.pending.lock().tasks.len()
    }

    /// Runs every task submitted before this call, in submission order.
    ///
    /// A panicking task is caught and logged; the remaining tasks of the
    /// batch still run.
    pub fn drain_and_run(&mut self, state: &mut S) -> DrainReport {
        {
            let mut pending = self.shared.pending.lock();
            mem::swap(&mut pending.tasks, &mut self.buffer);
        }

        let mut report = DrainReport::default();
        for task in self.buffer.drain(..) {
            match panic::catch_unwind(AssertUnwindSafe(|| task(state))) {
                Ok(()) => report.executed += 1,
                Err(payload) => {
                    report.panicked += 1;
                    log::error!(
                        "Task on '{}' queue panicked: {}",
                        self.shared.name,
                        panic_message(payload.as_ref())
                    );
                }
            }
        }
        report
    }

    /// Parks the calling thread until a task is pending or `timeout`
    /// elapses. Returns `true` if tasks are pending.
    ///
    /// Meant for a dedicated executor thread. A frame loop should call
    /// [`drain_and_run`](Self::drain_and_run) once per tick instead.
    pub fn wait_for_tasks(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut pending = self.shared.pending.lock();
        while pending.tasks.is_empty() && !pending.closed {
            pending.waiting = true;
            let timed_out = self.shared.ready.wait_until(&mut pending, deadline).timed_out();
            pending.waiting = false;
            if timed_out {
                break;
            }
        }
        !pending.tasks.is_empty()
    }

    /// Rejects further submissions. Already pending tasks still run on the
    /// next drain.
    pub fn close(&self) {
        self.shared.pending.lock().closed = true;
        self.shared.ready.notify_all();
    }
}

impl<S> Drop for TaskQueue<S> {
    fn drop(&mut self) {
        let dropped = {
            let mut pending = self.shared.pending.lock();
            pending.closed = true;
            mem::take(&mut pending.tasks)
        };
        if !dropped.is_empty() {
            log::debug!(
                "Dropping {} unexecuted task(s) from '{}' queue",
                dropped.len(),
                self.shared.name
            );
        }
    }
}

impl<S> fmt::Debug for TaskQueue<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pending = self.shared.pending.lock();
        f.debug_struct("TaskQueue")
            .field("name", &self.shared.name)
            .field("pending", &pending.tasks.len())
            .field("closed", &pending.closed)
            .finish()
    }
}

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
