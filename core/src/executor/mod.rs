//! Thread-affine task executors.
//!
//! The editor runs on two threads. The render thread owns the scene and
//! drains its queue once per frame; the UI thread owns documents and
//! listeners and drains its queue from its event loop. Either thread may
//! submit to either queue.
//!
//! - [`TaskQueue`] / [`TaskSender`]: single-consumer mailbox of closures
//! - [`ExecutorContext`]: explicit handle to both queues, with
//!   [`call_render`](ExecutorContext::call_render) for request/response
//!   round trips

mod context;
mod queue;

pub use context::{ExecutorContext, TaskError, pair, pair_with_ui_wake};
pub use queue::{DrainReport, SubmitError, Task, TaskQueue, TaskSender, WakeHook};
pub(crate) use queue::panic_message;
