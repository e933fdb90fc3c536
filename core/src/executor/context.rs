use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use super::queue::{SubmitError, TaskQueue, TaskSender, panic_message};

/// Why a cross-thread call produced no value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    #[error("task panicked: {0}")]
    Panicked(String),
}

/// Handles to the render and UI executors.
///
/// `R` is the state owned by the render thread, `U` the state owned by the
/// UI thread. The context is created once per editor session and passed to
/// whatever needs to schedule work; there is no global instance.
pub struct ExecutorContext<R, U> {
    render: TaskSender<R>,
    ui: TaskSender<U>,
}

impl<R, U> Clone for ExecutorContext<R, U> {
    fn clone(&self) -> Self {
        Self {
            render: self.render.clone(),
            ui: self.ui.clone(),
        }
    }
}

impl<R: 'static, U: 'static> ExecutorContext<R, U> {
    pub fn new(render: TaskSender<R>, ui: TaskSender<U>) -> Self {
        Self { render, ui }
    }

    pub fn render_sender(&self) -> &TaskSender<R> {
        &self.render
    }

    pub fn ui_sender(&self) -> &TaskSender<U> {
        &self.ui
    }

    /// Schedules `task` on the render thread.
    pub fn render(&self, task: impl FnOnce(&mut R) + Send + 'static) -> Result<(), SubmitError> {
        self.render.submit(task)
    }

    /// Schedules `task` on the UI thread.
    pub fn ui(&self, task: impl FnOnce(&mut U) + Send + 'static) -> Result<(), SubmitError> {
        self.ui.submit(task)
    }

    /// Runs `f` on the render thread and delivers its result to `done` on
    /// the UI thread.
    ///
    /// A panic inside `f` reaches `done` as [`TaskError::Panicked`]. If the
    /// UI queue is closed by the time `f` finishes, the result is logged and
    /// dropped.
    pub fn call_render<T: Send + 'static>(
        &self,
        f: impl FnOnce(&mut R) -> T + Send + 'static,
        done: impl FnOnce(&mut U, Result<T, TaskError>) + Send + 'static,
    ) -> Result<(), SubmitError> {
        let ui = self.ui.clone();
        self.render.submit(move |state| {
            let result = panic::catch_unwind(AssertUnwindSafe(|| f(state)))
                .map_err(|payload| TaskError::Panicked(panic_message(payload.as_ref())));
            if let Err(err) = ui.submit(move |ui_state| done(ui_state, result)) {
                log::warn!("Dropping render result: {err}");
            }
        })
    }
}

impl<R, U> fmt::Debug for ExecutorContext<R, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutorContext")
            .field("render", &self.render)
            .field("ui", &self.ui)
            .finish()
    }
}

/// Creates a render queue, a UI queue and the context that feeds them.
pub fn pair<R: 'static, U: 'static>() -> (ExecutorContext<R, U>, TaskQueue<R>, TaskQueue<U>) {
    let render = TaskQueue::new("render");
    let ui = TaskQueue::new("ui");
    (ExecutorContext::new(render.sender(), ui.sender()), render, ui)
}

/// Like [`pair`], with a wake hook on the UI queue.
pub fn pair_with_ui_wake<R: 'static, U: 'static>(
    hook: impl Fn() + Send + Sync + 'static,
) -> (ExecutorContext<R, U>, TaskQueue<R>, TaskQueue<U>) {
    let render = TaskQueue::new("render");
    let ui = TaskQueue::with_wake_hook("ui", hook);
    (ExecutorContext::new(render.sender(), ui.sender()), render, ui)
}
