//! A headless editor session: render thread, UI loop and a scripted user.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use sseditor_core::document::{DocumentEvent, DocumentId, Documents};
use sseditor_core::executor::{self, SubmitError, TaskQueue};
use sseditor_core::viewport::Viewport;
use sseditor_core::wrapper::EditorOverlay;

use crate::config::EditorConfig;
use crate::demo::{self, Step};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("failed to spawn render thread: {0}")]
    Spawn(#[from] std::io::Error),
    #[error(transparent)]
    Submit(#[from] SubmitError),
    #[error("timed out waiting for {0}")]
    Timeout(&'static str),
    #[error("render thread panicked")]
    RenderPanicked,
}

/// What the session ended with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub frames: u64,
    pub steps: usize,
    /// Undo descriptions, most recent first.
    pub undo: Vec<String>,
    pub redo_count: usize,
    pub dirty: bool,
    pub failures: usize,
    pub wrappers: usize,
}

type UiQueue = TaskQueue<Documents<Viewport>>;

/// The render thread: ticks the viewport at a fixed rate until stopped.
struct RenderThread {
    handle: JoinHandle<Viewport>,
    running: Arc<AtomicBool>,
    frames: Arc<AtomicU64>,
}

impl RenderThread {
    fn spawn(
        mut viewport: Viewport,
        mut queue: TaskQueue<Viewport>,
        tick_rate: f64,
    ) -> std::io::Result<Self> {
        let running = Arc::new(AtomicBool::new(true));
        let frames = Arc::new(AtomicU64::new(0));
        let period = Duration::from_secs_f64(1.0 / tick_rate);

        let handle = thread::Builder::new().name("render".into()).spawn({
            let running = Arc::clone(&running);
            let frames = Arc::clone(&frames);
            move || {
                let mut next = Instant::now();
                while running.load(Ordering::Acquire) {
                    let report = viewport.tick(&mut queue);
                    frames.store(report.frame, Ordering::Release);
                    if report.tasks.panicked > 0 {
                        log::warn!(
                            "Frame {}: {} render task(s) panicked",
                            report.frame,
                            report.tasks.panicked
                        );
                    }

                    next += period;
                    let now = Instant::now();
                    if next > now {
                        thread::sleep(next - now);
                    } else {
                        next = now;
                    }
                }
                // Run whatever was queued while shutting down.
                viewport.tick(&mut queue);
                log::info!("Render thread stopped after {} frames", viewport.frame());
                viewport
            }
        })?;

        Ok(Self {
            handle,
            running,
            frames,
        })
    }

    fn frames(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }

    fn is_alive(&self) -> bool {
        !self.handle.is_finished()
    }

    fn stop(self) -> Result<Viewport, SessionError> {
        self.running.store(false, Ordering::Release);
        self.handle.join().map_err(|_| SessionError::RenderPanicked)
    }
}

/// Runs the demo session described by `config`.
pub fn run(config: &EditorConfig) -> Result<SessionSummary, SessionError> {
    let demo = demo::build(&config.session.document);
    let steps = demo::script(&demo);
    let step_count = steps.len();
    let root = demo.scene.root();

    let mut overlay = EditorOverlay::default();
    overlay.set_model_offset(config.render.model_offset);
    let viewport = Viewport::with_overlay(demo.scene, overlay);
    log::info!(
        "Demo scene '{}' ready with {} gizmo wrapper(s)",
        config.session.document,
        viewport.overlay.len()
    );

    let (ctx, render_queue, mut ui) = executor::pair::<Viewport, Documents<Viewport>>();
    let render = RenderThread::spawn(viewport, render_queue, config.render.tick_rate)?;

    let mut docs = Documents::with_max_undo(ctx, config.history.max_undo);
    let doc = docs.open(config.session.document.clone(), root);
    let failures = Rc::new(Cell::new(0usize));
    if let Some(consumer) = docs.get_mut(doc) {
        let failures = Rc::clone(&failures);
        consumer.subscribe(move |event| match event {
            DocumentEvent::Failed { .. } => failures.set(failures.get() + 1),
            DocumentEvent::DirtyChanged(dirty) => {
                log::info!("Document is now {}", if *dirty { "modified" } else { "saved" });
            }
            other => log::debug!("{other:?}"),
        });
    }

    let timeout = Duration::from_secs_f64(config.session.settle_timeout_secs);
    let played = play(&mut docs, &mut ui, doc, steps, timeout);

    while played.is_ok() && render.is_alive() && render.frames() < config.session.frames {
        thread::sleep(Duration::from_millis(1));
    }

    let viewport = render.stop()?;
    played?;

    let consumer = docs.get(doc).ok_or(SessionError::Timeout("document"))?;
    let history = consumer.history();
    Ok(SessionSummary {
        frames: viewport.frame(),
        steps: step_count,
        undo: history.undo_descriptions().map(str::to_owned).collect(),
        redo_count: history.redo_count(),
        dirty: consumer.is_dirty(),
        failures: failures.get(),
        wrappers: viewport.overlay.len(),
    })
}

/// Plays `steps` one at a time, waiting for each to come back from the
/// render thread before issuing the next.
fn play(
    docs: &mut Documents<Viewport>,
    ui: &mut UiQueue,
    doc: DocumentId,
    steps: Vec<Step>,
    timeout: Duration,
) -> Result<(), SessionError> {
    let total = steps.len();
    for (i, step) in steps.into_iter().enumerate() {
        let Some(consumer) = docs.get_mut(doc) else {
            log::warn!("{doc} closed, stopping script");
            return Ok(());
        };
        match step {
            Step::Execute(op) => {
                log::info!("[{}/{total}] {}", i + 1, op.description());
                consumer.execute(op)?;
            }
            Step::Undo => {
                log::info!("[{}/{total}] Undo", i + 1);
                if !consumer.undo()? {
                    log::info!("Nothing to undo");
                }
            }
            Step::Redo => {
                log::info!("[{}/{total}] Redo", i + 1);
                if !consumer.redo()? {
                    log::info!("Nothing to redo");
                }
            }
            Step::Save => {
                log::info!("[{}/{total}] Save", i + 1);
                consumer.mark_saved();
            }
            Step::RebuildOverlay => {
                log::info!("[{}/{total}] Rebuild overlay", i + 1);
                docs.executors().call_render(
                    |vp: &mut Viewport| vp.rebuild_overlay(),
                    |_, result| match result {
                        Ok(count) => log::info!("Overlay rebuilt with {count} wrapper(s)"),
                        Err(err) => log::error!("Overlay rebuild failed: {err}"),
                    },
                )?;
            }
        }
        settle(docs, ui, doc, timeout)?;
    }
    Ok(())
}

/// Drains the UI queue until the document has nothing in flight.
fn settle(
    docs: &mut Documents<Viewport>,
    ui: &mut UiQueue,
    doc: DocumentId,
    timeout: Duration,
) -> Result<(), SessionError> {
    let deadline = Instant::now() + timeout;
    loop {
        ui.drain_and_run(docs);
        if !docs.get(doc).is_some_and(|consumer| consumer.is_busy()) {
            return Ok(());
        }
        let now = Instant::now();
        if now >= deadline {
            return Err(SessionError::Timeout("render thread"));
        }
        ui.wait_for_tasks(deadline - now);
    }
}
