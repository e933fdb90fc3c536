use std::collections::VecDeque;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::executor::{ExecutorContext, SubmitError, panic_message};
use crate::operation::{
    EditHistory, Editable, Operation, OperationError, OperationResult, Recorded,
};
use crate::scene::NodeId;

use super::{DocumentId, Documents, RenderHost};

/// Which direction an operation was run in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    Execute,
    Undo,
    Redo,
}

impl fmt::Display for EditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Execute => "execute",
            Self::Undo => "undo",
            Self::Redo => "redo",
        })
    }
}

/// Notification delivered to document listeners on the UI thread.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentEvent {
    Executed { description: String },
    Undone { description: String },
    Redone { description: String },
    /// The operation did not apply. After a failed undo the operation is
    /// back on the undo stack; after a failed execute or redo it is gone.
    Failed {
        kind: EditKind,
        description: String,
        error: OperationError,
    },
    DirtyChanged(bool),
}

type Listener = Box<dyn FnMut(&DocumentEvent)>;

enum Request<T: Editable> {
    Execute(Box<dyn Operation<T>>),
    Undo,
    Redo,
}

/// Entry point for edits on one open document.
///
/// Lives on the UI thread inside [`Documents`]. Every edit is shipped to the
/// render thread, applied there, and its outcome shipped back; history,
/// dirty flag and listeners are only touched on the UI thread.
///
/// Undo and redo requests made while earlier edits are still in flight are
/// held back until those edits complete, so they always act on the
/// operation the user last saw.
pub struct ChangeConsumer<R: RenderHost> {
    id: DocumentId,
    name: String,
    root: NodeId,
    history: EditHistory<R::Target>,
    dirty: bool,
    in_flight: usize,
    deferred: VecDeque<Request<R::Target>>,
    listeners: Vec<Listener>,
    executors: ExecutorContext<R, Documents<R>>,
}

impl<R: RenderHost> ChangeConsumer<R> {
    pub(super) fn new(
        id: DocumentId,
        name: String,
        root: NodeId,
        max_undo: usize,
        executors: ExecutorContext<R, Documents<R>>,
    ) -> Self {
        Self {
            id,
            name,
            root,
            history: EditHistory::new(max_undo),
            dirty: false,
            in_flight: 0,
            deferred: VecDeque::new(),
            listeners: Vec::new(),
            executors,
        }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The document's root node.
    pub fn current_model(&self) -> NodeId {
        self.root
    }

    pub fn history(&self) -> &EditHistory<R::Target> {
        &self.history
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether edits are on their way to or from the render thread.
    pub fn is_busy(&self) -> bool {
        self.in_flight > 0 || !self.deferred.is_empty()
    }

    /// Marks the document as saved. This is the only way back to clean.
    pub fn mark_saved(&mut self) {
        self.set_dirty(false);
    }

    /// Registers a listener for this document's events.
    pub fn subscribe(&mut self, listener: impl FnMut(&DocumentEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Applies `op` on the render thread and records it once it succeeded.
    ///
    /// Returns as soon as the operation is queued.
    pub fn execute(&mut self, op: Box<dyn Operation<R::Target>>) -> Result<(), SubmitError> {
        if !self.deferred.is_empty() {
            self.deferred.push_back(Request::Execute(op));
            return Ok(());
        }
        self.dispatch(EditKind::Execute, op)
    }

    /// Reverts the most recent operation. Returns `false` if there is
    /// nothing to undo. A request held back behind in-flight edits returns
    /// `true` and is dropped later if the undo stack is empty by then.
    pub fn undo(&mut self) -> Result<bool, SubmitError> {
        self.request(Request::Undo)
    }

    /// Reapplies the most recently undone operation. Returns `false` if
    /// there is nothing to redo.
    pub fn redo(&mut self) -> Result<bool, SubmitError> {
        self.request(Request::Redo)
    }

    fn request(&mut self, request: Request<R::Target>) -> Result<bool, SubmitError> {
        let render = self.executors.render_sender();
        if render.is_closed() {
            return Err(SubmitError::Closed(render.name()));
        }
        if self.is_busy() {
            self.deferred.push_back(request);
            return Ok(true);
        }
        match self.take(request) {
            Some((kind, op)) => self.dispatch(kind, op).map(|()| true),
            None => Ok(false),
        }
    }

    fn take(
        &mut self,
        request: Request<R::Target>,
    ) -> Option<(EditKind, Box<dyn Operation<R::Target>>)> {
        match request {
            Request::Undo => self.history.take_undo().map(|op| (EditKind::Undo, op)),
            Request::Redo => self.history.take_redo().map(|op| (EditKind::Redo, op)),
            Request::Execute(op) => Some((EditKind::Execute, op)),
        }
    }

    fn dispatch(
        &mut self,
        kind: EditKind,
        op: Box<dyn Operation<R::Target>>,
    ) -> Result<(), SubmitError> {
        let id = self.id;
        let ui = self.executors.ui_sender().clone();
        // The task owns the operation only once it runs; a rejected submit
        // hands it back to the history.
        let slot = Arc::new(Mutex::new(Some(op)));
        let carried = Arc::clone(&slot);
        let submitted = self.executors.render(move |host: &mut R| {
            let Some(mut op) = carried.lock().take() else {
                return;
            };
            let target = host.target_mut();
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| match kind {
                EditKind::Execute | EditKind::Redo => op.redo(target),
                EditKind::Undo => op.undo(target),
            }))
            .unwrap_or_else(|payload| {
                Err(OperationError::Custom(format!(
                    "panicked: {}",
                    panic_message(payload.as_ref())
                )))
            });

            if let Err(err) = ui.submit(move |docs: &mut Documents<R>| {
                docs.complete(id, kind, op, outcome);
            }) {
                log::warn!("Dropping {kind} completion for {id}: {err}");
            }
        });
        if let Err(err) = submitted {
            if let Some(op) = slot.lock().take() {
                self.restore(kind, op);
            }
            return Err(err);
        }
        self.in_flight += 1;
        Ok(())
    }

    /// Puts an operation that never reached the render thread back where it
    /// was taken from. A fresh execute has no place in the history yet.
    fn restore(&mut self, kind: EditKind, op: Box<dyn Operation<R::Target>>) {
        match kind {
            EditKind::Undo => self.history.push_undo(op),
            EditKind::Redo => self.history.push_redo(op),
            EditKind::Execute => {
                log::warn!("Dropping '{}' on {}: never applied", op.description(), self.id);
            }
        }
    }

    /// Applies the outcome of an operation that ran on the render thread.
    pub(super) fn complete(
        &mut self,
        kind: EditKind,
        op: Box<dyn Operation<R::Target>>,
        outcome: OperationResult,
    ) {
        self.in_flight = self.in_flight.saturating_sub(1);
        let description = op.description().to_owned();

        match (kind, outcome) {
            (EditKind::Execute, Ok(())) => {
                if self.history.record(op) != Recorded::Skipped {
                    self.set_dirty(true);
                }
                self.emit(&DocumentEvent::Executed { description });
            }
            (EditKind::Undo, Ok(())) => {
                self.history.push_redo(op);
                self.set_dirty(true);
                self.emit(&DocumentEvent::Undone { description });
            }
            (EditKind::Redo, Ok(())) => {
                self.history.push_undo(op);
                self.set_dirty(true);
                self.emit(&DocumentEvent::Redone { description });
            }
            (EditKind::Undo, Err(error)) => {
                log::warn!("Undo of '{description}' failed, keeping it: {error}");
                self.history.push_undo(op);
                self.emit(&DocumentEvent::Failed {
                    kind,
                    description,
                    error,
                });
            }
            (kind, Err(error)) => {
                log::error!("Failed to {kind} '{description}': {error}");
                self.emit(&DocumentEvent::Failed {
                    kind,
                    description,
                    error,
                });
            }
        }

        self.flush_deferred();
    }

    fn flush_deferred(&mut self) {
        while self.in_flight == 0
            && let Some(request) = self.deferred.pop_front()
        {
            let Some((kind, op)) = self.take(request) else {
                continue;
            };
            if let Err(err) = self.dispatch(kind, op) {
                log::error!("Deferred {kind} on {} not applied: {err}", self.id);
            }
        }
    }

    fn set_dirty(&mut self, dirty: bool) {
        if self.dirty != dirty {
            self.dirty = dirty;
            self.emit(&DocumentEvent::DirtyChanged(dirty));
        }
    }

    fn emit(&mut self, event: &DocumentEvent) {
        for listener in &mut self.listeners {
            listener(event);
        }
    }
}

impl<R: RenderHost> fmt::Debug for ChangeConsumer<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeConsumer")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("root", &self.root)
            .field("history", &self.history)
            .field("dirty", &self.dirty)
            .field("in_flight", &self.in_flight)
            .field("deferred", &self.deferred.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
