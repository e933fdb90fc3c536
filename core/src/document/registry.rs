use std::collections::BTreeMap;
use std::fmt;

use crate::executor::ExecutorContext;
use crate::operation::{DEFAULT_MAX_UNDO, Operation, OperationResult};
use crate::scene::NodeId;

use super::RenderHost;
use super::consumer::{ChangeConsumer, EditKind};

/// Identifies an open document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(u64);

impl DocumentId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc#{}", self.0)
    }
}

/// The open documents, owned by the UI thread.
///
/// This is also the state the UI task queue runs against: completions
/// coming back from the render thread look their document up by id, so a
/// completion for a document that was closed in the meantime is dropped.
pub struct Documents<R: RenderHost> {
    executors: ExecutorContext<R, Documents<R>>,
    open: BTreeMap<DocumentId, ChangeConsumer<R>>,
    next_id: u64,
    max_undo: usize,
}

impl<R: RenderHost> Documents<R> {
    pub fn new(executors: ExecutorContext<R, Documents<R>>) -> Self {
        Self::with_max_undo(executors, DEFAULT_MAX_UNDO)
    }

    /// Documents opened later keep at most `max_undo` undo steps.
    pub fn with_max_undo(executors: ExecutorContext<R, Documents<R>>, max_undo: usize) -> Self {
        Self {
            executors,
            open: BTreeMap::new(),
            next_id: 1,
            max_undo,
        }
    }

    pub fn executors(&self) -> &ExecutorContext<R, Documents<R>> {
        &self.executors
    }

    /// Opens a document rooted at `root`.
    pub fn open(&mut self, name: impl Into<String>, root: NodeId) -> DocumentId {
        let id = DocumentId(self.next_id);
        self.next_id += 1;
        let consumer = ChangeConsumer::new(
            id,
            name.into(),
            root,
            self.max_undo,
            self.executors.clone(),
        );
        log::info!("Opened {} '{}' at {root}", id, consumer.name());
        self.open.insert(id, consumer);
        id
    }

    /// Closes a document, discarding its history.
    pub fn close(&mut self, id: DocumentId) -> bool {
        match self.open.remove(&id) {
            Some(consumer) => {
                if consumer.is_busy() {
                    log::debug!("Closing {id} with edits still in flight");
                }
                log::info!("Closed {id} '{}'", consumer.name());
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: DocumentId) -> Option<&ChangeConsumer<R>> {
        self.open.get(&id)
    }

    pub fn get_mut(&mut self, id: DocumentId) -> Option<&mut ChangeConsumer<R>> {
        self.open.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.open.len()
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = DocumentId> + '_ {
        self.open.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChangeConsumer<R>> {
        self.open.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ChangeConsumer<R>> {
        self.open.values_mut()
    }

    pub(super) fn complete(
        &mut self,
        id: DocumentId,
        kind: EditKind,
        op: Box<dyn Operation<R::Target>>,
        outcome: OperationResult,
    ) {
        match self.open.get_mut(&id) {
            Some(consumer) => consumer.complete(kind, op, outcome),
            None => log::debug!(
                "{id} is closed, dropping {kind} completion of '{}'",
                op.description()
            ),
        }
    }
}

impl<R: RenderHost> fmt::Debug for Documents<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Documents")
            .field("open", &self.open)
            .field("max_undo", &self.max_undo)
            .finish()
    }
}
