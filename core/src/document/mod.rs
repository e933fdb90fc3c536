//! Open documents and their change consumers.
//!
//! A [`ChangeConsumer`] is the UI thread's entry point for editing one
//! document. It ships each [`Operation`](crate::operation::Operation) to the
//! render thread, waits for the outcome to come back through the UI task
//! queue, and only then touches the history, the dirty flag and the
//! listeners.
//!
//! ```text
//!  UI thread                         render thread
//!  ─────────                         ─────────────
//!  consumer.execute(op) ──submit──▶  op.redo(scene)
//!                                        │
//!  docs.complete(..)    ◀──submit──  outcome
//!    history.record(op)
//!    dirty = true
//!    listeners(Executed)
//! ```

mod consumer;
mod registry;

pub use consumer::{ChangeConsumer, DocumentEvent, EditKind};
pub use registry::{DocumentId, Documents};

use crate::operation::Editable;

/// State owned by the render thread that operations are applied to.
pub trait RenderHost: 'static {
    type Target: Editable;

    fn target_mut(&mut self) -> &mut Self::Target;
}
