//! Structural edits built from an attach/detach pair.

use std::fmt;

use super::command::{Editable, Operation, OperationResult};

type Step<T> = Box<dyn FnMut(&mut T) -> OperationResult + Send>;

/// A reversible structural change expressed as two primitive steps.
///
/// `redo` runs `attach` (the forward change: add a child, add a control,
/// enable something) and `undo` runs `detach` (its inverse). Use this for
/// one-off structural edits; the common scene edits have dedicated types in
/// [`scene_ops`](super::scene_ops).
pub struct StructuralOperation<T> {
    description: String,
    attach: Step<T>,
    detach: Step<T>,
}

impl<T> StructuralOperation<T> {
    pub fn new(
        description: impl Into<String>,
        attach: impl FnMut(&mut T) -> OperationResult + Send + 'static,
        detach: impl FnMut(&mut T) -> OperationResult + Send + 'static,
    ) -> Self {
        Self {
            description: description.into(),
            attach: Box::new(attach),
            detach: Box::new(detach),
        }
    }
}

impl<T> fmt::Debug for StructuralOperation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructuralOperation")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl<T: Editable> Operation<T> for StructuralOperation<T> {
    fn redo(&mut self, target: &mut T) -> OperationResult {
        (self.attach)(target)
    }

    fn undo(&mut self, target: &mut T) -> OperationResult {
        (self.detach)(target)
    }

    fn description(&self) -> &str {
        &self.description
    }
}
