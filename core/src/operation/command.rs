//! Editable targets and reversible edit operations.
//!
//! - [`Editable`]: marker trait for types that operations mutate
//! - [`Operation`]: a reversible edit (Command pattern)
//! - [`OperationError`] / [`OperationResult`]: error handling for operations
//!
//! Operations are self-contained: each implementation stores whatever it
//! needs (target handle, old/new values, detached subtrees) and touches the
//! target only inside [`Operation::redo`] and [`Operation::undo`].

use std::any::Any;
use std::fmt;

/// Gives operation trait objects access to their concrete type, which
/// [`Operation::merge`] needs to look inside the incoming operation.
pub trait AsAny: 'static {
    fn as_any(&self) -> &dyn Any;
}

impl<T: 'static> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Something operations are applied to: the render thread's [`Scene`], or a
/// small stand-in in tests.
///
/// [`Scene`]: crate::scene::Scene
pub trait Editable: 'static {}

/// Why an operation could not be applied.
///
/// The payload is a human-readable detail shown in logs and carried by
/// `DocumentEvent::Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationError {
    /// The handle no longer resolves (removed light, stale node id).
    TargetNotFound(String),
    /// The object exists but refuses the change, e.g. a position on an
    /// ambient light or an undo after the node was moved elsewhere.
    InvalidState(String),
    /// Anything else, including panics caught on the render thread.
    Custom(String),
}

impl fmt::Display for OperationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TargetNotFound(detail) => write!(f, "no such object: {detail}"),
            Self::InvalidState(detail) => write!(f, "cannot apply: {detail}"),
            Self::Custom(detail) => f.write_str(detail),
        }
    }
}

impl std::error::Error for OperationError {}

pub type OperationResult<T = ()> = Result<T, OperationError>;

/// A reversible edit (Command pattern).
///
/// `redo` is the forward direction and is also what runs the first time an
/// operation is executed. `undo` must restore exactly the observable state
/// the target had before `redo`.
///
/// # Merging
///
/// Operations produced continuously (each mouse move of a drag) can override
/// [`merge`](Self::merge) so consecutive operations collapse into a single
/// undo step. Downcast `other` through [`AsAny::as_any`].
///
/// # Object safety
///
/// The trait is dyn-compatible so that histories can store
/// `Box<dyn Operation<T>>` and ship them across threads.
pub trait Operation<T: Editable>: fmt::Debug + AsAny + Send {
    /// Applies the operation (forward direction).
    fn redo(&mut self, target: &mut T) -> OperationResult;

    /// Reverses the operation.
    fn undo(&mut self, target: &mut T) -> OperationResult;

    /// A short, human-readable description for edit menus.
    fn description(&self) -> &str;

    /// Tries to absorb `other` into `self`.
    ///
    /// Returns `None` when `other` was consumed, `Some(other)` otherwise.
    fn merge(&mut self, other: Box<dyn Operation<T>>) -> Option<Box<dyn Operation<T>>> {
        Some(other)
    }

    /// Whether this operation is recorded in the undo/redo history.
    ///
    /// Transient edits (selection, viewport tweaks) return `false`: they are
    /// applied but never pushed and never mark a document dirty.
    fn is_recorded(&self) -> bool {
        true
    }
}
