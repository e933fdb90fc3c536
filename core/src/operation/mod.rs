//! Reversible edit operations and their undo/redo history.
//!
//! The model is decoupled from threading: an [`Operation`] is a plain
//! command object that mutates an [`Editable`] target, and [`EditHistory`]
//! is a plain pair of stacks. The [`document`](crate::document) module
//! decides on which thread each piece runs.
//!
//! - [`Operation`]: a reversible edit (Command pattern)
//! - [`PropertyOperation`]: one named value swapped through an apply function
//! - [`StructuralOperation`]: an attach/detach pair of closures
//! - [`scene_ops`]: concrete structural and property edits on the scene
//! - [`EditHistory`]: bounded undo/redo stacks with merging
//!
//! # Recorded vs transient operations
//!
//! Operations are recorded by default. Override [`Operation::is_recorded`]
//! to return `false` for edits that should apply but never appear in the
//! history (selection changes, viewport tweaks).

mod command;
mod history;
mod property;
pub mod scene_ops;
mod structural;

pub use command::{AsAny, Editable, Operation, OperationError, OperationResult};
pub use history::{DEFAULT_MAX_UNDO, EditHistory, Recorded};
pub use property::{ApplyFn, PropertyOperation};
pub use structural::StructuralOperation;
