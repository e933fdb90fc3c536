//! # SS Editor Core
//!
//! Edit/undo synchronization core of the SS scene editor.
//!
//! The editor runs two threads. The UI thread owns open documents, their
//! undo/redo histories and listeners; the render thread owns the scene and
//! ticks once per frame. Edits are reversible [`operation`]s created on the
//! UI thread, applied on the render thread, and reported back through
//! [`executor`] task queues. Gizmo [`wrapper`]s keep non-geometric objects
//! (lights, audio emitters, presentables) in sync with what the user drags.

pub mod document;
pub mod executor;
pub mod math;
pub mod operation;
pub mod scene;
pub mod viewport;
pub mod wrapper;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
