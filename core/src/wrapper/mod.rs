//! Editor wrapper nodes: gizmo proxies for objects with no geometry.
//!
//! Lights, audio emitters and presentables have no mesh to click on. The
//! editor gives each one an [`EditorWrapper`] that owns the gizmo transform
//! and reconciles it with the object once per frame on the render thread.
//!
//! - [`Presented`]: how an object exposes its transform channels
//! - [`EditorWrapper`]: per-object reconciliation and model proxy placement
//! - [`WrapperRegistry`]: factories keyed by [`ObjectKind`]
//! - [`EditorOverlay`]: the wrapper set of a viewport

mod node;
mod overlay;
mod presented;
mod registry;

pub use node::{DEFAULT_MODEL_OFFSET, EditorWrapper, SyncOutcome, model_placement};
pub use overlay::{EditorOverlay, OverlayReport};
pub use presented::{
    ObjectKind, Presented, PresentedTransform, WrappedRef, resolve_mut, wrappable_objects,
};
pub use registry::{WrapperFactory, WrapperRegistry};
