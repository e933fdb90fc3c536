//! The scene graph the editor core edits.
//!
//! This is the engine-side collaborator reduced to what the edit/undo core
//! consumes: a node tree with attach/detach and local transforms, controls,
//! lights, positional payloads and a camera.
//!
//! - [`Scene`]: node arena rooted at a single root node
//! - [`SceneNode`]: node with transform, payload, controls and children
//! - [`Light`] / [`LightKind`]: lights owned by nodes
//! - [`AudioSource`] / [`Presentable`]: non-geometric positional payloads
//! - [`Camera`]: viewport camera

mod camera;
mod graph;
mod light;
mod payload;
mod types;

pub use camera::Camera;
pub use graph::{Scene, SceneError, SceneLight, SceneNode};
pub use light::{Light, LightKind};
pub use payload::{AudioSource, NodePayload, Presentable};
pub use types::{Control, LightId, NodeId, Transform};
