//! Identifiers and plain value types shared by the scene graph.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::math::{DEFAULT_EPSILON, Quat, Vec3, quat_approx_eq, vec3_approx_eq};

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_LIGHT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique node identifier.
///
/// Ids come from a global counter rather than from the owning [`Scene`](super::Scene),
/// so UI code can build a detached node (and an operation that attaches it)
/// without touching the render-thread scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    /// Allocates a fresh id.
    pub fn next() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Process-unique light identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LightId(u64);

impl LightId {
    /// Allocates a fresh id.
    pub fn next() -> Self {
        Self(NEXT_LIGHT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LightId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "light#{}", self.0)
    }
}

/// Local transform decomposed into translation, rotation and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    /// Identity transform: no translation, identity rotation, unit scale.
    pub fn identity() -> Self {
        Self {
            translation: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self::identity().with_translation(translation)
    }

    #[must_use]
    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.translation = translation;
        self
    }

    #[must_use]
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    #[must_use]
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Approximate equality of all three channels.
    pub fn approx_eq(&self, other: &Self) -> bool {
        vec3_approx_eq(&self.translation, &other.translation, DEFAULT_EPSILON)
            && quat_approx_eq(&self.rotation, &other.rotation, DEFAULT_EPSILON)
            && vec3_approx_eq(&self.scale, &other.scale, DEFAULT_EPSILON)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// A named behavior attached to a node (animation, physics body, emitter
/// driver...). The core only tracks identity and the enabled flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    pub name: String,
    pub enabled: bool,
}

impl Control {
    /// Creates an enabled control.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
        }
    }

    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let a = NodeId::next();
        let b = NodeId::next();
        assert_ne!(a, b);
        assert!(b.raw() > a.raw());
        assert_ne!(LightId::next(), LightId::next());
    }

    #[test]
    fn id_display() {
        let id = NodeId::next();
        assert_eq!(id.to_string(), format!("node#{}", id.raw()));
    }

    #[test]
    fn transform_builders() {
        let t = Transform::from_translation(Vec3::new(1.0, 2.0, 3.0))
            .with_scale(Vec3::new(2.0, 2.0, 2.0));
        assert_eq!(t.translation, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(t.rotation, Quat::identity());
        assert_eq!(t.scale, Vec3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn transform_approx_eq_ignores_noise() {
        let a = Transform::from_translation(Vec3::new(1.0, 0.0, 0.0));
        let b = Transform::from_translation(Vec3::new(1.000001, 0.0, 0.0));
        let c = Transform::from_translation(Vec3::new(1.1, 0.0, 0.0));
        assert!(a.approx_eq(&b));
        assert!(!a.approx_eq(&c));
    }

    #[test]
    fn control_defaults_to_enabled() {
        assert!(Control::new("spin").enabled);
        assert!(!Control::new("spin").disabled().enabled);
    }
}
