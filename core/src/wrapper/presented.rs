//! How wrappable domain objects expose their transform to a gizmo.

use std::fmt;

use crate::math::{Quat, Vec3, quat_approx_eq, quat_forward, quat_look_rotation, up_axis, vec3_approx_eq};
use crate::scene::{
    AudioSource, Light, LightId, LightKind, NodeId, NodePayload, Presentable, Scene, SceneError,
    Transform,
};

/// The transform channels a domain object presents.
///
/// A channel is `None` when the object has no such notion (a point light has
/// no rotation, nothing but a presentable has a scale).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PresentedTransform {
    pub translation: Option<Vec3>,
    pub rotation: Option<Quat>,
    pub scale: Option<Vec3>,
}

impl PresentedTransform {
    /// Channel-wise approximate equality. A channel present on one side only
    /// never matches.
    pub fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        fn channel<V>(a: &Option<V>, b: &Option<V>, eq: impl Fn(&V, &V) -> bool) -> bool {
            match (a, b) {
                (Some(a), Some(b)) => eq(a, b),
                (None, None) => true,
                _ => false,
            }
        }
        channel(&self.translation, &other.translation, |a, b| vec3_approx_eq(a, b, epsilon))
            && channel(&self.rotation, &other.rotation, |a, b| quat_approx_eq(a, b, epsilon))
            && channel(&self.scale, &other.scale, |a, b| vec3_approx_eq(a, b, epsilon))
    }

    /// Copies every present channel into `transform`, leaving the others
    /// untouched.
    pub fn apply_to(&self, transform: &mut Transform) {
        if let Some(t) = self.translation {
            transform.translation = t;
        }
        if let Some(r) = self.rotation {
            transform.rotation = r;
        }
        if let Some(s) = self.scale {
            transform.scale = s;
        }
    }
}

/// A domain object a wrapper can reconcile with.
pub trait Presented {
    /// Current transform as seen by the editor.
    fn presented(&self) -> PresentedTransform;

    /// Writes the channels this object supports from `edited`.
    fn present(&mut self, edited: &Transform) -> Result<(), SceneError>;
}

impl Presented for Light {
    fn presented(&self) -> PresentedTransform {
        PresentedTransform {
            translation: self.position(),
            rotation: self.direction().map(|d| quat_look_rotation(d, up_axis())),
            scale: None,
        }
    }

    fn present(&mut self, edited: &Transform) -> Result<(), SceneError> {
        match self.kind {
            LightKind::Ambient => Ok(()),
            LightKind::Directional { .. } => self.set_direction(quat_forward(edited.rotation)),
            LightKind::Point { .. } => self.set_position(edited.translation),
            LightKind::Spot { .. } => {
                self.set_position(edited.translation)?;
                self.set_direction(quat_forward(edited.rotation))
            }
        }
    }
}

impl Presented for AudioSource {
    fn presented(&self) -> PresentedTransform {
        PresentedTransform {
            translation: Some(self.position),
            rotation: Some(quat_look_rotation(self.direction, up_axis())),
            scale: None,
        }
    }

    fn present(&mut self, edited: &Transform) -> Result<(), SceneError> {
        let direction = quat_forward(edited.rotation)
            .try_normalize(f32::EPSILON)
            .ok_or(SceneError::DegenerateDirection)?;
        self.position = edited.translation;
        self.direction = direction;
        Ok(())
    }
}

impl Presented for Presentable {
    fn presented(&self) -> PresentedTransform {
        PresentedTransform {
            translation: Some(self.location),
            rotation: Some(self.rotation),
            scale: Some(self.scale),
        }
    }

    fn present(&mut self, edited: &Transform) -> Result<(), SceneError> {
        self.location = edited.translation;
        self.rotation = edited.rotation;
        self.scale = edited.scale;
        Ok(())
    }
}

/// Non-owning handle to a wrappable object, resolved against the scene on
/// every use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WrappedRef {
    Light(LightId),
    Audio(NodeId),
    Presentable(NodeId),
}

impl fmt::Display for WrappedRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Light(id) => write!(f, "{id}"),
            Self::Audio(id) => write!(f, "audio@{id}"),
            Self::Presentable(id) => write!(f, "presentable@{id}"),
        }
    }
}

/// Type tag used to pick a wrapper factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectKind {
    AmbientLight,
    DirectionalLight,
    PointLight,
    SpotLight,
    Audio,
    Presentable,
}

impl ObjectKind {
    pub fn of_light(light: &Light) -> Self {
        match light.kind {
            LightKind::Ambient => Self::AmbientLight,
            LightKind::Directional { .. } => Self::DirectionalLight,
            LightKind::Point { .. } => Self::PointLight,
            LightKind::Spot { .. } => Self::SpotLight,
        }
    }
}

/// Resolves `target` to its object. Returns `None` for handles that no
/// longer exist, point at the wrong payload, or belong to a node that is
/// not attached to the scene.
pub fn resolve_mut(scene: &mut Scene, target: WrappedRef) -> Option<&mut dyn Presented> {
    match target {
        WrappedRef::Light(id) => {
            let owner = scene.light_owner(id).ok()?;
            if !scene.is_attached(owner) {
                return None;
            }
            scene.light_mut(id).ok().map(|l| l as &mut dyn Presented)
        }
        WrappedRef::Audio(node) => {
            if !scene.is_attached(node) {
                return None;
            }
            match &mut scene.node_mut(node).ok()?.payload {
                NodePayload::Audio(audio) => Some(audio as &mut dyn Presented),
                _ => None,
            }
        }
        WrappedRef::Presentable(node) => {
            if !scene.is_attached(node) {
                return None;
            }
            match &mut scene.node_mut(node).ok()?.payload {
                NodePayload::Presentable(p) => Some(p as &mut dyn Presented),
                _ => None,
            }
        }
    }
}

/// Every wrappable object reachable from the root, in traversal order
/// (nodes first, then lights).
pub fn wrappable_objects(scene: &Scene) -> Vec<(WrappedRef, ObjectKind)> {
    let mut out = Vec::new();
    for id in scene.attached_nodes() {
        let Ok(node) = scene.node(id) else { continue };
        match node.payload {
            NodePayload::Audio(_) => out.push((WrappedRef::Audio(id), ObjectKind::Audio)),
            NodePayload::Presentable(_) => {
                out.push((WrappedRef::Presentable(id), ObjectKind::Presentable));
            }
            NodePayload::Empty | NodePayload::Geometry { .. } => {}
        }
    }
    for id in scene.attached_lights() {
        if let Ok(light) = scene.light(id) {
            out.push((WrappedRef::Light(id), ObjectKind::of_light(light)));
        }
    }
    out
}
