use crate::math::{DEFAULT_EPSILON, Quat, Vec3};
use crate::scene::{Camera, Scene, Transform};

use super::presented::{ObjectKind, PresentedTransform, WrappedRef, resolve_mut};

/// Distance in front of the near plane at which model proxies are drawn.
pub const DEFAULT_MODEL_OFFSET: f32 = 0.4;

/// What a wrapper did on one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Nothing wrapped, or the handle no longer resolves.
    Detached,
    /// The object changed on its own; the gizmo now follows it.
    Pulled,
    /// The gizmo's transform was written into the object.
    Pushed,
}

/// Gizmo proxy for one non-geometric scene object.
///
/// The `edited` transform is what the user manipulates. Every tick the
/// wrapper compares the object's presented transform with what it saw last
/// time: if the object is unchanged, `edited` is pushed into it; otherwise
/// the object was changed from elsewhere (an undo, a property panel) and
/// `edited` is pulled from it.
#[derive(Debug, Clone)]
pub struct EditorWrapper {
    kind: ObjectKind,
    target: Option<WrappedRef>,
    edited: Transform,
    model: Option<Transform>,
    model_offset: f32,
    cache: Option<PresentedTransform>,
    epsilon: f32,
}

impl EditorWrapper {
    /// Creates a wrapper with nothing wrapped.
    pub fn new(kind: ObjectKind) -> Self {
        Self {
            kind,
            target: None,
            edited: Transform::identity(),
            model: None,
            model_offset: DEFAULT_MODEL_OFFSET,
            cache: None,
            epsilon: DEFAULT_EPSILON,
        }
    }

    pub fn wrapping(kind: ObjectKind, target: WrappedRef) -> Self {
        let mut wrapper = Self::new(kind);
        wrapper.target = Some(target);
        wrapper
    }

    /// Enables the model proxy drawn in front of the camera.
    #[must_use]
    pub fn with_model(mut self) -> Self {
        self.model = Some(self.edited);
        self
    }

    #[must_use]
    pub fn with_epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn set_model_offset(&mut self, offset: f32) {
        self.model_offset = offset;
    }

    /// Points the wrapper at another object (or none). The next tick pulls.
    pub fn wrap(&mut self, target: Option<WrappedRef>) {
        self.target = target;
        self.cache = None;
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    pub fn target(&self) -> Option<WrappedRef> {
        self.target
    }

    pub fn edited(&self) -> &Transform {
        &self.edited
    }

    /// Model proxy transform, if the wrapper has one.
    pub fn model(&self) -> Option<&Transform> {
        self.model.as_ref()
    }

    pub fn model_offset(&self) -> f32 {
        self.model_offset
    }

    /// Replaces the gizmo transform. Takes effect on the next tick.
    pub fn set_edited(&mut self, transform: Transform) {
        self.edited = transform;
    }

    pub fn set_translation(&mut self, translation: Vec3) {
        self.edited.translation = translation;
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        self.edited.rotation = rotation;
    }

    /// Reconciles with the wrapped object, then repositions the model proxy.
    pub fn tick(&mut self, scene: &mut Scene, camera: &Camera) -> SyncOutcome {
        let outcome = self.reconcile(scene);
        if let Some(model) = &mut self.model {
            *model = model_placement(camera, &self.edited, self.model_offset);
        }
        outcome
    }

    /// Unconditionally pulls the object's transform into the gizmo.
    pub fn sync(&mut self, scene: &mut Scene) -> SyncOutcome {
        let Some(target) = self.target else {
            return SyncOutcome::Detached;
        };
        let Some(object) = resolve_mut(scene, target) else {
            return SyncOutcome::Detached;
        };
        let current = object.presented();
        current.apply_to(&mut self.edited);
        self.cache = Some(current);
        SyncOutcome::Pulled
    }

    fn reconcile(&mut self, scene: &mut Scene) -> SyncOutcome {
        let Some(target) = self.target else {
            return SyncOutcome::Detached;
        };
        let Some(object) = resolve_mut(scene, target) else {
            return SyncOutcome::Detached;
        };

        let current = object.presented();
        let unchanged = self
            .cache
            .is_some_and(|cached| cached.approx_eq(&current, self.epsilon));
        if unchanged {
            match object.present(&self.edited) {
                Ok(()) => {
                    self.cache = Some(object.presented());
                    return SyncOutcome::Pushed;
                }
                Err(err) => log::warn!("Gizmo edit rejected by {target}: {err}"),
            }
        }

        current.apply_to(&mut self.edited);
        self.cache = Some(current);
        SyncOutcome::Pulled
    }
}

/// Where a model proxy goes: just past the camera's near plane, on the line
/// from the camera to the gizmo. A gizmo at the camera position keeps its
/// own location.
pub fn model_placement(camera: &Camera, gizmo: &Transform, offset: f32) -> Transform {
    let translation = match (gizmo.translation - camera.location).try_normalize(f32::EPSILON) {
        Some(dir) => camera.location + dir * (camera.near + offset),
        None => gizmo.translation,
    };
    Transform {
        translation,
        ..*gizmo
    }
}
