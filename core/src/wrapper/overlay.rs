use std::collections::BTreeMap;

use crate::math::{Quat, Vec3};
use crate::scene::{Camera, Scene};

use super::node::{DEFAULT_MODEL_OFFSET, EditorWrapper, SyncOutcome};
use super::presented::{WrappedRef, wrappable_objects};
use super::registry::WrapperRegistry;

/// Per-tick counts of what the overlay's wrappers did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverlayReport {
    pub pushed: usize,
    pub pulled: usize,
    pub detached: usize,
}

/// All gizmo wrappers of a viewport.
#[derive(Debug, Clone)]
pub struct EditorOverlay {
    registry: WrapperRegistry,
    wrappers: BTreeMap<WrappedRef, EditorWrapper>,
    selected: Option<WrappedRef>,
    model_offset: f32,
}

impl EditorOverlay {
    pub fn new(registry: WrapperRegistry) -> Self {
        Self {
            registry,
            wrappers: BTreeMap::new(),
            selected: None,
            model_offset: DEFAULT_MODEL_OFFSET,
        }
    }

    /// Sets the model offset for existing and future wrappers.
    pub fn set_model_offset(&mut self, offset: f32) {
        self.model_offset = offset;
        for wrapper in self.wrappers.values_mut() {
            wrapper.set_model_offset(offset);
        }
    }

    pub fn registry(&self) -> &WrapperRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut WrapperRegistry {
        &mut self.registry
    }

    /// Brings the wrapper set in line with the scene.
    ///
    /// Objects that already have a wrapper keep it (with its gizmo state),
    /// new objects get one from the registry, and wrappers whose object is
    /// gone are dropped. Returns the number of wrappers afterwards.
    pub fn rebuild(&mut self, scene: &Scene) -> usize {
        let mut next = BTreeMap::new();
        for (target, kind) in wrappable_objects(scene) {
            let wrapper = match self.wrappers.remove(&target) {
                Some(existing) if existing.kind() == kind => existing,
                _ => match self.registry.create(kind, target) {
                    Some(mut created) => {
                        created.set_model_offset(self.model_offset);
                        created
                    }
                    None => continue,
                },
            };
            next.insert(target, wrapper);
        }

        let removed = self.wrappers.len();
        self.wrappers = next;
        if let Some(selected) = self.selected
            && !self.wrappers.contains_key(&selected)
        {
            self.selected = None;
        }
        log::debug!(
            "Rebuilt editor overlay: {} wrapper(s), {} removed",
            self.wrappers.len(),
            removed
        );
        self.wrappers.len()
    }

    /// Reconciles every wrapper with its object.
    pub fn tick(&mut self, scene: &mut Scene, camera: &Camera) -> OverlayReport {
        let mut report = OverlayReport::default();
        for wrapper in self.wrappers.values_mut() {
            match wrapper.tick(scene, camera) {
                SyncOutcome::Pushed => report.pushed += 1,
                SyncOutcome::Pulled => report.pulled += 1,
                SyncOutcome::Detached => report.detached += 1,
            }
        }
        report
    }

    /// Selects the wrapper for `target`, or clears the selection with
    /// `None`. Returns `false` if `target` has no wrapper.
    pub fn select(&mut self, target: Option<WrappedRef>) -> bool {
        match target {
            Some(t) if !self.wrappers.contains_key(&t) => false,
            _ => {
                self.selected = target;
                true
            }
        }
    }

    pub fn selected(&self) -> Option<&EditorWrapper> {
        self.selected.and_then(|t| self.wrappers.get(&t))
    }

    pub fn wrapper(&self, target: WrappedRef) -> Option<&EditorWrapper> {
        self.wrappers.get(&target)
    }

    pub fn wrapper_mut(&mut self, target: WrappedRef) -> Option<&mut EditorWrapper> {
        self.wrappers.get_mut(&target)
    }

    /// Moves a gizmo. The object follows on the next tick.
    pub fn move_gizmo(&mut self, target: WrappedRef, translation: Vec3) -> bool {
        self.wrappers
            .get_mut(&target)
            .map(|w| w.set_translation(translation))
            .is_some()
    }

    /// Rotates a gizmo. The object follows on the next tick.
    pub fn rotate_gizmo(&mut self, target: WrappedRef, rotation: Quat) -> bool {
        self.wrappers
            .get_mut(&target)
            .map(|w| w.set_rotation(rotation))
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.wrappers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wrappers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&WrappedRef, &EditorWrapper)> {
        self.wrappers.iter()
    }
}

impl Default for EditorOverlay {
    fn default() -> Self {
        Self::new(WrapperRegistry::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{AudioSource, Light, LightId, NodePayload, Presentable, SceneNode};
    use crate::wrapper::ObjectKind;

    struct Fixture {
        scene: Scene,
        lamp: crate::scene::NodeId,
        point: LightId,
        speaker: crate::scene::NodeId,
    }

    fn fixture() -> Fixture {
        let mut scene = Scene::new("root");
        let root = scene.root();
        let lamp = scene.spawn(root, SceneNode::new("lamp")).unwrap();
        let point = scene
            .add_light(lamp, Light::point("bulb", Vec3::new(0.0, 3.0, 0.0), 10.0))
            .unwrap();
        scene.add_light(root, Light::ambient("fill")).unwrap();
        let speaker = scene
            .spawn(
                root,
                SceneNode::new("speaker").with_payload(NodePayload::Audio(AudioSource::new(
                    "wind.ogg",
                    Vec3::new(2.0, 0.0, 0.0),
                ))),
            )
            .unwrap();
        scene
            .spawn(
                root,
                SceneNode::new("spawn").with_payload(NodePayload::Presentable(Presentable::new(
                    "player start",
                    Vec3::zeros(),
                ))),
            )
            .unwrap();
        Fixture {
            scene,
            lamp,
            point,
            speaker,
        }
    }

    #[test]
    fn rebuild_wraps_everything_but_ambient() {
        let f = fixture();
        let mut overlay = EditorOverlay::default();
        assert_eq!(overlay.rebuild(&f.scene), 3);
        assert_eq!(
            overlay.wrapper(WrappedRef::Light(f.point)).unwrap().kind(),
            ObjectKind::PointLight
        );
        assert!(overlay.wrapper(WrappedRef::Audio(f.speaker)).is_some());
    }

    #[test]
    fn rebuild_keeps_gizmo_state_and_drops_detached() {
        let mut f = fixture();
        let camera = Camera::default();
        let mut overlay = EditorOverlay::default();
        overlay.rebuild(&f.scene);
        overlay.tick(&mut f.scene, &camera);

        let speaker = WrappedRef::Audio(f.speaker);
        overlay.move_gizmo(speaker, Vec3::new(5.0, 0.0, 0.0));
        assert!(overlay.select(Some(WrappedRef::Light(f.point))));

        f.scene.detach(f.lamp).unwrap();
        assert_eq!(overlay.rebuild(&f.scene), 2);
        assert!(overlay.wrapper(WrappedRef::Light(f.point)).is_none());
        assert!(overlay.selected().is_none());
        assert_eq!(
            overlay.wrapper(speaker).unwrap().edited().translation,
            Vec3::new(5.0, 0.0, 0.0)
        );
    }

    #[test]
    fn tick_pulls_then_pushes() {
        let mut f = fixture();
        let camera = Camera::default();
        let mut overlay = EditorOverlay::default();
        overlay.rebuild(&f.scene);

        let first = overlay.tick(&mut f.scene, &camera);
        assert_eq!(first.pulled, 3);

        let target = WrappedRef::Light(f.point);
        assert!(overlay.move_gizmo(target, Vec3::new(1.0, 1.0, 1.0)));
        let second = overlay.tick(&mut f.scene, &camera);
        assert_eq!(second.pushed, 3);
        assert_eq!(
            f.scene.light(f.point).unwrap().position(),
            Some(Vec3::new(1.0, 1.0, 1.0))
        );
    }

    #[test]
    fn stale_wrapper_counts_as_detached() {
        let mut f = fixture();
        let camera = Camera::default();
        let mut overlay = EditorOverlay::default();
        overlay.rebuild(&f.scene);

        f.scene.remove_light(f.point).unwrap();
        let report = overlay.tick(&mut f.scene, &camera);
        assert_eq!(report.detached, 1);
        assert_eq!(report.pulled, 2);
    }

    #[test]
    fn select_unknown_target_fails() {
        let f = fixture();
        let mut overlay = EditorOverlay::default();
        overlay.rebuild(&f.scene);
        assert!(!overlay.select(Some(WrappedRef::Light(LightId::next()))));
        assert!(overlay.select(Some(WrappedRef::Audio(f.speaker))));
        assert_eq!(
            overlay.selected().unwrap().target(),
            Some(WrappedRef::Audio(f.speaker))
        );
        assert!(overlay.select(None));
        assert!(overlay.selected().is_none());
        assert!(!overlay.move_gizmo(WrappedRef::Light(LightId::next()), Vec3::zeros()));
    }

    #[test]
    fn model_offset_applies_to_wrappers() {
        let f = fixture();
        let mut overlay = EditorOverlay::default();
        overlay.set_model_offset(1.0);
        overlay.rebuild(&f.scene);
        assert!(overlay.iter().all(|(_, w)| w.model_offset() == 1.0));
        overlay.set_model_offset(2.0);
        assert!(overlay.iter().all(|(_, w)| w.model_offset() == 2.0));
    }
}
