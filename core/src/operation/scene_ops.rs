//! Concrete operations on the [`Scene`].
//!
//! Structural edits (children, controls) plus constructors for the common
//! property edits the property panels issue.

use crate::math::{Quat, Vec3};
use crate::scene::{Control, LightId, NodeId, NodePayload, Scene, SceneNode, Transform};

use super::command::{Operation, OperationError, OperationResult};
use super::property::PropertyOperation;

/// Attaches a new node under a parent.
///
/// The node is built on the UI side and carried by the operation until the
/// first `redo` inserts it into the scene. Undo detaches it again but keeps
/// it in the arena so later redos reattach the same subtree.
#[derive(Debug)]
pub struct AddChild {
    parent: NodeId,
    child: NodeId,
    index: Option<usize>,
    pending: Option<SceneNode>,
    description: String,
}

impl AddChild {
    pub fn new(parent: NodeId, node: SceneNode) -> Self {
        Self {
            parent,
            child: node.id(),
            index: None,
            description: format!("Add {}", node.name),
            pending: Some(node),
        }
    }

    /// Inserts at `index` among the parent's children instead of appending.
    #[must_use]
    pub fn at(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn child(&self) -> NodeId {
        self.child
    }
}

impl Operation<Scene> for AddChild {
    fn redo(&mut self, target: &mut Scene) -> OperationResult {
        target.node(self.parent)?;
        if let Some(node) = self.pending.take() {
            if let Err(e) = target.insert(node.clone()) {
                self.pending = Some(node);
                return Err(e.into());
            }
        }
        target.attach(self.parent, self.child, self.index)?;
        Ok(())
    }

    fn undo(&mut self, target: &mut Scene) -> OperationResult {
        // Checked before detaching so a refused undo leaves the node in place.
        if let Some(parent) = target.node(self.child)?.parent()
            && parent != self.parent
        {
            return Err(OperationError::InvalidState(format!(
                "{} moved to {parent} since it was added",
                self.child
            )));
        }
        target.detach(self.child)?;
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Detaches a node from its parent, remembering where it was.
#[derive(Debug)]
pub struct RemoveChild {
    child: NodeId,
    restore: Option<(NodeId, usize)>,
    description: String,
}

impl RemoveChild {
    pub fn new(child: NodeId, name: &str) -> Self {
        Self {
            child,
            restore: None,
            description: format!("Remove {name}"),
        }
    }
}

impl Operation<Scene> for RemoveChild {
    fn redo(&mut self, target: &mut Scene) -> OperationResult {
        self.restore = Some(target.detach(self.child)?);
        Ok(())
    }

    fn undo(&mut self, target: &mut Scene) -> OperationResult {
        let (parent, index) = self
            .restore
            .ok_or_else(|| OperationError::InvalidState("remove was never applied".into()))?;
        target.attach(parent, self.child, Some(index))?;
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Appends a control to a node.
#[derive(Debug)]
pub struct AddControl {
    node: NodeId,
    control: Control,
    description: String,
}

impl AddControl {
    pub fn new(node: NodeId, control: Control) -> Self {
        Self {
            node,
            description: format!("Add control {}", control.name),
            control,
        }
    }
}

impl Operation<Scene> for AddControl {
    fn redo(&mut self, target: &mut Scene) -> OperationResult {
        target.node_mut(self.node)?.controls.push(self.control.clone());
        Ok(())
    }

    fn undo(&mut self, target: &mut Scene) -> OperationResult {
        let controls = &mut target.node_mut(self.node)?.controls;
        match controls.last() {
            Some(last) if last.name == self.control.name => {
                controls.pop();
                Ok(())
            }
            _ => Err(OperationError::InvalidState(format!(
                "control {} is no longer last on {}",
                self.control.name, self.node
            ))),
        }
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Removes a control from a node by name.
#[derive(Debug)]
pub struct RemoveControl {
    node: NodeId,
    name: String,
    removed: Option<(usize, Control)>,
    description: String,
}

impl RemoveControl {
    pub fn new(node: NodeId, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            node,
            description: format!("Remove control {name}"),
            name,
            removed: None,
        }
    }
}

impl Operation<Scene> for RemoveControl {
    fn redo(&mut self, target: &mut Scene) -> OperationResult {
        let controls = &mut target.node_mut(self.node)?.controls;
        let index = controls
            .iter()
            .position(|c| c.name == self.name)
            .ok_or_else(|| {
                OperationError::TargetNotFound(format!("control {} on {}", self.name, self.node))
            })?;
        self.removed = Some((index, controls.remove(index)));
        Ok(())
    }

    fn undo(&mut self, target: &mut Scene) -> OperationResult {
        let (index, control) = self
            .removed
            .take()
            .ok_or_else(|| OperationError::InvalidState("remove was never applied".into()))?;
        let controls = &mut target.node_mut(self.node)?.controls;
        controls.insert(index.min(controls.len()), control);
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Enables or disables every control of a node.
#[derive(Debug)]
pub struct EnableControls {
    node: NodeId,
    enabled: bool,
    previous: Vec<bool>,
}

impl EnableControls {
    pub fn new(node: NodeId, enabled: bool) -> Self {
        Self {
            node,
            enabled,
            previous: Vec::new(),
        }
    }
}

impl Operation<Scene> for EnableControls {
    fn redo(&mut self, target: &mut Scene) -> OperationResult {
        let controls = &mut target.node_mut(self.node)?.controls;
        self.previous = controls.iter().map(|c| c.enabled).collect();
        for control in controls.iter_mut() {
            control.enabled = self.enabled;
        }
        Ok(())
    }

    fn undo(&mut self, target: &mut Scene) -> OperationResult {
        let controls = &mut target.node_mut(self.node)?.controls;
        if controls.len() != self.previous.len() {
            return Err(OperationError::InvalidState(format!(
                "controls of {} changed since they were toggled",
                self.node
            )));
        }
        for (control, &enabled) in controls.iter_mut().zip(&self.previous) {
            control.enabled = enabled;
        }
        Ok(())
    }

    fn description(&self) -> &str {
        if self.enabled {
            "Enable controls"
        } else {
            "Disable controls"
        }
    }
}

// ---------------------------------------------------------------------------
// Property edits
// ---------------------------------------------------------------------------

/// Changes a light's position.
pub fn light_position(
    light: LightId,
    new: Vec3,
    old: Vec3,
) -> PropertyOperation<Scene, LightId, Vec3> {
    PropertyOperation::new(light, "position", new, old, apply_light_position)
}

/// Changes a light's direction.
pub fn light_direction(
    light: LightId,
    new: Vec3,
    old: Vec3,
) -> PropertyOperation<Scene, LightId, Vec3> {
    PropertyOperation::new(light, "direction", new, old, apply_light_direction)
}

/// Changes a light's color.
pub fn light_color(
    light: LightId,
    new: [f32; 3],
    old: [f32; 3],
) -> PropertyOperation<Scene, LightId, [f32; 3]> {
    PropertyOperation::new(light, "color", new, old, apply_light_color)
}

/// Renames a node.
pub fn node_name(
    node: NodeId,
    new: String,
    old: String,
) -> PropertyOperation<Scene, NodeId, String> {
    PropertyOperation::new(node, "name", new, old, apply_node_name)
}

/// Changes a node's local transform. Mergeable, so gizmo drags collapse
/// into one undo step.
pub fn node_transform(
    node: NodeId,
    new: Transform,
    old: Transform,
) -> PropertyOperation<Scene, NodeId, Transform> {
    PropertyOperation::new(node, "transform", new, old, apply_node_transform).mergeable()
}

/// Changes an audio emitter's position.
pub fn audio_position(
    node: NodeId,
    new: Vec3,
    old: Vec3,
) -> PropertyOperation<Scene, NodeId, Vec3> {
    PropertyOperation::new(node, "audio position", new, old, apply_audio_position)
}

/// Changes a presentable's location, rotation and scale in one step.
/// Mergeable like [`node_transform`].
pub fn presentable_transform(
    node: NodeId,
    new: Transform,
    old: Transform,
) -> PropertyOperation<Scene, NodeId, Transform> {
    PropertyOperation::new(
        node,
        "presentable transform",
        new,
        old,
        apply_presentable_transform,
    )
    .mergeable()
}

/// Changes a presentable's rotation.
pub fn presentable_rotation(
    node: NodeId,
    new: Quat,
    old: Quat,
) -> PropertyOperation<Scene, NodeId, Quat> {
    PropertyOperation::new(
        node,
        "presentable rotation",
        new,
        old,
        apply_presentable_rotation,
    )
}

fn apply_light_position(scene: &mut Scene, id: &LightId, value: &Vec3) -> OperationResult {
    scene.light_mut(*id)?.set_position(*value)?;
    Ok(())
}

fn apply_light_direction(scene: &mut Scene, id: &LightId, value: &Vec3) -> OperationResult {
    scene.light_mut(*id)?.set_direction(*value)?;
    Ok(())
}

fn apply_light_color(scene: &mut Scene, id: &LightId, value: &[f32; 3]) -> OperationResult {
    scene.light_mut(*id)?.color = *value;
    Ok(())
}

fn apply_node_name(scene: &mut Scene, id: &NodeId, value: &String) -> OperationResult {
    scene.node_mut(*id)?.name.clone_from(value);
    Ok(())
}

fn apply_node_transform(scene: &mut Scene, id: &NodeId, value: &Transform) -> OperationResult {
    scene.node_mut(*id)?.transform = *value;
    Ok(())
}

fn apply_audio_position(scene: &mut Scene, id: &NodeId, value: &Vec3) -> OperationResult {
    match &mut scene.node_mut(*id)?.payload {
        NodePayload::Audio(audio) => {
            audio.position = *value;
            Ok(())
        }
        _ => Err(not_a(*id, "audio emitter")),
    }
}

fn apply_presentable_transform(
    scene: &mut Scene,
    id: &NodeId,
    value: &Transform,
) -> OperationResult {
    match &mut scene.node_mut(*id)?.payload {
        NodePayload::Presentable(p) => {
            p.location = value.translation;
            p.rotation = value.rotation;
            p.scale = value.scale;
            Ok(())
        }
        _ => Err(not_a(*id, "presentable")),
    }
}

fn apply_presentable_rotation(scene: &mut Scene, id: &NodeId, value: &Quat) -> OperationResult {
    match &mut scene.node_mut(*id)?.payload {
        NodePayload::Presentable(p) => {
            p.rotation = *value;
            Ok(())
        }
        _ => Err(not_a(*id, "presentable")),
    }
}

fn not_a(node: NodeId, what: &str) -> OperationError {
    OperationError::InvalidState(format!("{node} is not a {what}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{AudioSource, Light, Presentable};

    fn assert_inverse(scene: &mut Scene, op: &mut dyn Operation<Scene>, check: impl Fn(&Scene) -> String) {
        let before = check(scene);
        op.redo(scene).unwrap();
        assert_ne!(check(scene), before, "redo had no visible effect");
        op.undo(scene).unwrap();
        assert_eq!(check(scene), before, "undo did not restore the prior state");
    }

    #[test]
    fn add_child_undo_refuses_moved_node() {
        let mut scene = Scene::new("root");
        let root = scene.root();
        let other = scene.spawn(root, SceneNode::new("other")).unwrap();
        let mut op = AddChild::new(root, SceneNode::new("child"));
        let child = op.child();
        op.redo(&mut scene).unwrap();

        scene.detach(child).unwrap();
        scene.attach(other, child, None).unwrap();

        let err = op.undo(&mut scene).unwrap_err();
        assert!(matches!(err, OperationError::InvalidState(_)));
        assert_eq!(scene.node(child).unwrap().parent(), Some(other));
        assert_eq!(scene.node(other).unwrap().children(), &[child]);
    }

    fn children(scene: &Scene, id: NodeId) -> String {
        format!("{:?}", scene.node(id).unwrap().children())
    }

    fn controls(scene: &Scene, id: NodeId) -> String {
        format!("{:?}", scene.node(id).unwrap().controls)
    }

    #[test]
    fn add_child_inverse() {
        let mut scene = Scene::new("root");
        let root = scene.root();
        scene.spawn(root, SceneNode::new("a")).unwrap();
        let mut op = AddChild::new(root, SceneNode::new("b")).at(0);
        assert_eq!(op.description(), "Add b");
        assert_inverse(&mut scene, &mut op, |s| children(s, root));

        // Redo after undo reattaches the same node.
        op.redo(&mut scene).unwrap();
        assert_eq!(scene.node(root).unwrap().children()[0], op.child());
    }

    #[test]
    fn add_child_to_missing_parent_keeps_node() {
        let mut scene = Scene::new("root");
        let mut op = AddChild::new(NodeId::next(), SceneNode::new("lost"));
        assert!(matches!(
            op.redo(&mut scene),
            Err(OperationError::TargetNotFound(_))
        ));
        assert!(!scene.contains(op.child()));
    }

    #[test]
    fn remove_child_restores_index() {
        let mut scene = Scene::new("root");
        let root = scene.root();
        let ids: Vec<NodeId> = ["a", "b", "c"]
            .iter()
            .map(|n| scene.spawn(root, SceneNode::new(*n)).unwrap())
            .collect();
        let mut op = RemoveChild::new(ids[1], "b");
        assert_inverse(&mut scene, &mut op, |s| children(s, root));
        assert_eq!(scene.node(root).unwrap().children(), ids.as_slice());
    }

    #[test]
    fn remove_child_undo_before_redo_fails() {
        let mut scene = Scene::new("root");
        let mut op = RemoveChild::new(NodeId::next(), "ghost");
        assert!(op.undo(&mut scene).is_err());
    }

    #[test]
    fn control_operations_are_inverse() {
        let mut scene = Scene::new("root");
        let root = scene.root();
        let node = scene
            .spawn(
                root,
                SceneNode::new("emitter")
                    .with_control(Control::new("spin"))
                    .with_control(Control::new("bob").disabled()),
            )
            .unwrap();

        assert_inverse(&mut scene, &mut AddControl::new(node, Control::new("glow")), |s| {
            controls(s, node)
        });
        assert_inverse(&mut scene, &mut RemoveControl::new(node, "spin"), |s| {
            controls(s, node)
        });
        assert_inverse(&mut scene, &mut EnableControls::new(node, false), |s| {
            controls(s, node)
        });
    }

    #[test]
    fn remove_missing_control_fails() {
        let mut scene = Scene::new("root");
        let root = scene.root();
        let mut op = RemoveControl::new(root, "nope");
        assert!(matches!(
            op.redo(&mut scene),
            Err(OperationError::TargetNotFound(_))
        ));
    }

    #[test]
    fn light_property_inverse() {
        let mut scene = Scene::new("root");
        let root = scene.root();
        let light = scene
            .add_light(root, Light::spot("spot", Vec3::zeros(), Vec3::new(0.0, -1.0, 0.0), 5.0))
            .unwrap();

        let mut op = light_position(light, Vec3::new(1.0, 2.0, 3.0), Vec3::zeros());
        assert_inverse(&mut scene, &mut op, |s| format!("{:?}", s.light(light).unwrap().position()));

        let mut op = light_direction(light, Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, -1.0, 0.0));
        assert_inverse(&mut scene, &mut op, |s| format!("{:?}", s.light(light).unwrap().direction()));

        let mut op = light_color(light, [1.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
        assert_inverse(&mut scene, &mut op, |s| format!("{:?}", s.light(light).unwrap().color));
    }

    #[test]
    fn light_position_on_directional_fails() {
        let mut scene = Scene::new("root");
        let root = scene.root();
        let sun = scene
            .add_light(root, Light::directional("sun", Vec3::new(0.0, -1.0, 0.0)))
            .unwrap();
        let mut op = light_position(sun, Vec3::new(1.0, 0.0, 0.0), Vec3::zeros());
        assert!(matches!(
            op.redo(&mut scene),
            Err(OperationError::InvalidState(_))
        ));
    }

    #[test]
    fn payload_properties_check_payload_kind() {
        let mut scene = Scene::new("root");
        let root = scene.root();
        let audio = scene
            .spawn(
                root,
                SceneNode::new("wind")
                    .with_payload(NodePayload::Audio(AudioSource::new("wind.ogg", Vec3::zeros()))),
            )
            .unwrap();
        let marker = scene
            .spawn(
                root,
                SceneNode::new("spawn").with_payload(NodePayload::Presentable(Presentable::new(
                    "spawn",
                    Vec3::zeros(),
                ))),
            )
            .unwrap();

        let mut op = audio_position(audio, Vec3::new(0.0, 1.0, 0.0), Vec3::zeros());
        assert_inverse(&mut scene, &mut op, |s| format!("{:?}", s.node(audio).unwrap().payload));

        let moved = Transform::from_translation(Vec3::new(4.0, 0.0, 0.0));
        let mut op = presentable_transform(marker, moved, Transform::identity());
        assert_inverse(&mut scene, &mut op, |s| format!("{:?}", s.node(marker).unwrap().payload));

        let mut wrong = audio_position(marker, Vec3::new(0.0, 1.0, 0.0), Vec3::zeros());
        assert!(wrong.redo(&mut scene).is_err());
    }

    #[test]
    fn rename_and_transform() {
        let mut scene = Scene::new("root");
        let root = scene.root();
        let node = scene.spawn(root, SceneNode::new("old")).unwrap();

        let mut op = node_name(node, "new".into(), "old".into());
        assert_inverse(&mut scene, &mut op, |s| s.node(node).unwrap().name.clone());

        let mut op = node_transform(
            node,
            Transform::from_translation(Vec3::new(0.0, 0.0, 2.0)),
            Transform::identity(),
        );
        assert_inverse(&mut scene, &mut op, |s| format!("{:?}", s.node(node).unwrap().transform));
    }
}
