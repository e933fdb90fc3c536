//! Node arena with parent/child attachment.
//!
//! Every node lives in the arena whether or not it is reachable from the
//! root. Detaching a node only unlinks it, so an undo step can reattach the
//! exact same subtree later.

use std::collections::HashMap;

use crate::operation::{Editable, OperationError};

use super::light::Light;
use super::payload::NodePayload;
use super::types::{Control, LightId, NodeId, Transform};

/// Errors reported by scene graph mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    #[error("{0} is not in the scene")]
    NodeNotFound(NodeId),
    #[error("{0} is not in the scene")]
    LightNotFound(LightId),
    #[error("{0} already exists")]
    DuplicateNode(NodeId),
    #[error("{0} already has a parent")]
    AlreadyAttached(NodeId),
    #[error("{0} has no parent")]
    NotAttached(NodeId),
    #[error("attaching {child} under {parent} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },
    #[error("the root node cannot be detached or reparented")]
    RootLocked,
    #[error("{object} has no {channel}")]
    UnsupportedChannel {
        object: String,
        channel: &'static str,
    },
    #[error("direction must be non-zero")]
    DegenerateDirection,
    #[error("index {index} out of range for {node}")]
    IndexOutOfRange { node: NodeId, index: usize },
}

impl From<SceneError> for OperationError {
    fn from(err: SceneError) -> Self {
        match err {
            SceneError::NodeNotFound(_) | SceneError::LightNotFound(_) => {
                OperationError::TargetNotFound(err.to_string())
            }
            _ => OperationError::InvalidState(err.to_string()),
        }
    }
}

/// A node in the scene tree.
#[derive(Debug, Clone)]
pub struct SceneNode {
    id: NodeId,
    pub name: String,
    pub transform: Transform,
    pub payload: NodePayload,
    pub controls: Vec<Control>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    lights: Vec<LightId>,
}

impl SceneNode {
    /// Creates a detached node with a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: NodeId::next(),
            name: name.into(),
            transform: Transform::identity(),
            payload: NodePayload::Empty,
            controls: Vec::new(),
            parent: None,
            children: Vec::new(),
            lights: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    #[must_use]
    pub fn with_payload(mut self, payload: NodePayload) -> Self {
        self.payload = payload;
        self
    }

    #[must_use]
    pub fn with_control(mut self, control: Control) -> Self {
        self.controls.push(control);
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn lights(&self) -> &[LightId] {
        &self.lights
    }
}

/// A light together with the node that owns it.
#[derive(Debug, Clone)]
pub struct SceneLight {
    pub owner: NodeId,
    pub light: Light,
}

/// The scene graph edited by the render thread.
#[derive(Debug)]
pub struct Scene {
    root: NodeId,
    nodes: HashMap<NodeId, SceneNode>,
    lights: HashMap<LightId, SceneLight>,
    revision: u64,
}

impl Editable for Scene {}

impl Scene {
    /// Creates a scene with a single root node.
    pub fn new(name: impl Into<String>) -> Self {
        let root = SceneNode::new(name);
        let root_id = root.id;
        let mut nodes = HashMap::new();
        nodes.insert(root_id, root);
        Self {
            root: root_id,
            nodes,
            lights: HashMap::new(),
            revision: 0,
        }
    }

    /// Bumped whenever nodes are attached or detached and whenever lights
    /// are added or removed. Payload edits through [`node_mut`](Self::node_mut)
    /// do not count.
    pub fn structure_revision(&self) -> u64 {
        self.revision
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node(&self, id: NodeId) -> Result<&SceneNode, SceneError> {
        self.nodes.get(&id).ok_or(SceneError::NodeNotFound(id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut SceneNode, SceneError> {
        self.nodes.get_mut(&id).ok_or(SceneError::NodeNotFound(id))
    }

    /// Inserts a detached node into the arena.
    ///
    /// Any parent/child links carried by `node` are cleared.
    pub fn insert(&mut self, mut node: SceneNode) -> Result<NodeId, SceneError> {
        let id = node.id;
        if self.nodes.contains_key(&id) {
            return Err(SceneError::DuplicateNode(id));
        }
        node.parent = None;
        node.children.clear();
        node.lights.clear();
        self.nodes.insert(id, node);
        Ok(id)
    }

    /// Convenience: inserts `node` and attaches it as the last child of `parent`.
    pub fn spawn(&mut self, parent: NodeId, node: SceneNode) -> Result<NodeId, SceneError> {
        self.node(parent)?;
        let id = self.insert(node)?;
        self.attach(parent, id, None)?;
        Ok(id)
    }

    /// Attaches a detached `child` under `parent` at `index` (end if `None`).
    pub fn attach(
        &mut self,
        parent: NodeId,
        child: NodeId,
        index: Option<usize>,
    ) -> Result<(), SceneError> {
        if child == self.root {
            return Err(SceneError::RootLocked);
        }
        if self.node(child)?.parent.is_some() {
            return Err(SceneError::AlreadyAttached(child));
        }
        let siblings = self.node(parent)?.children.len();
        let index = index.unwrap_or(siblings);
        if index > siblings {
            return Err(SceneError::IndexOutOfRange {
                node: parent,
                index,
            });
        }
        if self.is_ancestor(child, parent) {
            return Err(SceneError::Cycle { parent, child });
        }

        self.node_mut(parent)?.children.insert(index, child);
        self.node_mut(child)?.parent = Some(parent);
        self.revision += 1;
        Ok(())
    }

    /// Unlinks `child` from its parent, returning the parent and the index the
    /// child had among its siblings.
    pub fn detach(&mut self, child: NodeId) -> Result<(NodeId, usize), SceneError> {
        if child == self.root {
            return Err(SceneError::RootLocked);
        }
        let parent = self
            .node(child)?
            .parent
            .ok_or(SceneError::NotAttached(child))?;
        let siblings = &mut self.node_mut(parent)?.children;
        let index = siblings
            .iter()
            .position(|&c| c == child)
            .ok_or(SceneError::NotAttached(child))?;
        siblings.remove(index);
        self.node_mut(child)?.parent = None;
        self.revision += 1;
        Ok((parent, index))
    }

    /// Whether `ancestor` is `node` or one of its ancestors.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(&id).and_then(|n| n.parent);
        }
        false
    }

    /// Whether `id` is reachable from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.is_ancestor(self.root, id)
    }

    /// Depth-first, pre-order traversal of every node reachable from the root.
    pub fn attached_nodes(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(node) = self.nodes.get(&id) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// Adds a light owned by `owner`.
    pub fn add_light(&mut self, owner: NodeId, light: Light) -> Result<LightId, SceneError> {
        let id = LightId::next();
        self.node_mut(owner)?.lights.push(id);
        self.lights.insert(id, SceneLight { owner, light });
        self.revision += 1;
        Ok(id)
    }

    /// Removes a light, returning it.
    pub fn remove_light(&mut self, id: LightId) -> Result<SceneLight, SceneError> {
        let entry = self.lights.remove(&id).ok_or(SceneError::LightNotFound(id))?;
        if let Some(owner) = self.nodes.get_mut(&entry.owner) {
            owner.lights.retain(|&l| l != id);
        }
        self.revision += 1;
        Ok(entry)
    }

    pub fn light(&self, id: LightId) -> Result<&Light, SceneError> {
        self.lights
            .get(&id)
            .map(|entry| &entry.light)
            .ok_or(SceneError::LightNotFound(id))
    }

    pub fn light_mut(&mut self, id: LightId) -> Result<&mut Light, SceneError> {
        self.lights
            .get_mut(&id)
            .map(|entry| &mut entry.light)
            .ok_or(SceneError::LightNotFound(id))
    }

    pub fn light_owner(&self, id: LightId) -> Result<NodeId, SceneError> {
        self.lights
            .get(&id)
            .map(|entry| entry.owner)
            .ok_or(SceneError::LightNotFound(id))
    }

    /// Lights whose owner is reachable from the root.
    pub fn attached_lights(&self) -> Vec<LightId> {
        let mut ids: Vec<LightId> = self
            .lights
            .iter()
            .filter(|(_, entry)| self.is_attached(entry.owner))
            .map(|(&id, _)| id)
            .collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;

    fn scene_with_children(n: usize) -> (Scene, Vec<NodeId>) {
        let mut scene = Scene::new("root");
        let root = scene.root();
        let ids = (0..n)
            .map(|i| scene.spawn(root, SceneNode::new(format!("child {i}"))).unwrap())
            .collect();
        (scene, ids)
    }

    #[test]
    fn spawn_attaches_in_order() {
        let (scene, ids) = scene_with_children(3);
        assert_eq!(scene.node(scene.root()).unwrap().children(), ids.as_slice());
        assert!(ids.iter().all(|&id| scene.is_attached(id)));
    }

    #[test]
    fn detach_reports_index_and_attach_restores_it() {
        let (mut scene, ids) = scene_with_children(3);
        let (parent, index) = scene.detach(ids[1]).unwrap();
        assert_eq!(parent, scene.root());
        assert_eq!(index, 1);
        assert!(!scene.is_attached(ids[1]));
        assert!(scene.contains(ids[1]));

        scene.attach(parent, ids[1], Some(index)).unwrap();
        assert_eq!(scene.node(scene.root()).unwrap().children(), ids.as_slice());
    }

    #[test]
    fn attach_rejects_cycles_and_double_parents() {
        let (mut scene, ids) = scene_with_children(2);
        let grandchild = scene.spawn(ids[0], SceneNode::new("gc")).unwrap();

        assert_eq!(
            scene.attach(ids[1], grandchild, None),
            Err(SceneError::AlreadyAttached(grandchild))
        );

        scene.detach(ids[0]).unwrap();
        assert_eq!(
            scene.attach(grandchild, ids[0], None),
            Err(SceneError::Cycle {
                parent: grandchild,
                child: ids[0]
            })
        );
    }

    #[test]
    fn root_is_locked() {
        let (mut scene, ids) = scene_with_children(1);
        let root = scene.root();
        assert_eq!(scene.detach(root), Err(SceneError::RootLocked));
        assert_eq!(scene.attach(ids[0], root, None), Err(SceneError::RootLocked));
    }

    #[test]
    fn attach_index_out_of_range() {
        let (mut scene, _) = scene_with_children(1);
        let orphan = scene.insert(SceneNode::new("orphan")).unwrap();
        let root = scene.root();
        assert!(matches!(
            scene.attach(root, orphan, Some(5)),
            Err(SceneError::IndexOutOfRange { index: 5, .. })
        ));
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let mut scene = Scene::new("root");
        let node = SceneNode::new("twin");
        let copy = node.clone();
        scene.insert(node).unwrap();
        assert!(matches!(scene.insert(copy), Err(SceneError::DuplicateNode(_))));
    }

    #[test]
    fn traversal_is_preorder() {
        let (mut scene, ids) = scene_with_children(2);
        let gc = scene.spawn(ids[0], SceneNode::new("gc")).unwrap();
        assert_eq!(
            scene.attached_nodes(),
            vec![scene.root(), ids[0], gc, ids[1]]
        );
    }

    #[test]
    fn lights_follow_owner_attachment() {
        let (mut scene, ids) = scene_with_children(1);
        let light = scene
            .add_light(ids[0], Light::point("bulb", Vec3::zeros(), 1.0))
            .unwrap();
        assert_eq!(scene.attached_lights(), vec![light]);
        assert_eq!(scene.light_owner(light).unwrap(), ids[0]);

        scene.detach(ids[0]).unwrap();
        assert!(scene.attached_lights().is_empty());
        assert!(scene.light(light).is_ok());

        let removed = scene.remove_light(light).unwrap();
        assert_eq!(removed.owner, ids[0]);
        assert!(scene.node(ids[0]).unwrap().lights().is_empty());
        assert_eq!(scene.light(light).err(), Some(SceneError::LightNotFound(light)));
    }

    #[test]
    fn scene_errors_convert_to_operation_errors() {
        let id = NodeId::next();
        assert!(matches!(
            OperationError::from(SceneError::NodeNotFound(id)),
            OperationError::TargetNotFound(_)
        ));
        assert!(matches!(
            OperationError::from(SceneError::RootLocked),
            OperationError::InvalidState(_)
        ));
    }
}
