//! Wrapper factories keyed by object kind.

use std::collections::BTreeMap;

use super::node::EditorWrapper;
use super::presented::{ObjectKind, WrappedRef};

/// Builds the wrapper for one object.
pub type WrapperFactory = fn(WrappedRef) -> EditorWrapper;

/// Maps object kinds to wrapper factories.
///
/// Kinds without a factory (ambient lights, by default) get no wrapper.
/// Applications register their own factories to add kinds or to replace
/// the built-in ones.
#[derive(Debug, Clone)]
pub struct WrapperRegistry {
    factories: BTreeMap<ObjectKind, WrapperFactory>,
}

impl WrapperRegistry {
    /// A registry with no factories.
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// A registry with a factory for every kind that has a transform.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(ObjectKind::DirectionalLight, |target| {
            EditorWrapper::wrapping(ObjectKind::DirectionalLight, target).with_model()
        });
        registry.register(ObjectKind::PointLight, |target| {
            EditorWrapper::wrapping(ObjectKind::PointLight, target).with_model()
        });
        registry.register(ObjectKind::SpotLight, |target| {
            EditorWrapper::wrapping(ObjectKind::SpotLight, target).with_model()
        });
        registry.register(ObjectKind::Audio, |target| {
            EditorWrapper::wrapping(ObjectKind::Audio, target).with_model()
        });
        registry.register(ObjectKind::Presentable, |target| {
            EditorWrapper::wrapping(ObjectKind::Presentable, target)
        });
        registry
    }

    /// Registers `factory` for `kind`, returning the factory it replaced.
    pub fn register(&mut self, kind: ObjectKind, factory: WrapperFactory) -> Option<WrapperFactory> {
        self.factories.insert(kind, factory)
    }

    /// Removes the factory for `kind`.
    pub fn unregister(&mut self, kind: ObjectKind) -> Option<WrapperFactory> {
        self.factories.remove(&kind)
    }

    pub fn contains(&self, kind: ObjectKind) -> bool {
        self.factories.contains_key(&kind)
    }

    /// Iterate over the registered kinds.
    pub fn kinds(&self) -> impl Iterator<Item = ObjectKind> + '_ {
        self.factories.keys().copied()
    }

    /// Builds a wrapper for `target`, or `None` if `kind` has no factory.
    pub fn create(&self, kind: ObjectKind, target: WrappedRef) -> Option<EditorWrapper> {
        self.factories.get(&kind).map(|factory| factory(target))
    }
}

impl Default for WrapperRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{LightId, NodeId};

    #[test]
    fn defaults_cover_every_kind_but_ambient() {
        let registry = WrapperRegistry::default();
        assert!(!registry.contains(ObjectKind::AmbientLight));
        assert_eq!(registry.kinds().count(), 5);

        let light = WrappedRef::Light(LightId::next());
        assert!(registry.create(ObjectKind::AmbientLight, light).is_none());
        let wrapper = registry.create(ObjectKind::SpotLight, light).unwrap();
        assert_eq!(wrapper.kind(), ObjectKind::SpotLight);
        assert_eq!(wrapper.target(), Some(light));
        assert!(wrapper.model().is_some());
    }

    #[test]
    fn register_extends_and_replaces() {
        let mut registry = WrapperRegistry::empty();
        assert!(registry
            .register(ObjectKind::AmbientLight, |target| {
                EditorWrapper::wrapping(ObjectKind::AmbientLight, target)
            })
            .is_none());
        assert!(registry.contains(ObjectKind::AmbientLight));

        let previous = registry.register(ObjectKind::AmbientLight, |target| {
            EditorWrapper::wrapping(ObjectKind::AmbientLight, target).with_model()
        });
        assert!(previous.is_some());
        let wrapper = registry
            .create(ObjectKind::AmbientLight, WrappedRef::Light(LightId::next()))
            .unwrap();
        assert!(wrapper.model().is_some());
    }

    #[test]
    fn unregister_disables_kind() {
        let mut registry = WrapperRegistry::default();
        registry.unregister(ObjectKind::Presentable);
        assert!(registry
            .create(ObjectKind::Presentable, WrappedRef::Presentable(NodeId::next()))
            .is_none());
    }
}
