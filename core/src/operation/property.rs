//! Property edits: one value swapped for another through an apply function.

use std::fmt;

use super::command::{Editable, Operation, OperationResult};

/// Function that writes a property value onto the object identified by `K`.
///
/// The same function performs both directions: redo applies the new value,
/// undo applies the old one.
pub type ApplyFn<T, K, V> = fn(&mut T, &K, &V) -> OperationResult;

/// A reversible change of one named property on one target.
///
/// # Example
///
/// ```ignore
/// let op = PropertyOperation::new(
///     light_id,
///     "position",
///     Vec3::new(1.0, 2.0, 3.0),
///     Vec3::zeros(),
///     |scene: &mut Scene, id: &LightId, v: &Vec3| scene.light_mut(*id)?.set_position(*v),
/// );
/// ```
pub struct PropertyOperation<T, K, V> {
    target: K,
    property: String,
    new_value: V,
    old_value: V,
    apply: ApplyFn<T, K, V>,
    mergeable: bool,
    description: String,
}

impl<T, K, V> PropertyOperation<T, K, V> {
    /// Creates a property change of `property` on `target` from `old_value`
    /// to `new_value`.
    pub fn new(
        target: K,
        property: impl Into<String>,
        new_value: V,
        old_value: V,
        apply: ApplyFn<T, K, V>,
    ) -> Self {
        let property = property.into();
        Self {
            description: format!("Change {property}"),
            target,
            property,
            new_value,
            old_value,
            apply,
            mergeable: false,
        }
    }

    /// Allows consecutive changes of the same property on the same target to
    /// collapse into this one (interactive drags).
    #[must_use]
    pub fn mergeable(mut self) -> Self {
        self.mergeable = true;
        self
    }

    /// Overrides the default `"Change <property>"` description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn target(&self) -> &K {
        &self.target
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn new_value(&self) -> &V {
        &self.new_value
    }

    pub fn old_value(&self) -> &V {
        &self.old_value
    }
}

impl<T, K: fmt::Debug, V: fmt::Debug> fmt::Debug for PropertyOperation<T, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyOperation")
            .field("target", &self.target)
            .field("property", &self.property)
            .field("new_value", &self.new_value)
            .field("old_value", &self.old_value)
            .field("mergeable", &self.mergeable)
            .finish()
    }
}

impl<T, K, V> Operation<T> for PropertyOperation<T, K, V>
where
    T: Editable,
    K: fmt::Debug + PartialEq + Send + 'static,
    V: fmt::Debug + Clone + Send + 'static,
{
    fn redo(&mut self, target: &mut T) -> OperationResult {
        (self.apply)(target, &self.target, &self.new_value)
    }

    fn undo(&mut self, target: &mut T) -> OperationResult {
        (self.apply)(target, &self.target, &self.old_value)
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn merge(&mut self, other: Box<dyn Operation<T>>) -> Option<Box<dyn Operation<T>>> {
        if !self.mergeable {
            return Some(other);
        }
        if let Some(next) = (*other).as_any().downcast_ref::<Self>()
            && next.mergeable
            && next.target == self.target
            && next.property == self.property
        {
            self.new_value = next.new_value.clone();
            return None;
        }
        Some(other)
    }
}
