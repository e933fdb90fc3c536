//! What a scene node carries besides its transform and children.

use crate::math::{Quat, Vec3};

use super::types::Transform;

/// A positional sound emitter.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSource {
    pub clip: String,
    pub position: Vec3,
    pub direction: Vec3,
    pub volume: f32,
    pub directional: bool,
}

impl AudioSource {
    pub fn new(clip: impl Into<String>, position: Vec3) -> Self {
        Self {
            clip: clip.into(),
            position,
            direction: Vec3::new(0.0, 0.0, 1.0),
            volume: 1.0,
            directional: false,
        }
    }

    #[must_use]
    pub fn with_direction(mut self, direction: Vec3) -> Self {
        if let Some(d) = direction.try_normalize(f32::EPSILON) {
            self.direction = d;
            self.directional = true;
        }
        self
    }
}

/// An editor-only positional object with no geometry of its own (spawn
/// points, trigger volumes, markers).
#[derive(Debug, Clone, PartialEq)]
pub struct Presentable {
    pub label: String,
    pub location: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Presentable {
    pub fn new(label: impl Into<String>, location: Vec3) -> Self {
        Self {
            label: label.into(),
            location,
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn transform(&self) -> Transform {
        Transform {
            translation: self.location,
            rotation: self.rotation,
            scale: self.scale,
        }
    }
}

/// Node payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum NodePayload {
    #[default]
    Empty,
    Geometry {
        mesh: String,
    },
    Audio(AudioSource),
    Presentable(Presentable),
}
