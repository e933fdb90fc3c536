//! Scene lights.
//!
//! Lights carry only the spatial channels the engine actually stores for
//! them: a directional light has a direction, a point light a position, a
//! spot light both. Ambient lights have neither.

use crate::math::Vec3;

use super::graph::SceneError;

/// Type-specific light data.
#[derive(Debug, Clone, PartialEq)]
pub enum LightKind {
    Ambient,
    Directional {
        direction: Vec3,
    },
    Point {
        position: Vec3,
        radius: f32,
    },
    Spot {
        position: Vec3,
        direction: Vec3,
        range: f32,
        inner_angle: f32,
        outer_angle: f32,
    },
}

/// A light source.
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub name: String,
    pub kind: LightKind,
    pub color: [f32; 3],
    pub enabled: bool,
}

impl Light {
    fn with_kind(name: impl Into<String>, kind: LightKind) -> Self {
        Self {
            name: name.into(),
            kind,
            color: [1.0, 1.0, 1.0],
            enabled: true,
        }
    }

    pub fn ambient(name: impl Into<String>) -> Self {
        Self::with_kind(name, LightKind::Ambient)
    }

    pub fn directional(name: impl Into<String>, direction: Vec3) -> Self {
        Self::with_kind(
            name,
            LightKind::Directional {
                direction: normalized_or_down(direction),
            },
        )
    }

    pub fn point(name: impl Into<String>, position: Vec3, radius: f32) -> Self {
        Self::with_kind(name, LightKind::Point { position, radius })
    }

    pub fn spot(name: impl Into<String>, position: Vec3, direction: Vec3, range: f32) -> Self {
        Self::with_kind(
            name,
            LightKind::Spot {
                position,
                direction: normalized_or_down(direction),
                range,
                inner_angle: std::f32::consts::FRAC_PI_8,
                outer_angle: std::f32::consts::FRAC_PI_4,
            },
        )
    }

    #[must_use]
    pub fn with_color(mut self, color: [f32; 3]) -> Self {
        self.color = color;
        self
    }

    /// The light position, for light kinds that have one.
    pub fn position(&self) -> Option<Vec3> {
        match &self.kind {
            LightKind::Point { position, .. } | LightKind::Spot { position, .. } => Some(*position),
            LightKind::Ambient | LightKind::Directional { .. } => None,
        }
    }

    /// The normalized light direction, for light kinds that have one.
    pub fn direction(&self) -> Option<Vec3> {
        match &self.kind {
            LightKind::Directional { direction } | LightKind::Spot { direction, .. } => {
                Some(*direction)
            }
            LightKind::Ambient | LightKind::Point { .. } => None,
        }
    }

    pub fn set_position(&mut self, value: Vec3) -> Result<(), SceneError> {
        match &mut self.kind {
            LightKind::Point { position, .. } | LightKind::Spot { position, .. } => {
                *position = value;
                Ok(())
            }
            _ => Err(SceneError::UnsupportedChannel {
                object: self.name.clone(),
                channel: "position",
            }),
        }
    }

    /// Sets the direction. The value is normalized; a zero vector is rejected.
    pub fn set_direction(&mut self, value: Vec3) -> Result<(), SceneError> {
        let normalized = value
            .try_normalize(f32::EPSILON)
            .ok_or(SceneError::DegenerateDirection)?;
        match &mut self.kind {
            LightKind::Directional { direction } | LightKind::Spot { direction, .. } => {
                *direction = normalized;
                Ok(())
            }
            _ => Err(SceneError::UnsupportedChannel {
                object: self.name.clone(),
                channel: "direction",
            }),
        }
    }
}

fn normalized_or_down(direction: Vec3) -> Vec3 {
    direction
        .try_normalize(f32::EPSILON)
        .unwrap_or_else(|| Vec3::new(0.0, -1.0, 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channels_per_kind() {
        let point = Light::point("bulb", Vec3::new(1.0, 2.0, 3.0), 10.0);
        assert_eq!(point.position(), Some(Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(point.direction(), None);

        let sun = Light::directional("sun", Vec3::new(0.0, -2.0, 0.0));
        assert_eq!(sun.position(), None);
        assert_eq!(sun.direction(), Some(Vec3::new(0.0, -1.0, 0.0)));

        let spot = Light::spot("spot", Vec3::zeros(), Vec3::new(0.0, 0.0, 5.0), 20.0);
        assert!(spot.position().is_some());
        assert_eq!(spot.direction(), Some(Vec3::new(0.0, 0.0, 1.0)));

        let ambient = Light::ambient("fill");
        assert!(ambient.position().is_none() && ambient.direction().is_none());
    }

    #[test]
    fn setting_missing_channel_fails() {
        let mut sun = Light::directional("sun", Vec3::new(0.0, -1.0, 0.0));
        assert!(matches!(
            sun.set_position(Vec3::zeros()),
            Err(SceneError::UnsupportedChannel { channel: "position", .. })
        ));
    }

    #[test]
    fn direction_is_normalized() {
        let mut spot = Light::spot("spot", Vec3::zeros(), Vec3::new(0.0, -1.0, 0.0), 5.0);
        spot.set_direction(Vec3::new(3.0, 0.0, 0.0)).unwrap();
        assert_eq!(spot.direction(), Some(Vec3::new(1.0, 0.0, 0.0)));
        assert_eq!(
            spot.set_direction(Vec3::zeros()),
            Err(SceneError::DegenerateDirection)
        );
    }

    #[test]
    fn zero_direction_defaults_down() {
        let sun = Light::directional("sun", Vec3::zeros());
        assert_eq!(sun.direction(), Some(Vec3::new(0.0, -1.0, 0.0)));
    }
}
