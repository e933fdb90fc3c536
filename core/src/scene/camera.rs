use crate::math::{Quat, Vec3, quat_forward, quat_look_rotation, up_axis};

/// The editor viewport camera.
///
/// Only the pieces the wrapper nodes need are modeled: where the camera is,
/// where it looks and the near clip distance.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub location: Vec3,
    pub rotation: Quat,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(location: Vec3, near: f32, far: f32) -> Self {
        Self {
            location,
            rotation: Quat::identity(),
            near,
            far,
        }
    }

    /// Places the camera at `location` looking at `target`.
    pub fn looking_at(location: Vec3, target: Vec3) -> Self {
        Self {
            rotation: quat_look_rotation(target - location, up_axis()),
            ..Self::new(location, 0.1, 1000.0)
        }
    }

    /// The view direction.
    pub fn direction(&self) -> Vec3 {
        quat_forward(self.rotation)
    }

    /// The camera's up vector.
    pub fn up(&self) -> Vec3 {
        crate::math::quat_rotate_vec3(self.rotation, up_axis())
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::looking_at(Vec3::new(0.0, 5.0, -10.0), Vec3::zeros())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::vec3_approx_eq;

    #[test]
    fn looking_at_faces_target() {
        let cam = Camera::looking_at(Vec3::new(0.0, 0.0, -5.0), Vec3::zeros());
        assert!(vec3_approx_eq(
            &cam.direction(),
            &Vec3::new(0.0, 0.0, 1.0),
            1e-5
        ));
        assert!(vec3_approx_eq(&cam.up(), &Vec3::new(0.0, 1.0, 0.0), 1e-5));
        assert!(cam.near > 0.0);
    }
}
