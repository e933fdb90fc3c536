//! Math type aliases and helper functions.
//!
//! All editor-side math is `f32`. Rotations are stored as plain
//! [`Quat`] values and wrapped into unit quaternions on demand.

pub use nalgebra;

/// 3D vector (f32).
pub type Vec3 = nalgebra::Vector3<f32>;

/// Quaternion (f32). Stored as `[x, y, z, w]` in memory.
/// Use [`quat_from_xyzw`] or `Quaternion::new(w, x, y, z)` to construct.
pub type Quat = nalgebra::Quaternion<f32>;

/// Tolerance used when deciding whether a transform channel has changed.
///
/// Values closer than this (component-wise) are treated as equal, so
/// sub-epsilon noise from round trips through direction vectors does not
/// flip the wrapper sync direction.
pub const DEFAULT_EPSILON: f32 = 1e-5;

/// The local forward axis. Directions are derived from rotations by
/// rotating this axis.
pub fn forward_axis() -> Vec3 {
    Vec3::new(0.0, 0.0, 1.0)
}

/// The world up axis used for look-rotations.
pub fn up_axis() -> Vec3 {
    Vec3::new(0.0, 1.0, 0.0)
}

/// Create a quaternion from x, y, z, w components.
pub fn quat_from_xyzw(x: f32, y: f32, z: f32, w: f32) -> Quat {
    nalgebra::Quaternion::new(w, x, y, z)
}

/// Create a quaternion from rotation around the X axis.
pub fn quat_from_rotation_x(angle: f32) -> Quat {
    nalgebra::UnitQuaternion::from_axis_angle(&nalgebra::Vector3::x_axis(), angle).into_inner()
}

/// Create a quaternion from rotation around the Y axis.
pub fn quat_from_rotation_y(angle: f32) -> Quat {
    nalgebra::UnitQuaternion::from_axis_angle(&nalgebra::Vector3::y_axis(), angle).into_inner()
}

/// Rotate a vector by a quaternion.
pub fn quat_rotate_vec3(q: Quat, v: Vec3) -> Vec3 {
    nalgebra::UnitQuaternion::new_normalize(q) * v
}

/// Returns the direction a rotation points its forward axis at.
pub fn quat_forward(q: Quat) -> Vec3 {
    quat_rotate_vec3(q, forward_axis())
}

/// Builds the rotation that points the forward axis along `direction`.
///
/// A zero-length direction yields the identity. When `direction` is parallel
/// to `up`, the X axis is used as the up hint instead.
pub fn quat_look_rotation(direction: Vec3, up: Vec3) -> Quat {
    let Some(dir) = direction.try_normalize(f32::EPSILON) else {
        return Quat::identity();
    };
    let up = match up.try_normalize(f32::EPSILON) {
        Some(u) if dir.dot(&u).abs() < 1.0 - DEFAULT_EPSILON => u,
        _ => Vec3::new(1.0, 0.0, 0.0),
    };
    nalgebra::UnitQuaternion::face_towards(&dir, &up).into_inner()
}

/// Component-wise approximate equality for vectors.
pub fn vec3_approx_eq(a: &Vec3, b: &Vec3, epsilon: f32) -> bool {
    (a - b).amax() <= epsilon
}

/// Component-wise approximate equality for rotations.
///
/// Both quaternions are normalized and `q` is matched against `-q` as well,
/// since they describe the same rotation. A component of a unit quaternion
/// moves by about half the rotation angle, so rotations closer than roughly
/// `2 * epsilon` radians compare equal.
pub fn quat_approx_eq(a: &Quat, b: &Quat, epsilon: f32) -> bool {
    let (Some(a), Some(b)) = (
        a.coords.try_normalize(f32::EPSILON),
        b.coords.try_normalize(f32::EPSILON),
    ) else {
        return a == b;
    };
    (a - b).amax() <= epsilon || (a + b).amax() <= epsilon
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn rotation_y_90() {
        let q = quat_from_rotation_y(FRAC_PI_2);
        let v = quat_rotate_vec3(q, Vec3::new(1.0, 0.0, 0.0));
        assert!((v.x - 0.0).abs() < 1e-5);
        assert!((v.z - (-1.0)).abs() < 1e-5);
    }

    #[test]
    fn identity_points_forward() {
        let f = quat_forward(Quat::identity());
        assert!(vec3_approx_eq(&f, &forward_axis(), 1e-6));
    }

    #[test]
    fn look_rotation_points_forward_axis_along_direction() {
        let dir = Vec3::new(1.0, -1.0, 0.5).normalize();
        let q = quat_look_rotation(dir, up_axis());
        assert!(vec3_approx_eq(&quat_forward(q), &dir, 1e-5));
    }

    #[test]
    fn look_rotation_handles_parallel_up() {
        let q = quat_look_rotation(Vec3::new(0.0, -3.0, 0.0), up_axis());
        let f = quat_forward(q);
        assert!(vec3_approx_eq(&f, &Vec3::new(0.0, -1.0, 0.0), 1e-5));
        assert!(f.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn look_rotation_of_zero_is_identity() {
        assert_eq!(quat_look_rotation(Vec3::zeros(), up_axis()), Quat::identity());
    }

    #[test]
    fn vec3_approx_eq_respects_epsilon() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        assert!(vec3_approx_eq(&a, &Vec3::new(1.0, 2.0, 3.000001), DEFAULT_EPSILON));
        assert!(!vec3_approx_eq(&a, &Vec3::new(1.0, 2.0, 3.01), DEFAULT_EPSILON));
    }

    #[test]
    fn quat_approx_eq_treats_negation_as_equal() {
        let q = quat_from_rotation_x(0.7);
        assert!(quat_approx_eq(&q, &-q, DEFAULT_EPSILON));
        assert!(!quat_approx_eq(&q, &quat_from_rotation_x(0.8), DEFAULT_EPSILON));
    }

    #[test]
    fn quat_approx_eq_sees_small_rotations() {
        let q = quat_from_rotation_y(0.3);
        let tenth_degree = 0.1_f32.to_radians();
        assert!(!quat_approx_eq(&q, &quat_from_rotation_y(0.3 + tenth_degree), DEFAULT_EPSILON));
        assert!(quat_approx_eq(&q, &quat_from_rotation_y(0.3 + 1e-6), DEFAULT_EPSILON));
    }

    #[test]
    fn quat_xyzw_component_order() {
        let q = quat_from_xyzw(0.1, 0.2, 0.3, 0.9);
        assert_eq!(q.coords.x, 0.1);
        assert_eq!(q.coords.w, 0.9);
    }
}
