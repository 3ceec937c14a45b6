//! Planes, poses and intersection tests shared by the projector and the mirror cameras.
//!
//! All maths here runs in a right-handed world with +Y up. Cameras look down
//! their local -Z axis and project into OpenGL clip space (depth in [-1, 1]).

use glam::{Mat3, Mat4, Quat, Vec3, Vec4};

/// Remaps OpenGL clip depth [-1, 1] into wgpu's [0, 1] (z' = 0.5z + 0.5w).
///
/// Applied only when uploading matrices to the GPU. Because the new depth is a
/// positive multiple of z + w, an oblique near plane survives the remap.
pub const GL_TO_WGPU_DEPTH: Mat4 = Mat4::from_cols(
    Vec4::new(1.0, 0.0, 0.0, 0.0),
    Vec4::new(0.0, 1.0, 0.0, 0.0),
    Vec4::new(0.0, 0.0, 0.5, 0.0),
    Vec4::new(0.0, 0.0, 0.5, 1.0),
);

/// Plane in `Ax + By + Cz + D = 0` form with a unit normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub d: f32,
}

impl Plane {
    /// Build a plane through `point` with the given (not necessarily unit) normal.
    pub fn from_point_normal(point: Vec3, normal: Vec3) -> Self {
        let normal = normal.normalize();
        Self {
            normal,
            d: -normal.dot(point),
        }
    }

    /// Horizontal plane `y = height` facing up.
    pub fn horizontal(height: f32) -> Self {
        Self {
            normal: Vec3::Y,
            d: -height,
        }
    }

    /// Same plane with the normal pointing the other way.
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            d: -self.d,
        }
    }

    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.d
    }

    /// Plane coefficients `(A, B, C, D)`.
    pub fn to_vec4(&self) -> Vec4 {
        self.normal.extend(self.d)
    }
}

/// Outcome of a ray or segment test against a plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intersection {
    /// The ray/segment crosses the plane at this point.
    Hit(Vec3),
    /// Direction is (nearly) parallel to the plane.
    Parallel,
    /// Not parallel, but the crossing lies outside the accepted parameter range.
    Outside,
}

impl Intersection {
    pub fn point(self) -> Option<Vec3> {
        match self {
            Intersection::Hit(p) => Some(p),
            Intersection::Parallel | Intersection::Outside => None,
        }
    }
}

/// Intersect segment `a -> b` with a plane.
///
/// Accepts crossings with parameter `t` in `(0, 1]`, so a segment that starts
/// exactly on the plane does not report its own start point.
pub fn segment_plane(a: Vec3, b: Vec3, plane: &Plane, epsilon: f32) -> Intersection {
    let ab = b - a;
    let denominator = plane.normal.dot(ab);
    if denominator.abs() < epsilon {
        return Intersection::Parallel;
    }

    let t = -plane.signed_distance(a) / denominator;
    if t > 0.0 && t <= 1.0 {
        Intersection::Hit(a + ab * t)
    } else {
        Intersection::Outside
    }
}

/// Intersect a ray with a plane, counting only rays travelling along the plane normal.
///
/// `direction · normal` must exceed `epsilon`; smaller magnitudes are
/// `Parallel`, negative values (ray heading away from the normal side) are
/// `Outside`.
pub fn ray_plane_facing(origin: Vec3, direction: Vec3, plane: &Plane, epsilon: f32) -> Intersection {
    let denominator = direction.dot(plane.normal);
    if denominator > epsilon {
        let t = -plane.signed_distance(origin) / denominator;
        Intersection::Hit(origin + direction * t)
    } else if denominator.abs() <= epsilon {
        Intersection::Parallel
    } else {
        Intersection::Outside
    }
}

/// Sign of `value`, with zero mapping to zero (unlike `f32::signum`).
pub fn sign_or_zero(value: f32) -> f32 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// World position + orientation of a camera-like entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Pose {
    /// Right-handed look-at pose from `eye` toward `target`.
    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        Self::look_to(eye, target - eye, up)
    }

    /// Right-handed look-to pose. When `forward` is parallel to `up` a
    /// perpendicular up vector is substituted so the basis stays finite.
    pub fn look_to(eye: Vec3, forward: Vec3, up: Vec3) -> Self {
        let back = -forward.normalize();
        let mut right = up.cross(back);
        if right.length_squared() < 1e-10 {
            let fallback = if back.z.abs() < 0.9 { Vec3::Z } else { Vec3::X };
            right = fallback.cross(back);
        }
        let right = right.normalize();
        let true_up = back.cross(right);

        Self {
            position: eye,
            rotation: Quat::from_mat3(&Mat3::from_cols(right, true_up, back)),
        }
    }

    /// Direction the camera looks along (local -Z).
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// World-to-camera matrix.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_quat(self.rotation.inverse()) * Mat4::from_translation(-self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn assert_vec3_near(a: Vec3, b: Vec3) {
        assert!((a - b).length() < EPS, "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_plane_from_point_normal() {
        let plane = Plane::from_point_normal(Vec3::new(0.0, 3.0, 0.0), Vec3::new(0.0, 2.0, 0.0));
        assert_vec3_near(plane.normal, Vec3::Y);
        assert!((plane.d + 3.0).abs() < EPS);
        assert!(plane.signed_distance(Vec3::new(5.0, 4.0, -2.0)) > 0.0);
        assert!((plane.flipped().signed_distance(Vec3::new(0.0, 4.0, 0.0)) + 1.0).abs() < EPS);
    }

    #[test]
    fn test_segment_plane_hit_and_range() {
        let plane = Plane::horizontal(5.0);
        let hit = segment_plane(Vec3::new(0.0, 10.0, 0.0), Vec3::new(0.0, 0.0, 10.0), &plane, 1e-6);
        assert_vec3_near(hit.point().unwrap(), Vec3::new(0.0, 5.0, 5.0));

        // Crossing beyond the end of the segment
        let miss = segment_plane(Vec3::new(0.0, 10.0, 0.0), Vec3::new(0.0, 8.0, 0.0), &plane, 1e-6);
        assert_eq!(miss, Intersection::Outside);

        // Starting on the plane is excluded (t = 0)
        let start = segment_plane(Vec3::new(0.0, 5.0, 0.0), Vec3::new(0.0, 0.0, 0.0), &plane, 1e-6);
        assert_eq!(start, Intersection::Outside);
    }

    #[test]
    fn test_segment_parallel_to_plane() {
        let plane = Plane::horizontal(0.0);
        let result = segment_plane(Vec3::new(0.0, 1.0, 0.0), Vec3::new(10.0, 1.0, 3.0), &plane, 1e-6);
        assert_eq!(result, Intersection::Parallel);
    }

    #[test]
    fn test_ray_plane_facing() {
        let down = Plane::horizontal(0.0).flipped();
        let origin = Vec3::new(0.0, 10.0, -20.0);

        let hit = ray_plane_facing(origin, Vec3::new(0.0, -1.0, 2.0), &down, 1e-5);
        assert_vec3_near(hit.point().unwrap(), Vec3::new(0.0, 0.0, 0.0));

        let level = ray_plane_facing(origin, Vec3::Z, &down, 1e-5);
        assert_eq!(level, Intersection::Parallel);

        let away = ray_plane_facing(origin, Vec3::Y, &down, 1e-5);
        assert_eq!(away, Intersection::Outside);
    }

    #[test]
    fn test_sign_or_zero() {
        assert_eq!(sign_or_zero(3.5), 1.0);
        assert_eq!(sign_or_zero(-0.1), -1.0);
        assert_eq!(sign_or_zero(0.0), 0.0);
    }

    #[test]
    fn test_pose_matches_glam_look_at() {
        let eye = Vec3::new(3.0, 20.0, -7.0);
        let target = Vec3::new(-4.0, 0.0, 30.0);
        let pose = Pose::look_at(eye, target, Vec3::Y);
        let expected = Mat4::look_at_rh(eye, target, Vec3::Y);

        let ours = pose.view_matrix().to_cols_array();
        for (a, b) in ours.iter().zip(expected.to_cols_array().iter()) {
            assert!((a - b).abs() < 1e-3, "{} != {}", a, b);
        }
        assert_vec3_near(pose.forward(), (target - eye).normalize());
    }

    #[test]
    fn test_pose_looking_straight_up_stays_finite() {
        let pose = Pose::look_at(Vec3::new(0.0, 10.0, 0.0), Vec3::new(0.0, 20.0, 0.0), Vec3::Y);
        assert_vec3_near(pose.forward(), Vec3::Y);
        assert!(pose.view_matrix().is_finite());
        assert!(pose.up().dot(pose.forward()).abs() < EPS);
    }

    #[test]
    fn test_depth_remap() {
        let near = GL_TO_WGPU_DEPTH * Vec4::new(0.3, 0.2, -2.0, 2.0);
        let far = GL_TO_WGPU_DEPTH * Vec4::new(0.3, 0.2, 2.0, 2.0);
        assert!((near.z / near.w).abs() < EPS);
        assert!((far.z / far.w - 1.0).abs() < EPS);
        assert_eq!(near.x, 0.3);
    }
}
