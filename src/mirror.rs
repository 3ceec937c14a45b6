//! Planar mirror cameras for water reflection and refraction.
//!
//! A [`MirrorPlane`] owns two cameras bound to their own square render
//! targets. The reflection camera sits at the player position mirrored through
//! the water plane; the refraction camera shares the player pose. Both use an
//! oblique projection whose near plane is the water plane, so nothing on the
//! wrong side of the surface ends up in their targets.

use glam::{Mat4, Vec3, Vec4};

use crate::camera::Camera;
use crate::geometry::{ray_plane_facing, sign_or_zero, Intersection, Plane, Pose};
use crate::params::MirrorParams;

/// Texture formats and size requested for each mirror target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTargetDesc {
    /// Side length (pixels)
    pub size: u32,
    pub color_format: wgpu::TextureFormat,
    pub depth_format: wgpu::TextureFormat,
}

impl RenderTargetDesc {
    /// Square target with an sRGB RGBA8 color buffer and 32-bit float depth
    pub fn square(size: u32) -> Self {
        Self {
            size,
            color_format: wgpu::TextureFormat::Rgba8UnormSrgb,
            depth_format: wgpu::TextureFormat::Depth32Float,
        }
    }
}

/// Creates the offscreen targets the mirror cameras render into.
///
/// The mirror plane requests its targets once at construction and keeps them
/// until it is dropped.
pub trait RenderTargetAllocator {
    type Target;

    fn allocate_target(&mut self, label: &str, desc: &RenderTargetDesc) -> Self::Target;
}

/// Result of re-aiming the reflection camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReflectionAim {
    /// The player looks down at the water: new reflection pose
    Updated(Pose),
    /// The player looks level or up: position moved, orientation kept
    Unchanged,
}

/// One mirror camera and the target it renders into
#[derive(Debug)]
pub struct MirrorCamera<T> {
    pose: Pose,
    projection: Mat4,
    target: T,
}

impl<T> MirrorCamera<T> {
    fn new(pose: Pose, projection: Mat4, target: T) -> Self {
        Self {
            pose,
            projection,
            target,
        }
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Oblique projection (OpenGL clip space)
    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.pose.view_matrix()
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection * self.view_matrix()
    }
}

/// Water plane with its reflection and refraction cameras
#[derive(Debug)]
pub struct MirrorPlane<T> {
    params: MirrorParams,
    plane: Plane,
    reflection: MirrorCamera<T>,
    refraction: MirrorCamera<T>,
    /// Whether the last reflection aim succeeded
    aimed: bool,
}

impl<T> MirrorPlane<T> {
    /// Allocate both targets and place the cameras for `camera`
    pub fn new<A>(params: MirrorParams, camera: &Camera, allocator: &mut A) -> Self
    where
        A: RenderTargetAllocator<Target = T>,
    {
        let desc = RenderTargetDesc::square(params.target_size);
        let reflection_target = allocator.allocate_target("Reflection Target", &desc);
        let refraction_target = allocator.allocate_target("Refraction Target", &desc);

        let plane = Plane::from_point_normal(
            Vec3::from_array(params.plane_point),
            Vec3::from_array(params.plane_normal),
        );

        let mut mirror = Self {
            params,
            plane,
            reflection: MirrorCamera::new(camera.pose, camera.projection, reflection_target),
            refraction: MirrorCamera::new(camera.pose, camera.projection, refraction_target),
            aimed: true,
        };
        mirror.update(camera);
        mirror
    }

    /// Re-place both cameras for the current player camera
    pub fn update(&mut self, camera: &Camera) -> ReflectionAim {
        let aim = self.update_reflection(camera);
        self.update_refraction(camera);
        aim
    }

    fn update_reflection(&mut self, camera: &Camera) -> ReflectionAim {
        let position = reflection_matrix(&self.plane).transform_point3(camera.position());

        let aim = aim_reflection(
            position,
            camera.position(),
            camera.forward(),
            &self.plane,
            self.params.aim_epsilon,
        );
        match aim {
            ReflectionAim::Updated(pose) => self.reflection.pose = pose,
            ReflectionAim::Unchanged => self.reflection.pose.position = position,
        }

        let aimed = matches!(aim, ReflectionAim::Updated(_));
        if aimed != self.aimed {
            log::debug!(
                "Reflection camera aim {}",
                if aimed { "regained" } else { "lost, keeping orientation" }
            );
            self.aimed = aimed;
        }

        let clip = camera_space_plane(
            self.reflection.view_matrix(),
            self.point(),
            self.plane.normal,
            self.params.clip_plane_offset,
            1.0,
        );
        self.reflection.projection = oblique_projection(camera.projection, clip);

        aim
    }

    fn update_refraction(&mut self, camera: &Camera) {
        self.refraction.pose = camera.pose;

        let clip = camera_space_plane(
            self.refraction.view_matrix(),
            self.point(),
            -self.plane.normal,
            self.params.clip_plane_offset,
            1.0,
        );
        self.refraction.projection = oblique_projection(camera.projection, clip);
    }

    fn point(&self) -> Vec3 {
        Vec3::from_array(self.params.plane_point)
    }

    pub fn reflection(&self) -> &MirrorCamera<T> {
        &self.reflection
    }

    pub fn refraction(&self) -> &MirrorCamera<T> {
        &self.refraction
    }
}

/// Aim the reflection camera at the point where the player's view ray meets
/// the water. Only rays heading into the water (along `-normal`) count.
fn aim_reflection(
    reflected_position: Vec3,
    player_position: Vec3,
    player_forward: Vec3,
    plane: &Plane,
    epsilon: f32,
) -> ReflectionAim {
    match ray_plane_facing(player_position, player_forward, &plane.flipped(), epsilon) {
        Intersection::Hit(point) => {
            ReflectionAim::Updated(Pose::look_at(reflected_position, point, -plane.normal))
        }
        Intersection::Parallel | Intersection::Outside => ReflectionAim::Unchanged,
    }
}

/// Householder reflection through `plane` (unit normal, offset in the translation column).
pub fn reflection_matrix(plane: &Plane) -> Mat4 {
    let Vec3 { x: a, y: b, z: c } = plane.normal;
    let d = plane.d;

    Mat4::from_cols(
        Vec4::new(1.0 - 2.0 * a * a, -2.0 * a * b, -2.0 * a * c, 0.0),
        Vec4::new(-2.0 * a * b, 1.0 - 2.0 * b * b, -2.0 * b * c, 0.0),
        Vec4::new(-2.0 * a * c, -2.0 * b * c, 1.0 - 2.0 * c * c, 0.0),
        Vec4::new(-2.0 * d * a, -2.0 * d * b, -2.0 * d * c, 1.0),
    )
}

/// Clip plane `(n, -p·n)` in camera space for a world plane through `point`.
///
/// The point is pushed `offset` along `normal` first. Points on the side
/// `normal * side` points to are kept.
pub fn camera_space_plane(view: Mat4, point: Vec3, normal: Vec3, offset: f32, side: f32) -> Vec4 {
    let offset_point = point + normal * offset;
    let camera_point = view.transform_point3(offset_point);
    let camera_normal = view.transform_vector3(normal) * side;

    Plane::from_point_normal(camera_point, camera_normal).to_vec4()
}

/// Replace the near plane of an OpenGL projection with `clip_plane`
/// (camera space), keeping the far plane as tight as possible.
///
/// Only the z row changes, so x, y and w of every projected point stay the same.
pub fn oblique_projection(projection: Mat4, clip_plane: Vec4) -> Mat4 {
    let q = projection.inverse()
        * Vec4::new(
            sign_or_zero(clip_plane.x),
            sign_or_zero(clip_plane.y),
            1.0,
            1.0,
        );
    let c = clip_plane * (2.0 / clip_plane.dot(q));
    let row = c - projection.row(3);

    let mut oblique = projection;
    oblique.x_axis.z = row.x;
    oblique.y_axis.z = row.y;
    oblique.z_axis.z = row.z;
    oblique.w_axis.z = row.w;
    oblique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::RenderConfig;

    const EPS: f32 = 1e-4;

    /// Allocator that hands out labelled ids and counts requests
    #[derive(Default)]
    struct CountingAllocator {
        requests: Vec<(String, RenderTargetDesc)>,
    }

    impl RenderTargetAllocator for CountingAllocator {
        type Target = usize;

        fn allocate_target(&mut self, label: &str, desc: &RenderTargetDesc) -> usize {
            self.requests.push((label.to_string(), *desc));
            self.requests.len() - 1
        }
    }

    fn camera_at(eye: Vec3, target: Vec3) -> Camera {
        Camera::perspective(Pose::look_at(eye, target, Vec3::Y), &RenderConfig::default())
    }

    fn assert_vec3_near(a: Vec3, b: Vec3) {
        assert!((a - b).length() < EPS, "{:?} != {:?}", a, b);
    }

    /// Off-center OpenGL frustum
    fn gl_frustum(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
        Mat4::from_cols(
            Vec4::new(2.0 * near / (right - left), 0.0, 0.0, 0.0),
            Vec4::new(0.0, 2.0 * near / (top - bottom), 0.0, 0.0),
            Vec4::new(
                (right + left) / (right - left),
                (top + bottom) / (top - bottom),
                -(far + near) / (far - near),
                -1.0,
            ),
            Vec4::new(0.0, 0.0, -2.0 * far * near / (far - near), 0.0),
        )
    }

    #[test]
    fn test_reflection_matrix_is_involution() {
        let plane = Plane::from_point_normal(Vec3::new(1.0, 2.0, -3.0), Vec3::new(0.3, 1.0, -0.2));
        let reflect = reflection_matrix(&plane);
        let twice = reflect * reflect;

        for (a, b) in twice
            .to_cols_array()
            .iter()
            .zip(Mat4::IDENTITY.to_cols_array().iter())
        {
            assert!((a - b).abs() < EPS);
        }

        // Points on the plane are fixed
        let on_plane = Vec3::new(1.0, 2.0, -3.0);
        assert_vec3_near(reflect.transform_point3(on_plane), on_plane);
    }

    #[test]
    fn test_level_view_keeps_orientation() {
        let camera = camera_at(Vec3::new(0.0, 10.0, -20.0), Vec3::new(0.0, 10.0, 80.0));
        let mut allocator = CountingAllocator::default();
        let mut mirror = MirrorPlane::new(MirrorParams::default(), &camera, &mut allocator);

        let before = mirror.reflection().pose().rotation;
        let aim = mirror.update(&camera);

        assert_eq!(aim, ReflectionAim::Unchanged);
        assert_vec3_near(mirror.reflection().pose().position, Vec3::new(0.0, -10.0, -20.0));
        assert_eq!(mirror.reflection().pose().rotation, before);
    }

    #[test]
    fn test_reflection_aims_at_view_hit() {
        let camera = camera_at(Vec3::new(0.0, 10.0, -20.0), Vec3::new(0.0, 0.0, 0.0));
        let mut allocator = CountingAllocator::default();
        let mut mirror = MirrorPlane::new(MirrorParams::default(), &camera, &mut allocator);

        let aim = mirror.update(&camera);
        let pose = match aim {
            ReflectionAim::Updated(pose) => pose,
            ReflectionAim::Unchanged => panic!("camera looks at the water"),
        };

        assert_vec3_near(pose.position, Vec3::new(0.0, -10.0, -20.0));
        let expected = (Vec3::ZERO - pose.position).normalize();
        assert_vec3_near(pose.forward(), expected);
        assert_eq!(mirror.reflection().pose(), pose);
        // Upside-down: local up has a negative world y
        assert!(pose.up().y < 0.0);
    }

    #[test]
    fn test_oblique_noop_for_near_plane() {
        let config = RenderConfig::default();
        let projection = Mat4::perspective_rh_gl(
            config.fov_degrees.to_radians(),
            config.aspect_ratio(),
            config.near_plane_m,
            config.far_plane_m,
        );
        let near_plane = Vec4::new(0.0, 0.0, -1.0, -config.near_plane_m);
        let oblique = oblique_projection(projection, near_plane);

        for (a, b) in oblique
            .to_cols_array()
            .iter()
            .zip(projection.to_cols_array().iter())
        {
            assert!((a - b).abs() < 1e-3 * b.abs().max(1.0), "{} != {}", a, b);
        }
    }

    #[test]
    fn test_oblique_maps_clip_plane_to_near() {
        let camera = camera_at(Vec3::new(0.0, 10.0, -20.0), Vec3::new(0.0, 0.0, 10.0));
        let view = camera.view_matrix();
        let clip = camera_space_plane(view, Vec3::ZERO, Vec3::NEG_Y, 0.0, 1.0);
        let oblique = oblique_projection(camera.projection, clip);

        for &p in &[
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::new(-8.0, 0.0, 30.0),
            Vec3::new(5.0, 0.0, 0.0),
        ] {
            let q = oblique * view * p.extend(1.0);
            assert!((q.z + q.w).abs() < 1e-3 * q.w.abs().max(1.0), "{:?}", q);
        }
    }

    #[test]
    fn test_oblique_off_center_projection() {
        let projection = gl_frustum(-0.1, 0.3, -0.25, 0.05, 0.3, 500.0);
        let clip = Vec4::new(0.2, 0.9, -0.3, -2.0).normalize();
        let oblique = oblique_projection(projection, clip);

        for row in [0, 1, 3] {
            assert_eq!(oblique.row(row), projection.row(row));
        }

        // Points on the clip plane land on the new near plane
        let normal = clip.truncate();
        let on_plane = -normal * clip.w / normal.length_squared();
        for offset in [Vec3::ZERO, normal.any_orthogonal_vector() * 3.0] {
            let p = (on_plane + offset).extend(1.0);
            let q = oblique * p;
            assert!((q.z + q.w).abs() < 1e-3 * q.w.abs().max(1.0));
        }
    }

    #[test]
    fn test_reflection_clips_below_water() {
        let camera = camera_at(Vec3::new(0.0, 10.0, -20.0), Vec3::new(0.0, 0.0, 0.0));
        let mut allocator = CountingAllocator::default();
        let mirror = MirrorPlane::new(MirrorParams::default(), &camera, &mut allocator);
        let reflection = mirror.reflection();

        // Above the water, in front of the reflection camera: kept
        let above = reflection.view_proj() * Vec4::new(0.0, 5.0, 10.0, 1.0);
        assert!(above.z >= -above.w);

        // Between the reflection camera and the water: clipped
        let below = reflection.view_proj() * Vec4::new(0.0, -3.0, -12.0, 1.0);
        assert!(below.w > 0.0);
        assert!(below.z < -below.w);
    }

    #[test]
    fn test_refraction_clips_above_water() {
        let camera = camera_at(Vec3::new(0.0, 10.0, -20.0), Vec3::new(0.0, 0.0, 0.0));
        let mut allocator = CountingAllocator::default();
        let mirror = MirrorPlane::new(MirrorParams::default(), &camera, &mut allocator);
        let refraction = mirror.refraction();

        assert_eq!(refraction.pose(), camera.pose);

        let below = refraction.view_proj() * Vec4::new(0.0, -5.0, 10.0, 1.0);
        assert!(below.z >= -below.w);

        let above = refraction.view_proj() * Vec4::new(0.0, 5.0, -10.0, 1.0);
        assert!(above.w > 0.0);
        assert!(above.z < -above.w);
    }

    #[test]
    fn test_targets_allocated_once() {
        let camera = camera_at(Vec3::new(0.0, 10.0, -20.0), Vec3::ZERO);
        let mut allocator = CountingAllocator::default();
        let mut mirror = MirrorPlane::new(MirrorParams::default(), &camera, &mut allocator);
        mirror.update(&camera);
        mirror.update(&camera);

        assert_eq!(allocator.requests.len(), 2);
        assert_eq!(*mirror.reflection().target(), 0);
        assert_eq!(*mirror.refraction().target(), 1);

        let (_, desc) = &allocator.requests[0];
        assert_eq!(*desc, RenderTargetDesc::square(256));
        assert_eq!(desc.color_format, wgpu::TextureFormat::Rgba8UnormSrgb);
        assert_eq!(desc.depth_format, wgpu::TextureFormat::Depth32Float);
    }
}
