//! Projected-grid projector.
//!
//! Fits a unit-square grid to the part of the water plane the view camera can
//! see. Each frame the projector:
//! 1. aims a virtual camera that looks down at the water from a safe height,
//! 2. finds the projector-space bounds of the visible water (the range matrix),
//! 3. maps the four unit-square corners back onto the water plane in
//!    homogeneous space, giving the rows of the interpolation matrix.
//!
//! The vertex stage interpolates those rows bilinearly by the grid UV and
//! divides by w, so every grid vertex lands on the water plane, including
//! vertices at the horizon where w approaches zero.

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::camera::Camera;
use crate::geometry::{segment_plane, Intersection, Plane, Pose};
use crate::params::ProjectorParams;

/// Unit-square corners in the order the interpolation rows are stored.
const QUAD: [Vec2; 4] = [
    Vec2::new(0.0, 0.0),
    Vec2::new(1.0, 0.0),
    Vec2::new(1.0, 1.0),
    Vec2::new(0.0, 1.0),
];

/// Corners of the clip-space frustum cube (near face, then far face).
const FRUSTUM_CORNERS: [Vec4; 8] = [
    Vec4::new(-1.0, -1.0, -1.0, 1.0),
    Vec4::new(1.0, -1.0, -1.0, 1.0),
    Vec4::new(1.0, 1.0, -1.0, 1.0),
    Vec4::new(-1.0, 1.0, -1.0, 1.0),
    Vec4::new(-1.0, -1.0, 1.0, 1.0),
    Vec4::new(1.0, -1.0, 1.0, 1.0),
    Vec4::new(1.0, 1.0, 1.0, 1.0),
    Vec4::new(-1.0, 1.0, 1.0, 1.0),
];

/// The 12 edges of the frustum cube as corner index pairs.
const FRUSTUM_EDGES: [(usize, usize); 12] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 0),
    (4, 5),
    (5, 6),
    (6, 7),
    (7, 4),
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];

/// Where a homogeneous corner segment meets the water plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HomogeneousHit {
    Hit(Vec4),
    /// The segment runs parallel to the water plane.
    Parallel,
}

/// Eye and look-at target chosen for the projector's virtual camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectorAim {
    pub eye: Vec3,
    pub target: Vec3,
}

/// Projector-space (post-divide) bounds of the visible water footprint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipRange {
    pub min: Vec2,
    pub max: Vec2,
}

impl ClipRange {
    /// Affine map taking the unit square onto `[min, max]` in x and y.
    pub fn to_matrix(&self) -> Mat4 {
        let scale = self.max - self.min;
        Mat4::from_cols(
            Vec4::new(scale.x, 0.0, 0.0, 0.0),
            Vec4::new(0.0, scale.y, 0.0, 0.0),
            Vec4::Z,
            Vec4::new(self.min.x, self.min.y, 0.0, 1.0),
        )
    }
}

/// Projected-grid projector state, recomputed by [`Projector::update`].
#[derive(Debug, Clone)]
pub struct Projector {
    params: ProjectorParams,
    projector_p: Mat4,
    projector_v: Mat4,
    projector_r: Mat4,
    projector_i: Mat4,
    range: Option<ClipRange>,
    degenerate_corners: usize,
}

impl Projector {
    pub fn new(params: ProjectorParams) -> Self {
        Self {
            params,
            projector_p: Mat4::IDENTITY,
            projector_v: Mat4::IDENTITY,
            projector_r: Mat4::IDENTITY,
            projector_i: Mat4::IDENTITY,
            range: None,
            degenerate_corners: 0,
        }
    }

    pub fn params(&self) -> &ProjectorParams {
        &self.params
    }

    /// Recompute every projector matrix for the current camera.
    pub fn update(&mut self, camera: &Camera) {
        let aim = self.aim(camera);
        self.projector_p = camera.projection;
        self.projector_v = Pose::look_at(aim.eye, aim.target, Vec3::Y).view_matrix();

        let view_proj = self.view_proj();

        let range = self.visible_range(camera, view_proj);
        if range.is_some() != self.range.is_some() {
            log::debug!(
                "Water plane {} view",
                if range.is_some() { "entered" } else { "left" }
            );
        }
        self.range = range;
        self.projector_r = range.map_or(Mat4::IDENTITY, |r| r.to_matrix());

        let ivp = view_proj.inverse() * self.projector_r;

        let mut degenerate = 0;
        let rows = QUAD.map(|corner| match self.h_project(ivp, corner) {
            HomogeneousHit::Hit(p) => p,
            HomogeneousHit::Parallel => {
                // Far point of the corner ray: on (or near) the plane at infinity
                degenerate += 1;
                ivp * Vec4::new(corner.x, corner.y, 1.0, 1.0)
            }
        });
        if degenerate > 0 && self.degenerate_corners == 0 {
            log::debug!("{} projector corner ray(s) parallel to the water", degenerate);
        }
        self.degenerate_corners = degenerate;

        self.projector_i = Mat4::from_cols(rows[0], rows[1], rows[2], rows[3]).transpose();
    }

    /// Choose the projector's eye and target for `camera`.
    ///
    /// The eye follows the camera but never drops below the displacement band
    /// plus `aim_height_offset`; the target sits `aim_distance` along the
    /// camera forward, pinned to the water level.
    pub fn aim(&self, camera: &Camera) -> ProjectorAim {
        let p = &self.params;
        let mut eye = camera.position();
        eye.y = eye
            .y
            .max(p.water_level)
            .max(p.water_level + p.displacement_range + p.aim_height_offset);

        let mut target = eye + camera.forward() * p.aim_distance;
        target.y = p.water_level;

        ProjectorAim { eye, target }
    }

    /// Projector-space bounds of the water visible to `camera`, or `None` when
    /// no part of the displacement band is inside its frustum.
    pub fn visible_range(&self, camera: &Camera, projector_view_proj: Mat4) -> Option<ClipRange> {
        let p = &self.params;
        let upper = p.water_level + p.displacement_range;
        let lower = p.water_level - p.displacement_range;

        let inverse_view_proj = camera.view_proj().inverse();
        let corners = FRUSTUM_CORNERS.map(|c| {
            let world = inverse_view_proj * c;
            world.truncate() / world.w
        });

        let mut points: Vec<Vec3> = corners
            .iter()
            .copied()
            .filter(|c| c.y >= lower && c.y <= upper)
            .collect();

        let band = [Plane::horizontal(upper), Plane::horizontal(lower)];
        for &(i, j) in FRUSTUM_EDGES.iter() {
            for plane in &band {
                if let Intersection::Hit(point) =
                    segment_plane(corners[i], corners[j], plane, p.parallel_epsilon)
                {
                    points.push(point);
                }
            }
        }

        if points.is_empty() {
            return None;
        }

        let mut min = Vec2::splat(f32::INFINITY);
        let mut max = Vec2::splat(f32::NEG_INFINITY);
        for point in points {
            let q = projector_view_proj * Vec4::new(point.x, p.water_level, point.z, 1.0);
            let screen = Vec2::new(q.x, q.y) / q.w;
            min = min.min(screen);
            max = max.max(screen);
        }

        Some(ClipRange { min, max })
    }

    /// Intersect the corner's near→far segment with the water plane in
    /// homogeneous space.
    pub fn h_project(&self, ivp: Mat4, corner: Vec2) -> HomogeneousHit {
        let a = ivp * Vec4::new(corner.x, corner.y, -1.0, 1.0);
        let b = ivp * Vec4::new(corner.x, corner.y, 1.0, 1.0);
        let h = self.params.water_level;
        let ab = b - a;

        let denominator = ab.y - ab.w * h;
        if denominator.abs() < self.params.parallel_epsilon {
            return HomogeneousHit::Parallel;
        }

        let t = (a.w * h - a.y) / denominator;
        HomogeneousHit::Hit(a + ab * t)
    }

    /// World position of the grid vertex at `uv`, evaluated exactly as the
    /// vertex stage does. `None` when the interpolated point is at infinity.
    pub fn grid_point(&self, uv: Vec2) -> Option<Vec3> {
        let row = |i: usize| self.projector_i.row(i);
        let bottom = row(0).lerp(row(1), uv.x);
        let top = row(3).lerp(row(2), uv.x);
        let p = bottom.lerp(top, uv.y);

        if p.w.abs() <= f32::EPSILON {
            return None;
        }
        Some(p.truncate() / p.w)
    }

    pub fn projection(&self) -> Mat4 {
        self.projector_p
    }

    pub fn view(&self) -> Mat4 {
        self.projector_v
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projector_p * self.projector_v
    }

    pub fn range_matrix(&self) -> Mat4 {
        self.projector_r
    }

    /// Interpolation matrix: row `k` is the homogeneous world position of unit-square corner `k`
    pub fn interpolation(&self) -> Mat4 {
        self.projector_i
    }

    /// Visible range from the last update (`None` when the water was out of view)
    pub fn range(&self) -> Option<ClipRange> {
        self.range
    }

    /// Corners whose ray ran parallel to the water in the last update
    pub fn degenerate_corners(&self) -> usize {
        self.degenerate_corners
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::RenderConfig;

    fn camera_at(eye: Vec3, target: Vec3, up: Vec3) -> Camera {
        let config = RenderConfig {
            window_width: 1600,
            window_height: 900,
            fov_degrees: 60.0,
            near_plane_m: 0.3,
            far_plane_m: 1000.0,
        };
        Camera::perspective(Pose::look_at(eye, target, up), &config)
    }

    fn assert_near(a: Vec3, b: Vec3, tolerance: f32) {
        let scale = a.length().max(b.length()).max(1.0);
        assert!(
            (a - b).length() <= tolerance * scale,
            "{:?} != {:?}",
            a,
            b
        );
    }

    /// Independent ray/plane intersection in euclidean space for a projector clip xy
    fn euclidean_corner(view_proj: Mat4, clip: Vec2, level: f32) -> Vec3 {
        let inverse = view_proj.inverse();
        let near = inverse * Vec4::new(clip.x, clip.y, -1.0, 1.0);
        let far = inverse * Vec4::new(clip.x, clip.y, 1.0, 1.0);
        let near = near.truncate() / near.w;
        let far = far.truncate() / far.w;
        let dir = far - near;
        let t = (level - near.y) / dir.y;
        near + dir * t
    }

    #[test]
    fn test_aim_clamps_eye_above_band() {
        let projector = Projector::new(ProjectorParams::default());
        let camera = camera_at(Vec3::new(0.0, 50.0, -50.0), Vec3::ZERO, Vec3::Y);
        let aim = projector.aim(&camera);

        assert!(aim.eye.y >= 0.0 + 5.0 + 40.0);
        assert_eq!(aim.target.y, 0.0);

        let expected = aim.eye + camera.forward() * 50.0;
        assert!((aim.target.x - expected.x).abs() < 1e-4);
        assert!((aim.target.z - expected.z).abs() < 1e-4);
    }

    #[test]
    fn test_aim_lifts_low_camera() {
        let projector = Projector::new(ProjectorParams::default());
        let camera = camera_at(Vec3::new(3.0, 2.0, 7.0), Vec3::new(3.0, 0.0, 100.0), Vec3::Y);
        let aim = projector.aim(&camera);

        assert_eq!(aim.eye.y, 45.0);
        assert_eq!(aim.eye.x, 3.0);
        assert_eq!(aim.eye.z, 7.0);
        assert!(aim.target.z > aim.eye.z);
    }

    #[test]
    fn test_water_out_of_view_gives_identity_range() {
        let mut projector = Projector::new(ProjectorParams::default());
        let camera = camera_at(Vec3::new(0.0, 10.0, 0.0), Vec3::new(0.0, 20.0, 0.0), Vec3::Y);
        projector.update(&camera);

        assert!(projector.range().is_none());
        assert_eq!(projector.range_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn test_range_matrix_maps_unit_square() {
        let range = ClipRange {
            min: Vec2::new(-0.5, -0.8),
            max: Vec2::new(0.7, 0.2),
        };
        let m = range.to_matrix();
        let lo = m * Vec4::new(0.0, 0.0, 0.3, 1.0);
        let hi = m * Vec4::new(1.0, 1.0, -0.4, 1.0);
        assert!((lo - Vec4::new(-0.5, -0.8, 0.3, 1.0)).length() < 1e-6);
        assert!((hi - Vec4::new(0.7, 0.2, -0.4, 1.0)).length() < 1e-6);
    }

    #[test]
    fn test_interpolation_rows_match_ray_plane_intersections() {
        let views = [
            (Vec3::new(0.0, 30.0, -50.0), Vec3::new(0.0, 0.0, 50.0)),
            (Vec3::new(10.0, 80.0, 0.0), Vec3::new(40.0, 0.0, 60.0)),
            (Vec3::new(-5.0, 12.0, 3.0), Vec3::new(-30.0, 2.0, -80.0)),
        ];

        for (eye, target) in views {
            let mut projector = Projector::new(ProjectorParams::default());
            let camera = camera_at(eye, target, Vec3::Y);
            projector.update(&camera);

            let range = projector.range().expect("water should be visible");
            assert_eq!(projector.degenerate_corners(), 0);

            for (k, corner) in QUAD.iter().enumerate() {
                let row = projector.interpolation().row(k);
                let world = row.truncate() / row.w;

                let clip = range.min + *corner * (range.max - range.min);
                let expected = euclidean_corner(projector.view_proj(), clip, 0.0);

                assert!(world.y.abs() < 1e-3 * world.length().max(1.0));
                assert_near(world, expected, 1e-2);
            }
        }
    }

    #[test]
    fn test_h_project_round_trip() {
        let mut projector = Projector::new(ProjectorParams::default());
        let camera = camera_at(Vec3::new(0.0, 50.0, -50.0), Vec3::ZERO, Vec3::Y);
        projector.update(&camera);

        let back = projector.range_matrix().inverse() * projector.view_proj();
        for (k, corner) in QUAD.iter().enumerate() {
            let clip = back * projector.interpolation().row(k);
            let uv = Vec2::new(clip.x, clip.y) / clip.w;
            assert!((uv - *corner).length() < 1e-3, "corner {}: {:?}", k, uv);
        }
    }

    #[test]
    fn test_h_project_parallel_segment() {
        let projector = Projector::new(ProjectorParams::default());

        // Identity maps both segment ends to the same height: parallel to y = 0
        let hit = projector.h_project(Mat4::IDENTITY, Vec2::new(0.5, 0.5));
        assert_eq!(hit, HomogeneousHit::Parallel);
    }

    #[test]
    fn test_parallel_corners_store_far_points() {
        // Every segment counts as parallel, so the range is empty and each
        // corner falls back to the far end of its projector ray
        let params = ProjectorParams {
            parallel_epsilon: f32::MAX,
            ..Default::default()
        };
        let mut projector = Projector::new(params);
        let camera = camera_at(Vec3::new(0.0, 50.0, -50.0), Vec3::ZERO, Vec3::Y);
        projector.update(&camera);

        assert!(projector.range().is_none());
        assert_eq!(projector.degenerate_corners(), 4);

        let inverse = projector.view_proj().inverse();
        for (k, corner) in QUAD.iter().enumerate() {
            let far = inverse * Vec4::new(corner.x, corner.y, 1.0, 1.0);
            let row = projector.interpolation().row(k);
            assert!((row - far).length() <= 1e-5 * far.length().max(1.0), "corner {}", k);
        }
    }

    #[test]
    fn test_grid_points_lie_on_water() {
        let params = ProjectorParams {
            water_level: 2.5,
            ..Default::default()
        };
        let mut projector = Projector::new(params);
        let camera = camera_at(Vec3::new(4.0, 25.0, -10.0), Vec3::new(4.0, 0.0, 60.0), Vec3::Y);
        projector.update(&camera);

        for &(u, v) in &[(0.0, 0.0), (0.5, 0.5), (0.25, 0.9), (1.0, 1.0)] {
            let p = projector.grid_point(Vec2::new(u, v)).unwrap();
            assert!((p.y - 2.5).abs() < 1e-2, "{:?}", p);
        }

        let corner = projector.grid_point(Vec2::new(1.0, 0.0)).unwrap();
        let row = projector.interpolation().row(1);
        assert_near(corner, row.truncate() / row.w, 1e-5);
    }

    #[test]
    fn test_visible_footprint_covers_camera_view() {
        let mut projector = Projector::new(ProjectorParams::default());
        let camera = camera_at(Vec3::new(0.0, 30.0, -50.0), Vec3::new(0.0, 0.0, 50.0), Vec3::Y);
        projector.update(&camera);

        // The point the camera looks at must fall inside the grid footprint
        let range = projector.range().unwrap();
        let q = projector.view_proj() * Vec4::new(0.0, 0.0, 50.0, 1.0);
        let screen = Vec2::new(q.x, q.y) / q.w;
        assert!(screen.x >= range.min.x && screen.x <= range.max.x);
        assert!(screen.y >= range.min.y && screen.y <= range.max.y);
    }
}
