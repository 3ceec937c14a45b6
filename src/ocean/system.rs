//! High-level ocean system: projector, mirrors and wave scrolling, assembled per frame.

use glam::{Vec2, Vec3};

use super::mesh::ProjectedGrid;
use crate::camera::Camera;
use crate::mirror::{MirrorPlane, ReflectionAim, RenderTargetAllocator};
use crate::params::OceanParams;
use crate::projector::Projector;
use crate::shading::ShaderParams;

/// Output of one ocean update, handed to the renderer
#[derive(Debug, Clone, Copy)]
pub struct OceanFrame {
    pub shader: ShaderParams,
    pub reflection_aim: ReflectionAim,
    /// False when no part of the water band is inside the camera frustum
    pub water_visible: bool,
}

/// Ocean surface driven by the view camera
pub struct OceanSystem<T> {
    pub grid: ProjectedGrid,
    params: OceanParams,
    projector: Projector,
    mirror: MirrorPlane<T>,
    displacement_offset: Vec2,
}

impl<T> OceanSystem<T> {
    /// Create the ocean; the mirror targets are requested from `allocator` here
    pub fn new<A>(params: OceanParams, camera: &Camera, allocator: &mut A) -> Self
    where
        A: RenderTargetAllocator<Target = T>,
    {
        let grid = ProjectedGrid::new(params.grid_rows, params.grid_cols);
        let projector = Projector::new(params.projector.clone());
        let mirror = MirrorPlane::new(params.mirror.clone(), camera, allocator);

        log::info!(
            "Ocean: {}x{} projected grid, {}px mirror targets, water level {}m",
            grid.rows(),
            grid.cols(),
            params.mirror.target_size,
            params.projector.water_level
        );

        Self {
            grid,
            params,
            projector,
            mirror,
            displacement_offset: Vec2::ZERO,
        }
    }

    /// Advance by `dt_s` seconds and build this frame's shader parameters
    ///
    /// Order: projector, wave scroll, mirror cameras, then the parameter block.
    pub fn update(&mut self, dt_s: f32, camera: &Camera) -> OceanFrame {
        self.projector.update(camera);

        self.displacement_offset = scroll_offset(
            self.displacement_offset,
            Vec2::from_array(self.params.waves.scroll_speed),
            dt_s,
        );

        let reflection_aim = self.mirror.update(camera);

        let waves = &self.params.waves;
        let shader = ShaderParams {
            interpolation: self.projector.interpolation(),
            view_proj: camera.view_proj(),
            reflection_view_proj: self.mirror.reflection().view_proj(),
            refraction_view_proj: self.mirror.refraction().view_proj(),
            displacement_offset: self.displacement_offset,
            displacement: waves.displacement_m,
            water_level: self.params.projector.water_level,
            texture_scale: 1.0 / waves.tile_size_m,
            eye_position: camera.position(),
            light_direction: Vec3::from_array(waves.light_direction),
        };

        OceanFrame {
            shader,
            reflection_aim,
            water_visible: self.projector.range().is_some(),
        }
    }

    pub fn params(&self) -> &OceanParams {
        &self.params
    }

    pub fn projector(&self) -> &Projector {
        &self.projector
    }

    pub fn mirror(&self) -> &MirrorPlane<T> {
        &self.mirror
    }

    pub fn displacement_offset(&self) -> Vec2 {
        self.displacement_offset
    }
}

/// Scroll against `speed`; a component that reaches a whole tile snaps back to 0
fn scroll_offset(offset: Vec2, speed: Vec2, dt_s: f32) -> Vec2 {
    let next = offset - speed * dt_s;
    let wrap = |x: f32| if x.abs() >= 1.0 { 0.0 } else { x };
    Vec2::new(wrap(next.x), wrap(next.y))
}
