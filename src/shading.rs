//! Per-frame shader parameters and their GPU uniform layouts.

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec2, Vec3};

use crate::geometry::GL_TO_WGPU_DEPTH;

/// Everything the ocean shader needs for one frame, written once by the ocean system.
///
/// Matrices are in OpenGL clip space; [`ShaderParams::to_uniforms`] applies
/// the wgpu depth remap where depth matters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShaderParams {
    /// Projector interpolation matrix (row k = homogeneous corner k)
    pub interpolation: Mat4,
    pub view_proj: Mat4,
    pub reflection_view_proj: Mat4,
    pub refraction_view_proj: Mat4,
    /// Displacement texture scroll offset (texture units, each in (-1, 1))
    pub displacement_offset: Vec2,
    /// Peak displacement (meters)
    pub displacement: f32,
    pub water_level: f32,
    /// Texture repeats per meter
    pub texture_scale: f32,
    pub eye_position: Vec3,
    /// Direction toward the light (unnormalized)
    pub light_direction: Vec3,
}

impl ShaderParams {
    pub fn to_uniforms(&self) -> OceanUniforms {
        OceanUniforms {
            // Columns of the transpose are the corner rows
            corners: self.interpolation.transpose().to_cols_array_2d(),
            view_proj: (GL_TO_WGPU_DEPTH * self.view_proj).to_cols_array_2d(),
            // Only x, y and w are used for projective lookups
            reflection_view_proj: self.reflection_view_proj.to_cols_array_2d(),
            refraction_view_proj: self.refraction_view_proj.to_cols_array_2d(),
            eye_position: self.eye_position.extend(self.water_level).to_array(),
            light_direction: self
                .light_direction
                .normalize_or_zero()
                .extend(0.0)
                .to_array(),
            wave: [
                self.displacement_offset.x,
                self.displacement_offset.y,
                self.texture_scale,
                self.displacement,
            ],
        }
    }
}

/// Uniform buffer for the ocean shader
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct OceanUniforms {
    /// Homogeneous world positions of the unit-square corners (one per column)
    pub corners: [[f32; 4]; 4],
    pub view_proj: [[f32; 4]; 4],
    pub reflection_view_proj: [[f32; 4]; 4],
    pub refraction_view_proj: [[f32; 4]; 4],
    /// xyz = eye, w = water level
    pub eye_position: [f32; 4],
    /// xyz = normalized direction toward the light
    pub light_direction: [f32; 4],
    /// xy = scroll offset, z = texture scale, w = displacement
    pub wave: [f32; 4],
}

/// Uniform buffer for skybox shader (inverse view-projection + sun + time)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct SkyboxUniforms {
    pub inv_view_proj: [[f32; 4]; 4],
    /// Normalized direction toward the sun (packs into the vec3 slot before `time`)
    pub sun_direction: [f32; 3],
    pub time: f32,
}

impl SkyboxUniforms {
    /// Sky uniforms for a camera. The view translation is dropped so the
    /// unprojected far point is a world direction.
    pub fn new(view: Mat4, projection: Mat4, sun_direction: Vec3, time_s: f32) -> Self {
        let rotation = Mat4::from_mat3(Mat3::from_mat4(view));
        Self {
            inv_view_proj: (projection * rotation).inverse().to_cols_array_2d(),
            sun_direction: sun_direction.normalize_or_zero().to_array(),
            time: time_s,
        }
    }
}
