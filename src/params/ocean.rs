//! Projector, mirror and wave parameters for the ocean surface.

/// Projected-grid projector parameters
#[derive(Debug, Clone)]
pub struct ProjectorParams {
    /// Nominal height of the water plane (meters)
    pub water_level: f32,

    /// Half-height of the band the displaced surface is guaranteed to stay in (meters)
    /// Must cover the largest wave displacement or the grid will miss crests
    pub displacement_range: f32,

    /// Extra height above the band that the projector eye is clamped to (meters)
    /// Keeps the projector looking down steeply enough to stay stable near the horizon
    pub aim_height_offset: f32,

    /// Distance along the camera forward used to place the projector target (meters)
    pub aim_distance: f32,

    /// Denominator magnitude below which a ray is treated as parallel to a plane
    pub parallel_epsilon: f32,
}

impl Default for ProjectorParams {
    fn default() -> Self {
        Self {
            water_level: 0.0,
            displacement_range: 5.0,
            aim_height_offset: 40.0,
            aim_distance: 50.0,
            parallel_epsilon: 1e-6,
        }
    }
}

impl ProjectorParams {
    pub fn validate(&self) -> Result<(), String> {
        if !self.water_level.is_finite() {
            return Err(format!("Water level must be finite, got {}", self.water_level));
        }
        if !(self.displacement_range >= 0.0) {
            return Err(format!(
                "Displacement range must be >= 0, got {}",
                self.displacement_range
            ));
        }
        if !(self.aim_distance > 0.0) {
            return Err(format!("Aim distance must be > 0, got {}", self.aim_distance));
        }
        if !(self.parallel_epsilon >= 0.0) {
            return Err(format!(
                "Parallel epsilon must be >= 0, got {}",
                self.parallel_epsilon
            ));
        }
        Ok(())
    }
}

/// Planar mirror (reflection/refraction) parameters
#[derive(Debug, Clone)]
pub struct MirrorParams {
    /// Any point on the mirror plane (meters)
    pub plane_point: [f32; 3],

    /// Mirror plane normal, pointing out of the water
    pub plane_normal: [f32; 3],

    /// Clip plane offset along the normal (meters)
    /// Stops the mirror surface from clipping into its own reflection
    pub clip_plane_offset: f32,

    /// Minimum forward·normal for the reflection camera to re-aim
    pub aim_epsilon: f32,

    /// Side length of both square render targets (pixels)
    pub target_size: u32,
}

impl Default for MirrorParams {
    fn default() -> Self {
        Self {
            plane_point: [0.0, 0.0, 0.0],
            plane_normal: [0.0, 1.0, 0.0],
            clip_plane_offset: 0.02,
            aim_epsilon: 1e-5,
            target_size: 256,
        }
    }
}

impl MirrorParams {
    pub fn validate(&self) -> Result<(), String> {
        let [x, y, z] = self.plane_normal;
        if !(x * x + y * y + z * z > 0.0) {
            return Err("Mirror plane normal must be non-zero".to_string());
        }
        if self.target_size == 0 {
            return Err("Mirror target size must be > 0".to_string());
        }
        Ok(())
    }
}

/// Wave displacement texture parameters
#[derive(Debug, Clone)]
pub struct WaveParams {
    /// Peak vertical displacement applied by the shader (meters)
    /// Should stay within the projector's displacement range
    pub displacement_m: f32,

    /// Texture scroll speed (texture tiles per second, x and y)
    pub scroll_speed: [f32; 2],

    /// World size covered by one texture tile (meters)
    pub tile_size_m: f32,

    /// Direction toward the light, world space (unnormalized)
    pub light_direction: [f32; 3],

    /// Generated texture resolution (pixels per side)
    pub texture_size: u32,

    /// Base noise frequency (cycles per tile)
    pub noise_frequency: f32,

    /// Noise octaves summed into the height field
    pub noise_octaves: u32,

    /// Perlin noise seed
    pub noise_seed: u32,

    /// Slope multiplier used when deriving the normal map
    pub normal_strength: f32,
}

impl Default for WaveParams {
    fn default() -> Self {
        Self {
            displacement_m: 4.0,
            scroll_speed: [0.02, 0.015],
            tile_size_m: 64.0,
            light_direction: [-100.0, 10.0, -100.0],
            texture_size: 256,
            noise_frequency: 4.0,
            noise_octaves: 4,
            noise_seed: 42,
            normal_strength: 8.0,
        }
    }
}

impl WaveParams {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.tile_size_m > 0.0) {
            return Err(format!("Tile size must be > 0, got {}", self.tile_size_m));
        }
        if self.texture_size < 2 {
            return Err(format!(
                "Wave texture size must be >= 2, got {}",
                self.texture_size
            ));
        }
        if self.noise_octaves == 0 {
            return Err("Wave noise needs at least one octave".to_string());
        }
        Ok(())
    }
}

/// Everything the ocean surface needs, grouped
#[derive(Debug, Clone)]
pub struct OceanParams {
    pub projector: ProjectorParams,
    pub mirror: MirrorParams,
    pub waves: WaveParams,

    /// Projected grid vertex rows
    pub grid_rows: usize,

    /// Projected grid vertex columns
    pub grid_cols: usize,
}

impl Default for OceanParams {
    fn default() -> Self {
        Self {
            projector: ProjectorParams::default(),
            mirror: MirrorParams::default(),
            waves: WaveParams::default(),
            grid_rows: 128,
            grid_cols: 128,
        }
    }
}

impl OceanParams {
    pub fn validate(&self) -> Result<(), String> {
        self.projector.validate()?;
        self.mirror.validate()?;
        self.waves.validate()?;
        if self.grid_rows < 2 || self.grid_cols < 2 {
            return Err(format!(
                "Projected grid needs at least 2x2 vertices, got {}x{}",
                self.grid_rows, self.grid_cols
            ));
        }
        if self.waves.displacement_m.abs() > self.projector.displacement_range {
            log::warn!(
                "Wave displacement {}m exceeds displacement range {}m; crests may be culled",
                self.waves.displacement_m,
                self.projector.displacement_range
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(OceanParams::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_degenerate_values() {
        let mut params = OceanParams::default();
        params.grid_rows = 1;
        assert!(params.validate().is_err());

        let mut mirror = MirrorParams::default();
        mirror.plane_normal = [0.0, 0.0, 0.0];
        assert!(mirror.validate().is_err());

        let mut projector = ProjectorParams::default();
        projector.displacement_range = -1.0;
        assert!(projector.validate().is_err());

        let mut waves = WaveParams::default();
        waves.tile_size_m = 0.0;
        assert!(waves.validate().is_err());
    }
}
