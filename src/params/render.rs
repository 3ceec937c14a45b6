//! Window and view-camera configuration.

/// Rendering configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Window width (pixels)
    pub window_width: u32,

    /// Window height (pixels)
    pub window_height: u32,

    /// Vertical field of view (degrees)
    pub fov_degrees: f32,

    /// Near clipping plane (meters)
    pub near_plane_m: f32,

    /// Far clipping plane (meters)
    /// Bounds how far out the projected grid reaches toward the horizon
    pub far_plane_m: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            window_width: 1280,
            window_height: 720,
            fov_degrees: 60.0,
            near_plane_m: 0.3,
            far_plane_m: 1000.0,
        }
    }
}

impl RenderConfig {
    pub fn aspect_ratio(&self) -> f32 {
        self.window_width as f32 / self.window_height.max(1) as f32
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.window_width == 0 || self.window_height == 0 {
            return Err(format!(
                "Window size must be non-zero, got {}x{}",
                self.window_width, self.window_height
            ));
        }
        if !(self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return Err(format!(
                "Field of view must be in (0, 180) degrees, got {}",
                self.fov_degrees
            ));
        }
        if !(self.near_plane_m > 0.0 && self.far_plane_m > self.near_plane_m) {
            return Err(format!(
                "Clip planes must satisfy 0 < near < far, got near={} far={}",
                self.near_plane_m, self.far_plane_m
            ));
        }
        Ok(())
    }
}
