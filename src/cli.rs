//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::params::{CameraPreset, FixedCamera, OceanParams, OrbitCamera, RenderConfig};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "tidegrid")]
#[command(about = "Projected-grid ocean with planar reflection and refraction", long_about = None)]
pub struct Args {
    /// Camera preset: orbit (default), fixed
    #[arg(long, value_name = "PRESET", default_value = "orbit")]
    pub camera_preset: String,

    /// Height of the water plane (meters)
    #[arg(long, value_name = "METERS", default_value = "0", allow_negative_numbers = true)]
    pub water_level: f32,

    /// Half-height of the band waves stay within (meters)
    #[arg(long, value_name = "METERS", default_value = "5")]
    pub displacement_range: f32,

    /// Peak wave displacement (meters)
    #[arg(long, value_name = "METERS", default_value = "4")]
    pub displacement: f32,

    /// Projected grid vertices per side
    #[arg(long, value_name = "VERTICES", default_value = "128")]
    pub grid_resolution: usize,

    /// Reflection/refraction target size (pixels)
    #[arg(long, value_name = "PIXELS", default_value = "256")]
    pub mirror_size: u32,

    /// Seed for the generated wave texture
    #[arg(long, value_name = "SEED", default_value = "42")]
    pub wave_seed: u32,

    /// Load the displacement map from an image instead of generating it
    #[arg(long, value_name = "PATH")]
    pub displacement_map: Option<PathBuf>,

    /// Window width (pixels)
    #[arg(long, value_name = "PIXELS", default_value = "1280")]
    pub width: u32,

    /// Window height (pixels)
    #[arg(long, value_name = "PIXELS", default_value = "720")]
    pub height: u32,
}

impl Args {
    /// Parse camera preset from command-line arguments
    pub fn parse_camera_preset(&self) -> CameraPreset {
        match self.camera_preset.to_lowercase().as_str() {
            "orbit" => {
                log::info!("Camera: Orbit (W accelerate, A/D turn, drag to orbit, wheel to zoom)");
                self.orbit_preset()
            }
            "fixed" => {
                log::info!("Camera: Fixed");
                let mut fixed = FixedCamera::default();
                fixed.position[1] += self.water_level;
                fixed.target[1] += self.water_level;
                CameraPreset::Fixed(fixed)
            }
            other => {
                log::warn!("Unknown camera preset '{}', using orbit", other);
                self.orbit_preset()
            }
        }
    }

    /// Orbit preset with the rig starting on the water
    fn orbit_preset(&self) -> CameraPreset {
        let mut orbit = OrbitCamera::default();
        orbit.rig_start[1] = self.water_level;
        CameraPreset::Orbit(orbit)
    }

    /// Ocean parameters with the command-line overrides applied
    pub fn ocean_params(&self) -> OceanParams {
        let mut params = OceanParams {
            grid_rows: self.grid_resolution,
            grid_cols: self.grid_resolution,
            ..Default::default()
        };
        params.projector.water_level = self.water_level;
        params.projector.displacement_range = self.displacement_range;
        params.mirror.plane_point = [0.0, self.water_level, 0.0];
        params.mirror.target_size = self.mirror_size;
        params.waves.displacement_m = self.displacement;
        params.waves.noise_seed = self.wave_seed;
        params
    }

    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            window_width: self.width,
            window_height: self.height,
            ..Default::default()
        }
    }
}
