//! Camera configuration and presets.

/// Fixed camera position (for debugging and screenshots)
#[derive(Debug, Clone)]
pub struct FixedCamera {
    /// Camera position (meters)
    pub position: [f32; 3],

    /// Look-at target (meters)
    pub target: [f32; 3],
}

impl Default for FixedCamera {
    fn default() -> Self {
        Self {
            position: [0.0, 30.0, -60.0],
            target: [0.0, 0.0, 60.0], // Looking forward and down at the water
        }
    }
}

impl FixedCamera {
    pub fn validate(&self) -> Result<(), String> {
        if !self.position.iter().chain(&self.target).all(|v| v.is_finite()) {
            return Err("Fixed camera position and target must be finite".to_string());
        }
        if self.position == self.target {
            return Err("Fixed camera position and target must differ".to_string());
        }
        Ok(())
    }
}

/// Free orbit camera: a rig that drives over the water, with the camera
/// orbiting it at (yaw, pitch, distance)
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    /// Rig start position (meters)
    pub rig_start: [f32; 3],

    /// Rig forward speed at full acceleration (meters per second)
    pub move_speed_m_per_s: f32,

    /// Rig smoothing time (seconds, clamped to [0.01, 1])
    pub rig_smoothness_s: f32,

    /// Orbit smoothing time (seconds, clamped to [0.01, 1])
    pub orbit_smoothness_s: f32,

    /// Orbit rotation per unit of drag (degrees)
    pub drag_rotation_deg: f32,

    /// Initial orbit yaw around the rig (degrees, 180 = behind)
    pub start_yaw_deg: f32,

    /// Initial orbit pitch from straight up (degrees)
    pub start_pitch_deg: f32,

    /// Initial orbit distance (meters)
    pub start_distance_m: f32,

    /// Pitch limits (degrees from straight up)
    pub min_pitch_deg: f32,
    pub max_pitch_deg: f32,

    /// Minimum orbit distance (meters)
    pub min_distance_m: f32,

    /// Distance multiplier per zoom step
    pub zoom_factor: f32,

    /// Acceleration ceiling (fraction of move speed)
    pub max_acceleration: f32,

    /// Acceleration gained per second while moving forward
    pub acceleration_rate: f32,

    /// Acceleration lost per second while coasting
    pub deceleration_rate: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            rig_start: [0.0, 0.0, 0.0],
            move_speed_m_per_s: 20.0,
            rig_smoothness_s: 0.5,
            orbit_smoothness_s: 0.5,
            drag_rotation_deg: 10.0,
            start_yaw_deg: 180.0,
            start_pitch_deg: 60.0,
            start_distance_m: 100.0,
            min_pitch_deg: 20.0,
            max_pitch_deg: 160.0,
            min_distance_m: 1.0,
            zoom_factor: 1.02,
            max_acceleration: 1.0,
            acceleration_rate: 1.0,
            deceleration_rate: 0.25,
        }
    }
}

impl OrbitCamera {
    pub fn validate(&self) -> Result<(), String> {
        let finite = [
            self.move_speed_m_per_s,
            self.rig_smoothness_s,
            self.orbit_smoothness_s,
            self.drag_rotation_deg,
            self.start_yaw_deg,
            self.start_pitch_deg,
            self.start_distance_m,
            self.max_acceleration,
            self.acceleration_rate,
            self.deceleration_rate,
        ];
        if !self.rig_start.iter().chain(&finite).all(|v| v.is_finite()) {
            return Err("Orbit camera rates and start values must be finite".to_string());
        }
        if !(self.min_pitch_deg <= self.max_pitch_deg) {
            return Err(format!(
                "Orbit pitch limits inverted: min {} > max {}",
                self.min_pitch_deg, self.max_pitch_deg
            ));
        }
        if !(self.min_distance_m > 0.0) {
            return Err(format!("Orbit min distance must be > 0, got {}", self.min_distance_m));
        }
        if !(self.zoom_factor > 0.0) || !self.zoom_factor.is_finite() {
            return Err(format!("Orbit zoom factor must be > 0, got {}", self.zoom_factor));
        }
        if !(self.max_acceleration >= 0.0) {
            return Err(format!(
                "Orbit max acceleration must be >= 0, got {}",
                self.max_acceleration
            ));
        }
        Ok(())
    }
}

/// Camera preset selection
#[derive(Debug, Clone)]
pub enum CameraPreset {
    /// Fixed preset: stationary camera
    Fixed(FixedCamera),

    /// Orbit preset: free camera following a movable rig
    Orbit(OrbitCamera),
}

impl CameraPreset {
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::Fixed(fixed) => fixed.validate(),
            Self::Orbit(orbit) => orbit.validate(),
        }
    }
}

impl Default for CameraPreset {
    fn default() -> Self {
        Self::Orbit(OrbitCamera::default())
    }
}
