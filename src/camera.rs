//! View camera and the camera rigs that drive it.
//!
//! The orbit rig follows a movable point over the water and produces a target
//! pose each frame from an abstract [`OrbitInput`]; mapping keys and mouse to
//! that input is left to the host.

use glam::{Mat4, Quat, Vec2, Vec3};

use crate::geometry::Pose;
use crate::params::{CameraPreset, OrbitCamera, RenderConfig};

/// Camera the ocean is viewed through: world pose plus an OpenGL-style projection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub pose: Pose,
    pub projection: Mat4,
}

impl Camera {
    /// Perspective camera using the FOV and clip planes of `render_config`
    pub fn perspective(pose: Pose, render_config: &RenderConfig) -> Self {
        let projection = Mat4::perspective_rh_gl(
            render_config.fov_degrees.to_radians(),
            render_config.aspect_ratio(),
            render_config.near_plane_m,
            render_config.far_plane_m,
        );
        Self { pose, projection }
    }

    pub fn position(&self) -> Vec3 {
        self.pose.position
    }

    pub fn forward(&self) -> Vec3 {
        self.pose.forward()
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.pose.view_matrix()
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection * self.view_matrix()
    }
}

/// Per-frame input for the orbit rig
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OrbitInput {
    /// Accelerate the rig forward
    pub forward: bool,

    /// Turn axis: positive turns right, negative turns left
    pub turn: f32,

    /// Zoom steps this frame: positive moves the camera closer
    pub zoom: f32,

    /// Orbit drag this frame (x = yaw, y = pitch, in drag units)
    pub drag: Vec2,
}

/// Smoothed motion quantities; `orbit` is (yaw, pitch) in degrees
#[derive(Debug, Clone, Copy)]
struct RigMotion {
    forward_amount: Vec3,
    turn_amount: f32,
    orbit: Vec2,
    distance: f32,
}

#[derive(Debug, Clone)]
struct OrbitState {
    params: OrbitCamera,
    rig_position: Vec3,
    rig_heading_deg: f32,
    current: RigMotion,
    target: RigMotion,
    acceleration: f32,
    /// Rig displacement during the previous frame
    velocity: Vec3,
}

impl OrbitState {
    fn new(params: OrbitCamera) -> Self {
        let motion = RigMotion {
            forward_amount: Vec3::ZERO,
            turn_amount: 0.0,
            orbit: Vec2::new(params.start_yaw_deg, params.start_pitch_deg),
            distance: params.start_distance_m,
        };
        Self {
            rig_position: Vec3::from_array(params.rig_start),
            rig_heading_deg: 0.0,
            current: motion,
            target: motion,
            acceleration: 0.0,
            velocity: Vec3::ZERO,
            params,
        }
    }

    fn step(&mut self, dt_s: f32, input: &OrbitInput) -> Pose {
        self.process_input(dt_s, input);
        self.interpolate_to_target(dt_s);
        self.advance()
    }

    fn process_input(&mut self, dt_s: f32, input: &OrbitInput) {
        let p = &self.params;
        let speed = p.move_speed_m_per_s;

        self.target.forward_amount = Vec3::ZERO;
        self.target.turn_amount = 0.0;

        // Turning scales with how fast the rig is moving
        if input.turn != 0.0 {
            let deg = speed * self.velocity.length() * 2.0 * input.turn * dt_s;
            self.target.turn_amount -= deg;
            self.target.orbit.x -= deg;
        }

        let heading = Quat::from_rotation_y(self.rig_heading_deg.to_radians());
        let forward = (heading * Vec3::Z).normalize();

        if input.forward {
            self.acceleration += dt_s * p.acceleration_rate;
        } else {
            self.acceleration -= dt_s * p.deceleration_rate;
        }
        self.acceleration = self.acceleration.clamp(0.0, p.max_acceleration);

        self.target.forward_amount += forward * speed * self.acceleration * dt_s;

        if input.zoom != 0.0 {
            self.target.distance *= p.zoom_factor.powf(-input.zoom);
        }
        self.target.orbit += input.drag * p.drag_rotation_deg;

        self.target.distance = self.target.distance.max(p.min_distance_m);
        self.target.orbit.y = self.target.orbit.y.clamp(p.min_pitch_deg, p.max_pitch_deg);
    }

    fn interpolate_to_target(&mut self, dt_s: f32) {
        let orbit_lerp = (dt_s / self.params.orbit_smoothness_s.clamp(0.01, 1.0)).clamp(0.0, 1.0);
        let rig_lerp = (dt_s / self.params.rig_smoothness_s.clamp(0.01, 1.0)).clamp(0.0, 1.0);

        let current = &mut self.current;
        let target = &self.target;
        current.distance += (target.distance - current.distance) * orbit_lerp;
        current.orbit = current.orbit.lerp(target.orbit, orbit_lerp);
        current.forward_amount = current.forward_amount.lerp(target.forward_amount, rig_lerp);
        current.turn_amount += (target.turn_amount - current.turn_amount) * rig_lerp;
    }

    fn advance(&mut self) -> Pose {
        let previous = self.rig_position;
        self.rig_position += self.current.forward_amount;
        self.rig_heading_deg += self.current.turn_amount;

        let (st, ct) = self.current.orbit.y.to_radians().sin_cos();
        let (sp, cp) = self.current.orbit.x.to_radians().sin_cos();

        let look_at = self.rig_position;
        let eye = look_at + Vec3::new(sp * st, ct, cp * st) * self.current.distance;

        self.velocity = self.rig_position - previous;

        Pose::look_at(eye, look_at, Vec3::Y)
    }
}

#[derive(Debug, Clone)]
enum Rig {
    Fixed(Pose),
    Orbit(OrbitState),
}

/// Camera system driven by the selected preset
pub struct CameraSystem {
    rig: Rig,
}

impl CameraSystem {
    /// Create new camera system with specified preset
    pub fn new(preset: CameraPreset) -> Self {
        let rig = match preset {
            CameraPreset::Fixed(p) => Rig::Fixed(Pose::look_at(
                Vec3::from_array(p.position),
                Vec3::from_array(p.target),
                Vec3::Y,
            )),
            CameraPreset::Orbit(p) => Rig::Orbit(OrbitState::new(p)),
        };
        Self { rig }
    }

    /// Advance the rig by `dt_s` seconds and return the camera for this frame
    pub fn update(&mut self, dt_s: f32, input: &OrbitInput, render_config: &RenderConfig) -> Camera {
        let pose = match &mut self.rig {
            Rig::Fixed(pose) => *pose,
            Rig::Orbit(state) => state.step(dt_s, input),
        };
        Camera::perspective(pose, render_config)
    }

    /// Rig position and heading (degrees) for the orbit preset
    pub fn rig(&self) -> Option<(Vec3, f32)> {
        match &self.rig {
            Rig::Fixed(_) => None,
            Rig::Orbit(state) => Some((state.rig_position, state.rig_heading_deg)),
        }
    }
}
