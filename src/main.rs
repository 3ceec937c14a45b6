//! tidegrid - a projected-grid ocean with planar reflection and refraction
//!
//! The grid is reshaped every frame so each vertex lands on the visible
//! water, and two mirror cameras render what the surface reflects and refracts.

use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use env_logger::Env;
use glam::{Vec2, Vec3};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalPosition,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use tidegrid::camera::{CameraSystem, OrbitInput};
use tidegrid::cli::Args;
use tidegrid::error::{OceanError, Result};
use tidegrid::ocean::{OceanSystem, WaveTextures};
use tidegrid::params::{OceanParams, RenderConfig};
use tidegrid::rendering::{MirrorTarget, RenderSystem, SkyPass};
use tidegrid::shading::SkyboxUniforms;

/// Orbit drag per pixel of mouse motion
const DRAG_PER_PIXEL: f32 = 0.01;

/// Longest frame step fed to the simulation (seconds)
const MAX_FRAME_S: f32 = 0.1;

/// Keyboard and mouse state, folded into an `OrbitInput` once per frame
#[derive(Default)]
struct InputState {
    forward: bool,
    left: bool,
    right: bool,
    dragging: bool,
    cursor: Option<PhysicalPosition<f64>>,
    drag: Vec2,
    zoom: f32,
}

impl InputState {
    fn key(&mut self, code: KeyCode, pressed: bool) {
        match code {
            KeyCode::KeyW | KeyCode::ArrowUp => self.forward = pressed,
            KeyCode::KeyA | KeyCode::ArrowLeft => self.left = pressed,
            KeyCode::KeyD | KeyCode::ArrowRight => self.right = pressed,
            _ => {}
        }
    }

    fn cursor_moved(&mut self, position: PhysicalPosition<f64>) {
        if let (true, Some(last)) = (self.dragging, self.cursor) {
            self.drag += Vec2::new((position.x - last.x) as f32, (position.y - last.y) as f32)
                * DRAG_PER_PIXEL;
        }
        self.cursor = Some(position);
    }

    fn scroll(&mut self, delta: MouseScrollDelta) {
        self.zoom += match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(p) => p.y as f32 / 20.0,
        };
    }

    /// Input for this frame; accumulated drag and zoom are consumed
    fn take_orbit_input(&mut self) -> OrbitInput {
        let turn = match (self.left, self.right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        };
        OrbitInput {
            forward: self.forward,
            turn,
            zoom: std::mem::take(&mut self.zoom),
            drag: std::mem::take(&mut self.drag),
        }
    }
}

/// Main application state
struct App {
    args: Args,
    ocean_params: OceanParams,
    render_config: RenderConfig,

    // Window and rendering
    window: Option<Arc<Window>>,
    render_system: Option<RenderSystem>,

    // Simulation systems
    ocean: Option<OceanSystem<MirrorTarget>>,
    camera: CameraSystem,
    input: InputState,

    /// Failure during window/GPU setup, reported after the loop exits
    init_error: Option<OceanError>,

    // Time tracking
    start_time: Instant,
    last_frame: Instant,
}

impl App {
    fn new(args: Args) -> Result<Self> {
        let ocean_params = args.ocean_params();
        ocean_params.validate().map_err(OceanError::InvalidConfig)?;

        let render_config = args.render_config();
        render_config.validate().map_err(OceanError::InvalidConfig)?;

        let preset = args.parse_camera_preset();
        preset.validate().map_err(OceanError::InvalidConfig)?;
        let camera = CameraSystem::new(preset);

        Ok(Self {
            args,
            ocean_params,
            render_config,
            window: None,
            render_system: None,
            ocean: None,
            camera,
            input: InputState::default(),
            init_error: None,
            start_time: Instant::now(),
            last_frame: Instant::now(),
        })
    }

    /// Create the window, GPU resources and ocean
    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window_attributes = Window::default_attributes()
            .with_title("tidegrid")
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.render_config.window_width,
                self.render_config.window_height,
            ));
        let window = Arc::new(event_loop.create_window(window_attributes)?);

        let size = window.inner_size();
        self.render_config.window_width = size.width.max(1);
        self.render_config.window_height = size.height.max(1);

        let waves = match &self.args.displacement_map {
            Some(path) => WaveTextures::from_displacement_map(path, &self.ocean_params.waves)?,
            None => WaveTextures::generate(&self.ocean_params.waves),
        };

        let mut render_system = pollster::block_on(RenderSystem::new(Arc::clone(&window), &waves))?;

        let camera = self
            .camera
            .update(0.0, &OrbitInput::default(), &self.render_config);
        let ocean = OceanSystem::new(self.ocean_params.clone(), &camera, &mut render_system);

        render_system.upload_grid(&ocean.grid);
        render_system.bind_mirror_targets(
            ocean.mirror().reflection().target(),
            ocean.mirror().refraction().target(),
        );

        log::info!("tidegrid is running! Press ESC to quit");

        self.window = Some(window);
        self.render_system = Some(render_system);
        self.ocean = Some(ocean);
        self.last_frame = Instant::now();
        Ok(())
    }

    /// Render a single frame
    fn render_frame(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(render_system), Some(ocean)) = (&mut self.render_system, &mut self.ocean) else {
            return;
        };

        let now = Instant::now();
        let dt_s = (now - self.last_frame).as_secs_f32().min(MAX_FRAME_S);
        self.last_frame = now;
        let time_s = self.start_time.elapsed().as_secs_f32();

        // Camera first, then the ocean with the same camera
        let input = self.input.take_orbit_input();
        let camera = self.camera.update(dt_s, &input, &self.render_config);
        let frame = ocean.update(dt_s, &camera);

        render_system.update_ocean_uniforms(&frame.shader.to_uniforms());

        // Mirror skies use the player projection: same rays as the oblique one
        let sun = Vec3::from_array(ocean.params().waves.light_direction);
        let mirror = ocean.mirror();
        let skies = [
            (SkyPass::Screen, camera.view_matrix()),
            (SkyPass::Reflection, mirror.reflection().view_matrix()),
            (SkyPass::Refraction, mirror.refraction().view_matrix()),
        ];
        for (pass, view) in skies {
            let uniforms = SkyboxUniforms::new(view, camera.projection, sun, time_s);
            render_system.update_sky_uniforms(pass, &uniforms);
        }

        match render_system.render(mirror.reflection().target(), mirror.refraction().target()) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let (width, height) = render_system.size();
                log::warn!("Surface lost or outdated, reconfiguring");
                render_system.resize(width, height);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory");
                event_loop.exit();
            }
            Err(e) => log::warn!("Render error: {:?}", e),
        }
    }
}

impl ApplicationHandler for App {
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return; // Already initialized
        }

        if let Err(e) = self.init(event_loop) {
            log::error!("Initialization failed: {}", e);
            self.init_error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state,
                        physical_key: PhysicalKey::Code(code),
                        ..
                    },
                ..
            } => {
                if code == KeyCode::Escape && state == ElementState::Pressed {
                    event_loop.exit();
                }
                self.input.key(code, state == ElementState::Pressed);
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => self.input.dragging = state == ElementState::Pressed,
            WindowEvent::CursorMoved { position, .. } => self.input.cursor_moved(position),
            WindowEvent::MouseWheel { delta, .. } => self.input.scroll(delta),
            WindowEvent::Resized(size) => {
                if let Some(render_system) = &mut self.render_system {
                    render_system.resize(size.width, size.height);
                }
                if size.width > 0 && size.height > 0 {
                    self.render_config.window_width = size.width;
                    self.render_config.window_height = size.height;
                }
            }
            WindowEvent::RedrawRequested => self.render_frame(event_loop),
            _ => {}
        }
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    let mut app = App::new(args)?;

    let event_loop = EventLoop::new()?;
    event_loop.run_app(&mut app)?;

    match app.init_error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_keys_cancel() {
        let mut input = InputState::default();
        input.key(KeyCode::KeyA, true);
        assert_eq!(input.take_orbit_input().turn, -1.0);

        input.key(KeyCode::KeyD, true);
        assert_eq!(input.take_orbit_input().turn, 0.0);

        input.key(KeyCode::KeyA, false);
        assert_eq!(input.take_orbit_input().turn, 1.0);
    }

    #[test]
    fn test_drag_and_zoom_are_consumed() {
        let mut input = InputState::default();
        input.cursor_moved(PhysicalPosition::new(10.0, 10.0));
        input.dragging = true;
        input.cursor_moved(PhysicalPosition::new(110.0, 60.0));
        input.scroll(MouseScrollDelta::LineDelta(0.0, 2.0));

        let first = input.take_orbit_input();
        assert!((first.drag - Vec2::new(1.0, 0.5)).length() < 1e-5);
        assert_eq!(first.zoom, 2.0);

        let second = input.take_orbit_input();
        assert_eq!(second.drag, Vec2::ZERO);
        assert_eq!(second.zoom, 0.0);
    }
}
