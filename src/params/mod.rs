//! Parameter definitions with physical units and documented semantics.
//!
//! Every tunable constant of the projector, the mirror cameras, the wave
//! textures and the host window lives here with:
//! - Physical units (meters, seconds, pixels, etc.)
//! - Documented defaults and meanings
//! - A `validate()` check for values the maths cannot tolerate

mod camera;
mod ocean;
mod render;

// Re-export all types
pub use camera::{CameraPreset, FixedCamera, OrbitCamera};
pub use ocean::{MirrorParams, OceanParams, ProjectorParams, WaveParams};
pub use render::RenderConfig;
