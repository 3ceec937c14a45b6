//! Ocean surface: projected grid mesh, wave textures and the per-frame system.

pub mod mesh;
pub mod system;
pub mod waves;

pub use mesh::{ProjectedGrid, Vertex};
pub use system::{OceanFrame, OceanSystem};
pub use waves::WaveTextures;
