//! tidegrid library - projected-grid ocean with planar reflection and refraction

pub mod camera;
pub mod cli;
pub mod error;
pub mod geometry;
pub mod mirror;
pub mod ocean;
pub mod params;
pub mod projector;
pub mod rendering;
pub mod shading;
