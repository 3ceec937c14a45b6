//! Wave displacement and normal textures.
//!
//! The displacement map is an 8-bit height field centered on 0.5 (mid-gray is
//! the rest level). It is scrolled over the water by the ocean system and
//! sampled by the vertex stage; the normal map is derived from it for lighting.

use std::f64::consts::TAU;
use std::path::Path;

use image::{GrayImage, Luma, Rgba, RgbaImage};
use noise::{NoiseFn, Perlin};

use crate::error::Result;
use crate::params::WaveParams;

/// Height field + normal map pair, both tileable
pub struct WaveTextures {
    pub displacement: GrayImage,
    pub normals: RgbaImage,
}

impl WaveTextures {
    /// Generate a tileable height field from Perlin noise
    pub fn generate(params: &WaveParams) -> Self {
        let size = params.texture_size;
        let perlin = Perlin::new(params.noise_seed);

        let displacement = GrayImage::from_fn(size, size, |x, y| {
            let u = x as f64 / size as f64;
            let v = y as f64 / size as f64;
            let height = tileable_height(&perlin, params, u, v);
            Luma([encode_unit(height)])
        });

        log::info!(
            "Generated {}x{} wave displacement (seed {}, {} octaves)",
            size,
            size,
            params.noise_seed,
            params.noise_octaves
        );

        let normals = normal_map(&displacement, params.normal_strength);
        Self {
            displacement,
            normals,
        }
    }

    /// Load a displacement map from an image file (converted to 8-bit gray)
    pub fn from_displacement_map(path: &Path, params: &WaveParams) -> Result<Self> {
        let displacement = image::open(path)?.to_luma8();
        log::info!(
            "Loaded {}x{} displacement map from {}",
            displacement.width(),
            displacement.height(),
            path.display()
        );

        let normals = normal_map(&displacement, params.normal_strength);
        Ok(Self {
            displacement,
            normals,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        self.displacement.dimensions()
    }
}

/// Summed-octave Perlin noise on a 4D torus, so the result wraps in both u and v.
/// Returns a value in [-1, 1].
fn tileable_height(perlin: &Perlin, params: &WaveParams, u: f64, v: f64) -> f32 {
    let (su, cu) = (u * TAU).sin_cos();
    let (sv, cv) = (v * TAU).sin_cos();

    let mut frequency = params.noise_frequency as f64;
    let mut amplitude = 1.0;
    let mut sum = 0.0;
    let mut total = 0.0;

    for _ in 0..params.noise_octaves {
        // Circle radius giving `frequency` noise cycles around the torus
        let radius = frequency / TAU;
        sum += amplitude * perlin.get([cu * radius, su * radius, cv * radius, sv * radius]);
        total += amplitude;
        frequency *= 2.0;
        amplitude *= 0.5;
    }

    (sum / total).clamp(-1.0, 1.0) as f32
}

/// Map [-1, 1] to a byte centered on 128
fn encode_unit(value: f32) -> u8 {
    ((value * 0.5 + 0.5) * 255.0).round().clamp(0.0, 255.0) as u8
}

fn decode_height(value: u8) -> f32 {
    value as f32 / 255.0 * 2.0 - 1.0
}

/// Y-up normals from wrapped central differences of the height field
fn normal_map(heights: &GrayImage, strength: f32) -> RgbaImage {
    let (width, height) = heights.dimensions();
    let sample = |x: i64, y: i64| {
        let x = x.rem_euclid(width as i64) as u32;
        let y = y.rem_euclid(height as i64) as u32;
        decode_height(heights.get_pixel(x, y)[0])
    };

    RgbaImage::from_fn(width, height, |x, y| {
        let (x, y) = (x as i64, y as i64);
        let dx = (sample(x + 1, y) - sample(x - 1, y)) * 0.5 * strength;
        let dz = (sample(x, y + 1) - sample(x, y - 1)) * 0.5 * strength;

        let normal = glam::Vec3::new(-dx, 1.0, -dz).normalize();
        Rgba([
            encode_unit(normal.x),
            encode_unit(normal.y),
            encode_unit(normal.z),
            255,
        ])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_params() -> WaveParams {
        WaveParams {
            texture_size: 32,
            ..Default::default()
        }
    }

    #[test]
    fn test_generated_sizes() {
        let textures = WaveTextures::generate(&small_params());
        assert_eq!(textures.size(), (32, 32));
        assert_eq!(textures.normals.dimensions(), (32, 32));
    }

    #[test]
    fn test_height_wraps_around() {
        let params = small_params();
        let perlin = Perlin::new(params.noise_seed);

        for &(u, v) in &[(0.0, 0.3), (0.7, 0.0), (0.25, 0.6)] {
            let h = tileable_height(&perlin, &params, u, v);
            let wrapped = tileable_height(&perlin, &params, u + 1.0, v + 1.0);
            assert!((h - wrapped).abs() < 1e-5);
            assert!((-1.0..=1.0).contains(&h));
        }
    }

    #[test]
    fn test_height_field_is_not_flat() {
        let textures = WaveTextures::generate(&small_params());
        let pixels = textures.displacement.as_raw();
        let min = pixels.iter().min().unwrap();
        let max = pixels.iter().max().unwrap();
        assert!(max - min > 10, "range {}..{}", min, max);
    }

    #[test]
    fn test_flat_heights_give_up_normals() {
        let flat = GrayImage::from_pixel(8, 8, Luma([128]));
        let normals = normal_map(&flat, 8.0);
        for pixel in normals.pixels() {
            assert_eq!(pixel[1], 255);
            assert!((pixel[0] as i32 - 128).abs() <= 1);
            assert!((pixel[2] as i32 - 128).abs() <= 1);
        }
    }

    #[test]
    fn test_slope_tilts_normal() {
        // Height rises with x: normal leans toward -x
        let ramp = GrayImage::from_fn(8, 8, |x, _| Luma([100 + x as u8 * 10]));
        let normals = normal_map(&ramp, 8.0);
        assert!(normals.get_pixel(3, 3)[0] < 128);
    }

    #[test]
    fn test_load_displacement_map() {
        let path = std::env::temp_dir().join("tidegrid_test_displacement.png");
        let source = GrayImage::from_fn(16, 8, |x, y| Luma([(x * 8 + y) as u8]));
        source.save(&path).unwrap();

        let textures = WaveTextures::from_displacement_map(&path, &WaveParams::default()).unwrap();
        assert_eq!(textures.size(), (16, 8));
        assert_eq!(textures.displacement.get_pixel(3, 2)[0], 26);

        std::fs::remove_file(&path).ok();

        let missing = WaveTextures::from_displacement_map(&path, &WaveParams::default());
        assert!(missing.is_err());
    }
}
