//! Projected grid mesh: a unit-square grid of UVs the vertex stage places on the water.

use bytemuck::{Pod, Zeroable};

/// Vertex data for the projected grid (UV in the unit square)
///
/// World position comes from interpolating the projector corners by `uv`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub uv: [f32; 2],
}

/// Screen-aligned grid mesh with `rows x cols` vertices
pub struct ProjectedGrid {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    rows: usize,
    cols: usize,
}

impl ProjectedGrid {
    /// Create a grid with `rows x cols` vertices (both at least 2)
    pub fn new(rows: usize, cols: usize) -> Self {
        let rows = rows.max(2);
        let cols = cols.max(2);

        let mut vertices = Vec::with_capacity(rows * cols);
        for i in 0..rows {
            for j in 0..cols {
                vertices.push(Vertex {
                    uv: [
                        j as f32 / (cols - 1) as f32,
                        i as f32 / (rows - 1) as f32,
                    ],
                });
            }
        }

        // Two triangles per cell
        let mut indices = Vec::with_capacity((rows - 1) * (cols - 1) * 6);
        for i in 0..rows - 1 {
            for j in 0..cols - 1 {
                let top_left = (i * cols + j) as u32;
                let top_right = top_left + 1;
                let bottom_left = ((i + 1) * cols + j) as u32;
                let bottom_right = bottom_left + 1;

                indices.extend_from_slice(&[
                    top_left,
                    bottom_left,
                    top_right,
                    bottom_left,
                    bottom_right,
                    top_right,
                ]);
            }
        }

        Self {
            vertices,
            indices,
            rows,
            cols,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }
}
