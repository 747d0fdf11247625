//! Height field to polygon mesh conversion.

use glam::{BVec2, BVec3, Vec2, Vec3};
use thiserror::Error;
use tracing::debug;

use super::grid::OutputGrid;
use super::options::{ExportOptions, PolygonTopology};
use crate::terrain::HeightField;

/// Errors that can occur while building a mesh.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    #[error("Height field must be square with at least 2 samples per side, got {width}x{height}")]
    InvalidGrid { width: u32, height: u32 },
    #[error("Output grid of {width}x{height} vertices exceeds the 32-bit index range")]
    TooManyVertices { width: u32, height: u32 },
}

/// Vertices, texture coordinates and face indices of a terrain mesh.
///
/// `vertices` and `uvs` are index-aligned. Output cell (x, y) lives at
/// flat index `y * grid.width + x`.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    /// Zero-based vertex indices, 3 per triangle or 4 per quad.
    pub indices: Vec<u32>,
    /// Dimensions of the vertex grid.
    pub grid: OutputGrid,
}

impl Mesh {
    /// Number of faces for the given topology.
    pub fn face_count(&self, topology: PolygonTopology) -> usize {
        self.indices.len() / topology.vertices_per_face()
    }
}

/// Negates the components selected by `mask`.
fn flip(v: Vec3, mask: BVec3) -> Vec3 {
    Vec3::select(mask, -v, v)
}

/// Builds a mesh from a square height field.
///
/// Output grid Y maps to negated world X, output grid X maps to world Z and
/// elevation maps to world Y. Horizontal spacing is `world_size / (n - 1)`
/// times the downsample factor; elevation is scaled by `world_size.y`.
///
/// # Errors
/// Returns [`MeshError::InvalidGrid`] if the field is not square or has
/// fewer than 2 samples per side, and [`MeshError::TooManyVertices`] if the
/// downsampled grid has more vertices than a `u32` index can address.
pub fn build_mesh(field: &HeightField, options: &ExportOptions) -> Result<Mesh, MeshError> {
    let (w, h) = (field.width, field.height);
    if w != h || w < 2 {
        return Err(MeshError::InvalidGrid { width: w, height: h });
    }

    let factor = options.downsample_factor();
    let grid = OutputGrid::new(w, h, factor);
    if !grid.fits_u32_indices() {
        return Err(MeshError::TooManyVertices {
            width: grid.width,
            height: grid.height,
        });
    }

    let size = field.world_size;
    let scale = Vec3::new(
        size.x / (w - 1) as f32 * factor as f32,
        size.y,
        size.z / (h - 1) as f32 * factor as f32,
    );
    let uv_scale = Vec2::new(1.0 / (w - 1) as f32, 1.0 / (h - 1) as f32);
    let origin = field.world_origin;
    let flip_uv = BVec2::new(options.flip_uv.x, options.flip_uv.y);

    let mut vertices = Vec::with_capacity(grid.vertex_count());
    let mut uvs = Vec::with_capacity(grid.vertex_count());

    for y in 0..grid.height {
        for x in 0..grid.width {
            let (sx, sy) = grid.source_coord(x, y);
            let raw = scale * Vec3::new(-(y as f32), field.elevation(sx, sy), x as f32);

            let position = match (options.include_world_offset, options.flip_before_offset) {
                (false, _) => flip(raw, options.flip_position),
                (true, true) => flip(raw, options.flip_position) + origin,
                (true, false) => flip(raw + origin, options.flip_position),
            };

            let uv = Vec2::new(sx as f32, sy as f32) * uv_scale;

            vertices.push(position);
            uvs.push(Vec2::select(flip_uv, -uv, uv));
        }
    }

    let indices = build_indices(&grid, options.topology);

    debug!(
        vertices = vertices.len(),
        indices = indices.len(),
        factor,
        "built terrain mesh"
    );

    Ok(Mesh {
        vertices,
        uvs,
        indices,
        grid,
    })
}

/// Emits face indices row by row over the output cells.
///
/// Triangles: `(y,x) (y+1,x) (y,x+1)` then `(y+1,x) (y+1,x+1) (y,x+1)`.
/// Quads: `(y,x) (y+1,x) (y+1,x+1) (y,x+1)`.
fn build_indices(grid: &OutputGrid, topology: PolygonTopology) -> Vec<u32> {
    if grid.width < 2 || grid.height < 2 {
        return Vec::new();
    }

    let mut indices = Vec::with_capacity(grid.index_count(topology));

    for y in 0..grid.height - 1 {
        for x in 0..grid.width - 1 {
            let top_left = grid.index(x, y);
            let bottom_left = grid.index(x, y + 1);
            let bottom_right = grid.index(x + 1, y + 1);
            let top_right = grid.index(x + 1, y);

            match topology {
                PolygonTopology::Triangles => indices.extend_from_slice(&[
                    top_left,
                    bottom_left,
                    top_right,
                    bottom_left,
                    bottom_right,
                    top_right,
                ]),
                PolygonTopology::Quads => {
                    indices.extend_from_slice(&[top_left, bottom_left, bottom_right, top_right])
                }
            }
        }
    }

    indices
}
