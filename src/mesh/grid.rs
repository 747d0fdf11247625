//! Output grid dimensions after downsampling.

use super::options::PolygonTopology;

/// Largest vertex count whose zero-based indices all fit in a `u32`.
pub const MAX_VERTICES: u64 = u32::MAX as u64 + 1;

/// Size of the vertex grid produced from a height field at a given stride.
///
/// When `(width - 1)` is not a multiple of the stride, the last row/column of
/// the output samples an interior point and the remaining sliver is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputGrid {
    /// Output vertices along X.
    pub width: u32,
    /// Output vertices along Y.
    pub height: u32,
    /// Sampling stride into the source grid.
    pub factor: u32,
}

impl OutputGrid {
    /// Computes the output grid for a `width` x `height` source.
    ///
    /// Source dimensions must be at least 1 and `factor` at least 1.
    pub fn new(width: u32, height: u32, factor: u32) -> Self {
        debug_assert!(width >= 1 && height >= 1 && factor >= 1);
        Self {
            width: (width - 1) / factor + 1,
            height: (height - 1) / factor + 1,
            factor,
        }
    }

    /// Flat vertex index of output cell (x, y).
    ///
    /// Only valid for grids where [`OutputGrid::fits_u32_indices`] holds.
    pub fn index(&self, x: u32, y: u32) -> u32 {
        y * self.width + x
    }

    /// Source sample coordinate for output cell (x, y).
    pub fn source_coord(&self, x: u32, y: u32) -> (u32, u32) {
        (x * self.factor, y * self.factor)
    }

    pub fn vertex_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Number of grid cells, i.e. quads.
    pub fn cell_count(&self) -> usize {
        (self.width as usize - 1) * (self.height as usize - 1)
    }

    /// Number of faces emitted for `topology`: two triangles or one quad
    /// per cell.
    pub fn face_count(&self, topology: PolygonTopology) -> usize {
        match topology {
            PolygonTopology::Triangles => self.cell_count() * 2,
            PolygonTopology::Quads => self.cell_count(),
        }
    }

    /// Length of the index list emitted for `topology`.
    pub fn index_count(&self, topology: PolygonTopology) -> usize {
        self.cell_count() * topology.indices_per_cell()
    }

    /// Returns true if every vertex can be addressed with a `u32` index.
    ///
    /// Holds up to 65536 x 65536 output vertices.
    pub fn fits_u32_indices(&self) -> bool {
        (self.width as u64) * (self.height as u64) <= MAX_VERTICES
    }

    /// Returns true if the last output row and column land on the source edge.
    pub fn covers_source(&self, source_width: u32, source_height: u32) -> bool {
        (self.width - 1) * self.factor == source_width - 1
            && (self.height - 1) * self.factor == source_height - 1
    }
}
