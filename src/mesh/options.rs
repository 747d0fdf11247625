//! Mesh export options.

use glam::BVec3;
use serde::{Deserialize, Serialize};

/// Polygon type emitted for each grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PolygonTopology {
    /// Two triangles per cell.
    #[default]
    Triangles,
    /// One quad per cell.
    Quads,
}

impl PolygonTopology {
    /// Number of vertex indices per face.
    pub const fn vertices_per_face(self) -> usize {
        match self {
            PolygonTopology::Triangles => 3,
            PolygonTopology::Quads => 4,
        }
    }

    /// Number of indices emitted per grid cell.
    pub const fn indices_per_cell(self) -> usize {
        match self {
            PolygonTopology::Triangles => 6,
            PolygonTopology::Quads => 4,
        }
    }
}

/// Output mesh density relative to the source grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum MeshResolution {
    /// Every sample.
    Full = 0,
    /// Every 2nd sample.
    #[default]
    Half = 1,
    /// Every 4th sample.
    Quarter = 2,
    /// Every 8th sample.
    Eighth = 3,
    /// Every 16th sample.
    Sixteenth = 4,
}

impl MeshResolution {
    /// Returns all resolutions from finest to coarsest.
    pub const fn all() -> [MeshResolution; 5] {
        [
            MeshResolution::Full,
            MeshResolution::Half,
            MeshResolution::Quarter,
            MeshResolution::Eighth,
            MeshResolution::Sixteenth,
        ]
    }

    /// Resolution level (0-4).
    pub const fn level(self) -> u8 {
        self as u8
    }

    /// Creates a resolution from a level (0-4).
    pub const fn from_level(level: u8) -> Option<MeshResolution> {
        match level {
            0 => Some(MeshResolution::Full),
            1 => Some(MeshResolution::Half),
            2 => Some(MeshResolution::Quarter),
            3 => Some(MeshResolution::Eighth),
            4 => Some(MeshResolution::Sixteenth),
            _ => None,
        }
    }

    /// Sampling stride: `2^level`.
    pub const fn downsample_factor(self) -> u32 {
        1 << self.level()
    }
}

/// Every setting that affects mesh generation for one export call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExportOptions {
    /// Face type.
    pub topology: PolygonTopology,
    /// Grid sampling stride.
    pub resolution: MeshResolution,
    /// Add the height field's world origin to every vertex.
    pub include_world_offset: bool,
    /// Per-axis negation of vertex positions.
    pub flip_position: BVec3,
    /// With `include_world_offset`, flip before adding the origin instead of after.
    pub flip_before_offset: bool,
    /// Per-axis negation of texture coordinates. `z` has no effect on 2-D UVs.
    pub flip_uv: BVec3,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            topology: PolygonTopology::Triangles,
            resolution: MeshResolution::Half,
            include_world_offset: true,
            flip_position: BVec3::FALSE,
            flip_before_offset: false,
            flip_uv: BVec3::FALSE,
        }
    }
}

impl ExportOptions {
    /// Full resolution, no offset, no flips.
    pub fn identity(topology: PolygonTopology) -> Self {
        Self {
            topology,
            resolution: MeshResolution::Full,
            include_world_offset: false,
            ..Default::default()
        }
    }

    pub fn with_topology(mut self, topology: PolygonTopology) -> Self {
        self.topology = topology;
        self
    }

    pub fn with_resolution(mut self, resolution: MeshResolution) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_world_offset(mut self, include: bool, flip_before_offset: bool) -> Self {
        self.include_world_offset = include;
        self.flip_before_offset = flip_before_offset;
        self
    }

    pub fn with_position_flip(mut self, x: bool, y: bool, z: bool) -> Self {
        self.flip_position = BVec3::new(x, y, z);
        self
    }

    pub fn with_uv_flip(mut self, x: bool, y: bool, z: bool) -> Self {
        self.flip_uv = BVec3::new(x, y, z);
        self
    }

    /// Sampling stride derived from `resolution`.
    pub fn downsample_factor(&self) -> u32 {
        self.resolution.downsample_factor()
    }
}
