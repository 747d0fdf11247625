//! HeightField and Terrain data structures.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while constructing a height field.
#[derive(Error, Debug, PartialEq)]
pub enum HeightFieldError {
    #[error("Expected {expected} height samples for a {width}x{height} grid, got {actual}")]
    SampleCountMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// A regular grid of elevation samples placed in world space.
///
/// Samples are stored in row-major order. `world_size` is the physical extent
/// covered by the full-resolution grid; `world_origin` is where the field sits
/// in the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeightField {
    /// Number of samples along X.
    pub width: u32,
    /// Number of samples along Y.
    pub height: u32,
    /// Elevation samples stored in row-major order.
    heights: Vec<f32>,
    /// Physical size of the terrain (X extent, vertical scale, Z extent).
    pub world_size: Vec3,
    /// Translation of the terrain in world space.
    pub world_origin: Vec3,
}

impl HeightField {
    /// Creates a height field from row-major samples.
    ///
    /// # Errors
    /// Returns [`HeightFieldError::SampleCountMismatch`] if `heights` does not
    /// hold exactly `width * height` samples.
    pub fn new(
        width: u32,
        height: u32,
        heights: Vec<f32>,
        world_size: Vec3,
        world_origin: Vec3,
    ) -> Result<Self, HeightFieldError> {
        let expected = (width as usize) * (height as usize);
        if heights.len() != expected {
            return Err(HeightFieldError::SampleCountMismatch {
                width,
                height,
                expected,
                actual: heights.len(),
            });
        }

        Ok(Self {
            width,
            height,
            heights,
            world_size,
            world_origin,
        })
    }

    /// Creates a square, flat height field at the world origin.
    ///
    /// Heights are initialized to 0.0.
    pub fn flat(resolution: u32, world_size: Vec3) -> Self {
        let size = (resolution as usize) * (resolution as usize);
        Self {
            width: resolution,
            height: resolution,
            heights: vec![0.0; size],
            world_size,
            world_origin: Vec3::ZERO,
        }
    }

    /// Returns the same field placed at a different world origin.
    pub fn with_world_origin(mut self, origin: Vec3) -> Self {
        self.world_origin = origin;
        self
    }

    /// Returns the elevation at the given sample coordinate.
    ///
    /// # Panics
    /// Panics if x or y is out of bounds.
    pub fn elevation(&self, x: u32, y: u32) -> f32 {
        debug_assert!(x < self.width && y < self.height);
        self.heights[(y as usize) * (self.width as usize) + x as usize]
    }

    /// Sets the elevation at the given sample coordinate.
    ///
    /// # Panics
    /// Panics if x or y is out of bounds.
    pub fn set_elevation(&mut self, x: u32, y: u32, value: f32) {
        debug_assert!(x < self.width && y < self.height);
        self.heights[(y as usize) * (self.width as usize) + x as usize] = value;
    }

    /// Raw row-major samples.
    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    /// Returns true if the grid is square.
    pub fn is_square(&self) -> bool {
        self.width == self.height
    }

    /// Returns the total number of samples.
    pub fn sample_count(&self) -> usize {
        self.heights.len()
    }

    /// Returns (min, max) elevation.
    pub fn height_range(&self) -> (f32, f32) {
        let mut min = f32::MAX;
        let mut max = f32::MIN;
        for &h in &self.heights {
            min = min.min(h);
            max = max.max(h);
        }
        (min, max)
    }
}

/// A named height field; the unit exported to one OBJ file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Terrain {
    /// Used as the output file stem.
    pub name: String,
    pub field: HeightField,
}

impl Terrain {
    pub fn new(name: impl Into<String>, field: HeightField) -> Self {
        Self {
            name: name.into(),
            field,
        }
    }

    /// Returns true if the name is empty or only whitespace.
    pub fn has_blank_name(&self) -> bool {
        self.name.trim().is_empty()
    }
}
