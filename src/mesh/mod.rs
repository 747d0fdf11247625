//! Mesh generation module.
//!
//! Turns a height field into an indexed polygon mesh with per-vertex
//! texture coordinates. Pure computation, no I/O.

mod builder;
mod grid;
mod options;

pub use builder::{build_mesh, Mesh, MeshError};
pub use grid::OutputGrid;
pub use options::{ExportOptions, MeshResolution, PolygonTopology};
