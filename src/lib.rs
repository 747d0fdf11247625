//! Terrain heightmap to Wavefront OBJ converter.
//!
//! This crate samples a regular-grid height field into an indexed triangle
//! or quad mesh and writes it as OBJ text for use in other 3D tools.

pub mod terrain;
pub mod mesh;
pub mod export;

pub use terrain::{HeightField, Terrain};
pub use mesh::{build_mesh, ExportOptions, Mesh, MeshResolution, PolygonTopology};
pub use export::{export_terrains, write_obj, BatchReport};
