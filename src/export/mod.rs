//! Export module for writing terrain meshes to disk.
//!
//! Writes Wavefront OBJ text, either for one mesh or for a batch of named
//! terrains into a folder.

mod batch;
mod obj;

pub use batch::{
    export_terrain, export_terrains, obj_path, validate_batch, BatchError, BatchReport,
    TerrainExportError, TerrainOutcome,
};
pub use obj::{export_obj, write_obj, ObjExportError, OBJ_HEADER};
