//! Wavefront OBJ export for terrain meshes.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;

use crate::mesh::{Mesh, PolygonTopology};

/// Comment written on the first line of every file.
pub const OBJ_HEADER: &str = "terrain-obj heightfield OBJ file";

const WRITE_BUFFER_SIZE: usize = 16 * 1024;

/// Errors that can occur during OBJ export.
#[derive(Error, Debug)]
pub enum ObjExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{indices} indices cannot be split into faces of {per_face} vertices")]
    FaceMismatch { indices: usize, per_face: usize },
}

/// Writes a mesh as OBJ text.
///
/// Emits a header comment, one `v` line per vertex, one `vt` line per UV and
/// one `f` line per face. Face entries are 1-based `v/vt` pairs sharing the
/// same index. Floats use Rust's shortest round-trip formatting, which is
/// locale independent.
///
/// # Errors
/// Returns [`ObjExportError::FaceMismatch`] if the index list was built for a
/// different topology, or [`ObjExportError::Io`] on any write failure.
pub fn write_obj<W: Write>(
    mesh: &Mesh,
    topology: PolygonTopology,
    writer: &mut W,
) -> Result<(), ObjExportError> {
    let per_face = topology.vertices_per_face();
    if mesh.indices.len() % per_face != 0 {
        return Err(ObjExportError::FaceMismatch {
            indices: mesh.indices.len(),
            per_face,
        });
    }

    writeln!(writer, "# {}", OBJ_HEADER)?;

    for v in &mesh.vertices {
        writeln!(writer, "v {} {} {}", unsigned_zero(v.x), unsigned_zero(v.y), unsigned_zero(v.z))?;
    }

    for uv in &mesh.uvs {
        writeln!(writer, "vt {} {}", unsigned_zero(uv.x), unsigned_zero(uv.y))?;
    }

    for face in mesh.indices.chunks_exact(per_face) {
        writer.write_all(b"f")?;
        for &index in face {
            write!(writer, " {0}/{0}", index + 1)?;
        }
        writer.write_all(b"\n")?;
    }

    Ok(())
}

/// Maps -0.0 to 0.0 so it prints as `0`.
fn unsigned_zero(value: f32) -> f32 {
    value + 0.0
}

/// Writes a mesh to an OBJ file, replacing any existing file.
///
/// The file is flushed and closed before returning. On error, whatever was
/// written so far stays on disk.
pub fn export_obj(mesh: &Mesh, topology: PolygonTopology, path: &Path) -> Result<(), ObjExportError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::with_capacity(WRITE_BUFFER_SIZE, file);

    write_obj(mesh, topology, &mut writer)?;

    writer.flush()?;
    Ok(())
}
