//! Batch export of several terrains into one folder.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use super::obj::{export_obj, ObjExportError};
use crate::mesh::{build_mesh, ExportOptions, MeshError};
use crate::terrain::Terrain;

/// Errors that stop a batch before any file is written.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum BatchError {
    #[error("No terrains to export")]
    NoTerrains,
    #[error("Directory does not exist: {0}")]
    MissingFolder(PathBuf),
    #[error("Terrain #{index} does not have a name. Give every terrain a name, then export")]
    InvalidName { index: usize },
    #[error("Terrain #{index} name '{name}' contains a path separator")]
    UnsafeName { index: usize, name: String },
    #[error("Terrain #{index} name '{name}' is used by an earlier terrain")]
    DuplicateName { index: usize, name: String },
}

/// Errors that fail a single terrain within a batch.
#[derive(Error, Debug)]
pub enum TerrainExportError {
    #[error("Mesh error: {0}")]
    Mesh(#[from] MeshError),
    #[error("OBJ export error: {0}")]
    Obj(#[from] ObjExportError),
}

/// Result of exporting one terrain.
#[derive(Debug)]
pub struct TerrainOutcome {
    pub name: String,
    /// Path of the written file, or why it failed.
    pub result: Result<PathBuf, TerrainExportError>,
}

/// Per-terrain results of a batch, in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<TerrainOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.succeeded() == self.total()
    }

    /// Terrains that failed, with their errors.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &TerrainExportError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.name.as_str(), e)))
    }

    /// Files that were written.
    pub fn written(&self) -> impl Iterator<Item = &Path> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok().map(PathBuf::as_path))
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.succeeded(), self.total())
    }
}

/// Returns the output path for a terrain: `{folder}/{name}.obj`.
///
/// `name` is used as is; [`validate_batch`] rejects names with path
/// separators before any path is built.
pub fn obj_path(folder: &Path, name: &str) -> PathBuf {
    folder.join(format!("{}.obj", name))
}

/// Builds and writes a single terrain.
pub fn export_terrain(
    terrain: &Terrain,
    folder: &Path,
    options: &ExportOptions,
) -> Result<PathBuf, TerrainExportError> {
    let mesh = build_mesh(&terrain.field, options)?;
    let path = obj_path(folder, &terrain.name);
    export_obj(&mesh, options.topology, &path)?;
    Ok(path)
}

/// Checks everything that must hold before any file is written.
pub fn validate_batch(terrains: &[Terrain], folder: &Path) -> Result<(), BatchError> {
    if terrains.is_empty() {
        return Err(BatchError::NoTerrains);
    }

    if !folder.is_dir() {
        return Err(BatchError::MissingFolder(folder.to_path_buf()));
    }

    if let Some(index) = terrains.iter().position(Terrain::has_blank_name) {
        return Err(BatchError::InvalidName { index });
    }

    // Names become file stems inside `folder`.
    if let Some(index) = terrains
        .iter()
        .position(|t| t.name.contains(|c: char| c == '/' || c == '\\'))
    {
        return Err(BatchError::UnsafeName {
            index,
            name: terrains[index].name.clone(),
        });
    }

    let mut seen = HashSet::with_capacity(terrains.len());
    for (index, terrain) in terrains.iter().enumerate() {
        if !seen.insert(terrain.name.as_str()) {
            return Err(BatchError::DuplicateName {
                index,
                name: terrain.name.clone(),
            });
        }
    }

    Ok(())
}

/// Exports each terrain to `{folder}/{name}.obj`.
///
/// The folder must already exist and every terrain needs a unique,
/// non-blank name without path separators; otherwise nothing is written. After validation, a failing terrain
/// is logged and recorded and the remaining terrains are still exported.
pub fn export_terrains(
    terrains: &[Terrain],
    folder: &Path,
    options: &ExportOptions,
) -> Result<BatchReport, BatchError> {
    validate_batch(terrains, folder)?;

    info!(
        count = terrains.len(),
        folder = %folder.display(),
        "writing terrains"
    );

    let mut report = BatchReport::default();

    for terrain in terrains {
        let result = export_terrain(terrain, folder, options);
        match &result {
            Ok(path) => info!(terrain = %terrain.name, path = %path.display(), "wrote terrain"),
            Err(e) => warn!(terrain = %terrain.name, error = %e, "error writing terrain"),
        }

        report.outcomes.push(TerrainOutcome {
            name: terrain.name.clone(),
            result,
        });
    }

    info!("successfully wrote {} terrains", report);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::PolygonTopology;
    use crate::terrain::HeightField;
    use glam::Vec3;
    use tempfile::tempdir;

    fn terrain(name: &str, resolution: u32) -> Terrain {
        Terrain::new(name, HeightField::flat(resolution, Vec3::new(10.0, 1.0, 10.0)))
    }

    fn obj_files(dir: &Path) -> usize {
        std::fs::read_dir(dir)
            .unwrap()
            .filter(|e| {
                e.as_ref()
                    .unwrap()
                    .path()
                    .extension()
                    .is_some_and(|ext| ext == "obj")
            })
            .count()
    }

    #[test]
    fn test_export_batch() {
        let dir = tempdir().unwrap();
        let terrains = vec![terrain("north", 9), terrain("south", 17)];

        let report = export_terrains(&terrains, dir.path(), &ExportOptions::default()).unwrap();

        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.to_string(), "2/2");
        assert!(report.all_succeeded());
        assert!(dir.path().join("north.obj").exists());
        assert!(dir.path().join("south.obj").exists());
        assert_eq!(report.written().count(), 2);
    }

    #[test]
    fn test_duplicate_names_abort_batch() {
        let dir = tempdir().unwrap();
        let terrains = vec![terrain("dup", 5), terrain("other", 5), terrain("dup", 9)];

        let err = export_terrains(&terrains, dir.path(), &ExportOptions::default()).unwrap_err();

        assert_eq!(
            err,
            BatchError::DuplicateName {
                index: 2,
                name: "dup".to_string(),
            }
        );
        assert_eq!(obj_files(dir.path()), 0);
    }

    #[test]
    fn test_path_separator_in_name_aborts_batch() {
        let dir = tempdir().unwrap();
        let inner = dir.path().join("inner");
        std::fs::create_dir(&inner).unwrap();

        for name in ["../escape", "nested/tile", "win\\tile"] {
            let terrains = vec![terrain("ok", 5), terrain(name, 5)];
            let err = export_terrains(&terrains, &inner, &ExportOptions::default()).unwrap_err();
            assert_eq!(
                err,
                BatchError::UnsafeName {
                    index: 1,
                    name: name.to_string(),
                }
            );
        }
        assert_eq!(obj_files(&inner), 0);
        assert_eq!(obj_files(dir.path()), 0);
    }

    #[test]
    fn test_dotted_name_stays_in_folder() {
        let dir = tempdir().unwrap();
        let report = export_terrains(&[terrain("..", 3)], dir.path(), &ExportOptions::default()).unwrap();
        assert_eq!(report.to_string(), "1/1");
        assert!(dir.path().join("...obj").is_file());
    }

    #[test]
    fn test_blank_name_aborts_batch() {
        let dir = tempdir().unwrap();
        let terrains = vec![terrain("valid", 5), terrain("   ", 5), terrain("other", 5)];

        let err = export_terrains(&terrains, dir.path(), &ExportOptions::default()).unwrap_err();

        assert_eq!(err, BatchError::InvalidName { index: 1 });
        assert_eq!(obj_files(dir.path()), 0);
    }

    #[test]
    fn test_missing_folder_aborts_batch() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");

        let err = export_terrains(&[terrain("a", 5)], &missing, &ExportOptions::default()).unwrap_err();

        assert_eq!(err, BatchError::MissingFolder(missing.clone()));
        assert!(!missing.exists());
    }

    #[test]
    fn test_empty_batch() {
        let dir = tempdir().unwrap();
        assert_eq!(
            export_terrains(&[], dir.path(), &ExportOptions::default()).unwrap_err(),
            BatchError::NoTerrains
        );
    }

    #[test]
    fn test_failure_does_not_abort_batch() {
        let dir = tempdir().unwrap();
        let bad = Terrain::new(
            "bad",
            HeightField::new(3, 2, vec![0.0; 6], Vec3::ONE, Vec3::ZERO).unwrap(),
        );
        let terrains = vec![terrain("first", 5), bad, terrain("last", 5)];

        let report = export_terrains(&terrains, dir.path(), &ExportOptions::default()).unwrap();

        assert_eq!(report.to_string(), "2/3");
        assert!(!report.all_succeeded());
        let failures: Vec<_> = report.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "bad");
        assert!(matches!(
            failures[0].1,
            TerrainExportError::Mesh(MeshError::InvalidGrid { width: 3, height: 2 })
        ));
        assert!(dir.path().join("first.obj").exists());
        assert!(dir.path().join("last.obj").exists());
        assert!(!dir.path().join("bad.obj").exists());
    }

    #[test]
    fn test_io_failure_is_per_terrain() {
        let dir = tempdir().unwrap();
        // A directory where the file should go makes File::create fail.
        std::fs::create_dir(dir.path().join("blocked.obj")).unwrap();
        let terrains = vec![terrain("blocked", 5), terrain("open", 5)];

        let report = export_terrains(&terrains, dir.path(), &ExportOptions::default()).unwrap();

        assert_eq!(report.succeeded(), 1);
        assert!(matches!(
            report.outcomes[0].result,
            Err(TerrainExportError::Obj(ObjExportError::Io(_)))
        ));
        assert!(report.outcomes[1].result.is_ok());
    }

    #[test]
    fn test_export_terrain_content() {
        let dir = tempdir().unwrap();
        let options = ExportOptions::identity(PolygonTopology::Quads);

        let path = export_terrain(&terrain("tile", 3), dir.path(), &options).unwrap();

        assert_eq!(path, dir.path().join("tile.obj"));
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().filter(|l| l.starts_with("v ")).count(), 9);
        assert_eq!(text.lines().filter(|l| l.starts_with("vt ")).count(), 9);
        assert_eq!(text.lines().filter(|l| l.starts_with("f ")).count(), 4);
    }
}
