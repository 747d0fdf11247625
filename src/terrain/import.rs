//! Heightmap import from 16-bit PNG and RAW files.
//!
//! Samples are normalized to [0, 1]; the vertical extent comes from
//! `world_size.y` when the mesh is built.
//!
//! Heightmap files are stored row by row. Terrain heights are addressed as
//! `[row, column]`, so file row `r`, column `c` becomes `elevation(r, c)`:
//! the importers transpose the file into the field's row-major layout.

use std::fs;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::heightfield::{HeightField, HeightFieldError};

/// Errors that can occur during heightmap import.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image decoding error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Heightmap is empty")]
    Empty,
    #[error("RAW heightmap with {0} samples is not square")]
    NotSquare(usize),
    #[error("RAW heightmap length {len} is not a multiple of {sample_size} bytes")]
    Truncated { len: usize, sample_size: usize },
    #[error(transparent)]
    HeightField(#[from] HeightFieldError),
}

/// RAW heightmap sample encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RawFormat {
    /// 16-bit unsigned integer, little-endian (Unity default).
    #[default]
    R16LittleEndian,
    /// 16-bit unsigned integer, big-endian.
    R16BigEndian,
    /// 32-bit float, little-endian, used verbatim.
    R32Float,
}

impl RawFormat {
    /// Bytes per sample.
    pub const fn sample_size(self) -> usize {
        match self {
            RawFormat::R16LittleEndian | RawFormat::R16BigEndian => 2,
            RawFormat::R32Float => 4,
        }
    }

    /// Guesses the format from a file extension (`r16`, `r32`).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "r16" | "raw" => Some(RawFormat::R16LittleEndian),
            "r32" => Some(RawFormat::R32Float),
            _ => None,
        }
    }
}

/// Transposes a `cols` x `rows` row-major file image so that file row `r`,
/// column `c` lands at field coordinate `(x = r, y = c)`.
///
/// The returned samples describe a `rows` x `cols` (width x height) field.
fn transpose(samples: &[f32], cols: usize, rows: usize) -> Vec<f32> {
    let mut out = vec![0.0; samples.len()];
    for r in 0..rows {
        for c in 0..cols {
            out[c * rows + r] = samples[r * cols + c];
        }
    }
    out
}

/// Decodes headerless square RAW samples into field order.
pub fn decode_raw(bytes: &[u8], format: RawFormat) -> Result<(u32, Vec<f32>), ImportError> {
    if bytes.is_empty() {
        return Err(ImportError::Empty);
    }

    let sample_size = format.sample_size();
    if bytes.len() % sample_size != 0 {
        return Err(ImportError::Truncated {
            len: bytes.len(),
            sample_size,
        });
    }

    let samples: Vec<f32> = match format {
        RawFormat::R16LittleEndian => bytes
            .chunks_exact(2)
            .map(|b| u16::from_le_bytes([b[0], b[1]]) as f32 / 65535.0)
            .collect(),
        RawFormat::R16BigEndian => bytes
            .chunks_exact(2)
            .map(|b| u16::from_be_bytes([b[0], b[1]]) as f32 / 65535.0)
            .collect(),
        RawFormat::R32Float => bytes
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect(),
    };

    let resolution = square_side(samples.len()).ok_or(ImportError::NotSquare(samples.len()))?;
    let side = resolution as usize;
    Ok((resolution, transpose(&samples, side, side)))
}

fn square_side(count: usize) -> Option<u32> {
    let side = (count as f64).sqrt().round() as usize;
    (side * side == count).then_some(side as u32)
}

/// Loads a square RAW heightmap.
pub fn load_raw_heightfield(
    path: &Path,
    format: RawFormat,
    world_size: Vec3,
) -> Result<HeightField, ImportError> {
    let bytes = fs::read(path)?;
    let (resolution, samples) = decode_raw(&bytes, format)?;
    Ok(HeightField::new(resolution, resolution, samples, world_size, Vec3::ZERO)?)
}

/// Loads a grayscale PNG heightmap.
///
/// 8-bit images are widened; color images are converted to luma.
pub fn load_png_heightfield(path: &Path, world_size: Vec3) -> Result<HeightField, ImportError> {
    let img = image::open(path)?.into_luma16();
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(ImportError::Empty);
    }

    let samples: Vec<f32> = img.as_raw().iter().map(|&v| v as f32 / 65535.0).collect();
    let samples = transpose(&samples, width as usize, height as usize);
    Ok(HeightField::new(height, width, samples, world_size, Vec3::ZERO)?)
}

/// Loads a heightmap, choosing the decoder from the file extension.
///
/// `.png` files are decoded as images. Everything else is treated as RAW,
/// using `raw_format` if given or the format implied by the extension.
pub fn load_heightfield(
    path: &Path,
    raw_format: Option<RawFormat>,
    world_size: Vec3,
) -> Result<HeightField, ImportError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();

    if ext.eq_ignore_ascii_case("png") {
        return load_png_heightfield(path, world_size);
    }

    let format = raw_format
        .or_else(|| RawFormat::from_extension(ext))
        .unwrap_or_default();
    load_raw_heightfield(path, format, world_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{build_mesh, ExportOptions, PolygonTopology};
    use image::{ImageBuffer, Luma};
    use tempfile::tempdir;

    #[test]
    fn test_decode_raw_r16_le() {
        let bytes: Vec<u8> = [0u16, 65535, 32768, 0]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        let (res, samples) = decode_raw(&bytes, RawFormat::R16LittleEndian).unwrap();
        assert_eq!(res, 2);
        assert_eq!(samples[0], 0.0);
        // File row 0, column 1 is field (0, 1).
        assert_eq!(samples[2], 1.0);
        assert!((samples[1] - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_decode_raw_r16_be() {
        let bytes: Vec<u8> = [65535u16, 0, 0, 0]
            .iter()
            .flat_map(|v| v.to_be_bytes())
            .collect();
        let (_, samples) = decode_raw(&bytes, RawFormat::R16BigEndian).unwrap();
        assert_eq!(samples, vec![1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_decode_raw_r32_verbatim() {
        let values = [-2.5f32, 0.0, 10.0, 3.25, 1.0, 2.0, 3.0, 4.0, 5.0];
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        let (res, samples) = decode_raw(&bytes, RawFormat::R32Float).unwrap();
        assert_eq!(res, 3);
        assert_eq!(samples, vec![-2.5, 3.25, 3.0, 0.0, 1.0, 4.0, 10.0, 2.0, 5.0]);
    }

    #[test]
    fn test_decode_raw_errors() {
        assert!(matches!(
            decode_raw(&[], RawFormat::R16LittleEndian),
            Err(ImportError::Empty)
        ));
        assert!(matches!(
            decode_raw(&[0, 0, 0], RawFormat::R16LittleEndian),
            Err(ImportError::Truncated { len: 3, sample_size: 2 })
        ));
        assert!(matches!(
            decode_raw(&[0; 6], RawFormat::R16LittleEndian),
            Err(ImportError::NotSquare(3))
        ));
    }

    #[test]
    fn test_load_raw_heightfield() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("island.r16");
        let bytes: Vec<u8> = (0..9u16).flat_map(|v| (v * 1000).to_le_bytes()).collect();
        std::fs::write(&path, bytes).unwrap();

        let size = Vec3::new(10.0, 5.0, 10.0);
        let field = load_heightfield(&path, None, size).unwrap();
        assert_eq!(field.width, 3);
        assert_eq!(field.height, 3);
        assert_eq!(field.world_size, size);
        assert!((field.elevation(0, 1) - 1000.0 / 65535.0).abs() < 1e-6);
        assert!((field.elevation(1, 0) - 3000.0 / 65535.0).abs() < 1e-6);
    }

    #[test]
    fn test_load_png_heightfield() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hills.png");
        let mut img: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::new(5, 5);
        img.put_pixel(4, 0, Luma([65535]));
        img.save(&path).unwrap();

        let field = load_heightfield(&path, None, Vec3::ONE).unwrap();
        assert_eq!(field.width, 5);
        assert_eq!(field.height, 5);
        assert_eq!(field.elevation(0, 4), 1.0);
        assert_eq!(field.elevation(4, 0), 0.0);
    }

    #[test]
    fn test_load_png_non_square_dimensions() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("strip.png");
        let mut img: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::new(4, 2);
        img.put_pixel(3, 1, Luma([65535]));
        img.save(&path).unwrap();

        let field = load_png_heightfield(&path, Vec3::ONE).unwrap();
        assert_eq!(field.width, 2);
        assert_eq!(field.height, 4);
        assert_eq!(field.elevation(1, 3), 1.0);
    }

    #[test]
    fn test_raw_spike_lands_on_world_x() {
        // 3x3 R16 with a single spike at file row 0, column 2.
        let mut values = [0u16; 9];
        values[2] = 65535;
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();

        let dir = tempdir().unwrap();
        let path = dir.path().join("spike.r16");
        std::fs::write(&path, bytes).unwrap();

        let field = load_heightfield(&path, None, Vec3::new(2.0, 1.0, 2.0)).unwrap();
        let mesh = build_mesh(&field, &ExportOptions::identity(PolygonTopology::Triangles)).unwrap();

        let peaks: Vec<usize> = mesh
            .vertices
            .iter()
            .enumerate()
            .filter(|(_, v)| v.y > 0.5)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(peaks, vec![6]);
        assert_eq!(mesh.vertices[6], Vec3::new(-2.0, 1.0, 0.0));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(RawFormat::from_extension("R32"), Some(RawFormat::R32Float));
        assert_eq!(RawFormat::from_extension("raw"), Some(RawFormat::R16LittleEndian));
        assert_eq!(RawFormat::from_extension("obj"), None);
    }
}
