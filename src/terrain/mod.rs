//! Terrain input module.
//!
//! Provides the HeightField and Terrain data structures and loaders for
//! heightmap files.

mod heightfield;
mod import;

pub use heightfield::{HeightField, HeightFieldError, Terrain};
pub use import::{
    decode_raw, load_heightfield, load_png_heightfield, load_raw_heightfield, ImportError,
    RawFormat,
};
