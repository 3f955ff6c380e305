//! Geometry image file I/O.
//!
//! # Supported Formats
//!
//! | Format | Extension | Load | Save | Notes |
//! |--------|-----------|------|------|-------|
//! | Geometry image | `.gim` | ✓ | ✓ | Binary grid of `f32` positions |
//! | Wavefront OBJ | `.obj` | ✗ | ✓ | Welded triangulation |
//! | Point cloud | `.txt`, `.xyz` | ✗ | ✓ | One `x y z` line per point |
//! | PNG | `.png` | ✗ | ✓ | Normalized position colours |
//!
//! # Usage
//!
//! ```no_run
//! use gimsmooth::io::{load, save};
//!
//! let gim = load("bunny.gim").unwrap();
//! save(&gim, "bunny.obj").unwrap();
//! ```

pub mod gim;
pub mod obj;
pub mod png;
pub mod points;

use std::path::Path;

use crate::error::{GimError, Result};
use crate::gim::GeometryImage;

/// Supported file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Binary geometry image.
    Gim,
    /// Wavefront OBJ format.
    Obj,
    /// ASCII point cloud.
    Points,
    /// PNG visualization.
    Png,
}

impl Format {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_lowercase().as_str() {
            "gim" => Some(Format::Gim),
            "obj" => Some(Format::Obj),
            "txt" | "xyz" => Some(Format::Points),
            "png" => Some(Format::Png),
            _ => None,
        }
    }

    /// Detect format from file path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Format> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::from_extension)
    }
}

fn detect(path: &Path) -> Result<Format> {
    Format::from_path(path).ok_or_else(|| GimError::UnsupportedFormat {
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(none)")
            .to_string(),
    })
}

/// Load a geometry image from a file.
///
/// Only `.gim` files can be loaded; the other formats lose the grid layout.
pub fn load<P: AsRef<Path>>(path: P) -> Result<GeometryImage> {
    let path = path.as_ref();
    match detect(path)? {
        Format::Gim => gim::load(path),
        Format::Obj | Format::Points | Format::Png => Err(GimError::LoadError {
            path: path.to_path_buf(),
            message: "format can only be exported".to_string(),
        }),
    }
}

/// Save a geometry image with automatic format detection.
///
/// The format is determined by the file extension.
pub fn save<P: AsRef<Path>>(gim: &GeometryImage, path: P) -> Result<()> {
    let path = path.as_ref();
    match detect(path)? {
        Format::Gim => gim::save(gim, path),
        Format::Obj => obj::save(gim, path),
        Format::Points => points::save(gim, path),
        Format::Png => png::save(gim, path),
    }
}
