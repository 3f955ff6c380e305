//! Error types for gimsmooth.
//!
//! The filtering core trusts its preconditions and never fails; errors are
//! produced at the crate boundary: constructing geometry images, file I/O and
//! validating user-supplied filter parameters.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`GimError`].
pub type Result<T> = std::result::Result<T, GimError>;

/// Errors that can occur while building, loading or saving geometry images.
#[derive(Error, Debug)]
pub enum GimError {
    /// The grid is not square.
    #[error("geometry image must be square, got {width}x{height}")]
    NotSquare {
        /// Grid width.
        width: usize,
        /// Grid height.
        height: usize,
    },

    /// The grid side is even or smaller than three cells.
    #[error("geometry image side must be odd and at least 3, got {size}")]
    InvalidSize {
        /// Grid side length.
        size: usize,
    },

    /// A buffer does not hold `width * height` elements.
    #[error("buffer holds {actual} cells, expected {expected}")]
    BufferSize {
        /// Expected number of cells.
        expected: usize,
        /// Actual number of cells.
        actual: usize,
    },

    /// The normals grid does not match the position grid.
    #[error("normals grid is {normals}x{normals}, positions grid is {positions}x{positions}")]
    NormalsMismatch {
        /// Side of the position grid.
        positions: usize,
        /// Side of the normals grid.
        normals: usize,
    },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error loading a geometry image from file.
    #[error("failed to load geometry image from {path}: {message}")]
    LoadError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Error saving a geometry image to file.
    #[error("failed to save geometry image to {path}: {message}")]
    SaveError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Unsupported file format.
    #[error("unsupported file format: {extension}")]
    UnsupportedFormat {
        /// The file extension.
        extension: String,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl GimError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        GimError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }
}
