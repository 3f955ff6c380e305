//! # gimsmooth
//!
//! Edge-preserving smoothing of spherical geometry images.
//!
//! A geometry image resamples a closed genus-0 surface onto an `n × n` grid
//! of positions. Its border is glued to itself by mirroring, so the grid has
//! no boundary and every cell has four surface neighbours. gimsmooth filters
//! such images with a recursive (IIR) filter that runs along closed loops of
//! the glued chart, solved exactly on each loop, and optionally modulated by
//! a domain transform that keeps creases sharp.
//!
//! ## Features
//!
//! - **Generic grids**: one filter for positions, normals and scalar fields
//! - **Exact loop filtering**: closed-form periodic correction, stable in log space
//! - **Anisotropic modes**: curvature (normal difference) and distance weighting
//! - **Parallel**: loops of a sub-pass are smoothed in parallel with rayon
//! - **File formats**: `.gim` load/save, OBJ, point cloud and PNG export
//!
//! ## Quick Start
//!
//! ```no_run
//! use gimsmooth::prelude::*;
//!
//! let gim = gimsmooth::io::load("bunny.gim").unwrap();
//!
//! let options = FilterOptions::default()
//!     .with_mode(FilterMode::Curvature)
//!     .with_spatial_factor(8.0)
//!     .with_range_factor(0.2);
//! let smoothed = filter(&gim, &options);
//!
//! gimsmooth::io::save(&smoothed, "smoothed.obj").unwrap();
//! ```
//!
//! ## Working With Synthetic Images
//!
//! ```
//! use gimsmooth::prelude::*;
//! use gimsmooth::algo::noise::{add_noise, NoiseOptions};
//! use gimsmooth::gim::shapes;
//!
//! let sphere = shapes::octahedral_sphere(33, 1.0);
//! let noisy = add_noise(&sphere, &NoiseOptions::default().with_intensity(0.02).with_seed(1));
//!
//! let smoothed = filter(
//!     &noisy,
//!     &FilterOptions::default().with_mode(FilterMode::Plain).with_spatial_factor(2.0),
//! );
//! assert!(smoothed.border_mismatches(1e-5).is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod gim;
pub mod grid;
pub mod io;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use gimsmooth::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::domain_transform::{DomainBlur, DomainTransform};
    pub use crate::algo::filter::{filter, filter_with_progress, FilterMode, FilterOptions};
    pub use crate::algo::normals_blur::NormalsBlur;
    pub use crate::algo::Progress;
    pub use crate::error::{GimError, Result};
    pub use crate::gim::{GeometryImage, GimMesh};
    pub use crate::grid::{check_borders, Grid, Sample};
}

// Re-export nalgebra types for convenience
pub use nalgebra;
