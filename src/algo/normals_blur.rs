//! Pre-smoothing of normal fields.
//!
//! The curvature domain transform compares neighbouring normals, so noise in
//! the normals shows up as spurious features. Blurring them first with the
//! plain recursive filter gives a steadier transform.

use nalgebra::Vector4;

use super::filter::FilterMode;
use super::recursive::RecursiveFilter;
use crate::grid::Grid;

/// Settings for blurring normals before building a curvature transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalsBlur {
    /// Spatial factor of the blur.
    pub spatial_factor: f64,
    /// Number of blur iterations.
    pub iterations: usize,
    /// Filter mode of the blur. Only [`FilterMode::Plain`] is accepted.
    pub mode: FilterMode,
}

impl Default for NormalsBlur {
    fn default() -> Self {
        Self {
            spatial_factor: 1.0,
            iterations: 3,
            mode: FilterMode::Plain,
        }
    }
}

impl NormalsBlur {
    /// Set the spatial factor.
    pub fn with_spatial_factor(mut self, spatial_factor: f64) -> Self {
        self.spatial_factor = spatial_factor;
        self
    }

    /// Set the number of iterations.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }
}

/// Return a blurred copy of `normals`.
///
/// # Panics
///
/// Panics if `blur.mode` is a weighted mode: a weighted blur would need a
/// domain transform, which itself needs the normals being blurred.
pub fn blur_normals(
    normals: &Grid<Vector4<f64>>,
    blur: &NormalsBlur,
    parallel: bool,
) -> Grid<Vector4<f64>> {
    assert!(
        !blur.mode.is_weighted(),
        "normals can only be blurred in plain mode, got {:?}",
        blur.mode
    );

    let mut blurred = normals.clone();
    RecursiveFilter::new(normals.width(), blur.spatial_factor, blur.iterations)
        .with_parallel(parallel)
        .run(&mut blurred, None);
    blurred
}
