//! Edge-preserving smoothing of geometry images.
//!
//! [`filter`] runs the recursive filter over the positions of a geometry
//! image. In [`FilterMode::Plain`] every adjacency decays at the same rate.
//! The weighted modes build a [`DomainTransform`] first, so that the filter
//! spreads less across adjacencies whose normals (or positions) differ a lot:
//! creases and corners survive while flat regions are smoothed.
//!
//! # Example
//!
//! ```
//! use gimsmooth::algo::filter::{filter, FilterMode, FilterOptions};
//! use gimsmooth::gim::shapes;
//!
//! let cube = shapes::octahedral_cube(17, 1.0);
//! let options = FilterOptions::default()
//!     .with_mode(FilterMode::Curvature)
//!     .with_spatial_factor(4.0)
//!     .with_range_factor(0.2)
//!     .with_iterations(2);
//!
//! let smoothed = filter(&cube, &options);
//! assert_eq!(smoothed.size(), 17);
//! assert!(smoothed.border_mismatches(1e-5).is_empty());
//! ```

use std::borrow::Cow;
use std::time::Instant;

use nalgebra::Vector4;

use super::domain_transform::{DomainBlur, DomainTransform};
use super::normals_blur::{blur_normals, NormalsBlur};
use super::recursive::{RecursiveFilter, SweepPlan};
use super::Progress;
use crate::error::{GimError, Result};
use crate::gim::{GeometryImage, GimMesh};
use crate::grid::Grid;

/// How the decay of the recursive filter varies across the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    /// The same decay everywhere.
    Plain,
    /// Decay modulated by the difference of neighbouring normals.
    #[default]
    Curvature,
    /// Decay modulated by the L1 distance between neighbouring positions.
    Distance,
}

impl FilterMode {
    /// Does this mode need a domain transform?
    pub fn is_weighted(self) -> bool {
        !matches!(self, FilterMode::Plain)
    }
}

/// Options for [`filter`].
#[derive(Debug, Clone)]
pub struct FilterOptions {
    /// Number of filter iterations.
    pub iterations: usize,

    /// Spatial factor: the reach of the filter, in cells.
    pub spatial_factor: f64,

    /// Range factor: how strongly features resist smoothing in weighted
    /// modes. Smaller values preserve more.
    pub range_factor: f64,

    /// Filter mode.
    pub mode: FilterMode,

    /// Blur normals before building the curvature transform.
    pub normals_blur: Option<NormalsBlur>,

    /// Blur the raw curvature transform before mapping it to weights.
    pub domain_blur: Option<DomainBlur>,

    /// Whether to use parallel execution (default: true).
    pub parallel: bool,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            iterations: 3,
            spatial_factor: 50.0,
            range_factor: 0.2,
            mode: FilterMode::Curvature,
            normals_blur: None,
            domain_blur: Some(DomainBlur::default()),
            parallel: true,
        }
    }
}

impl FilterOptions {
    /// Create options with the specified number of iterations.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Create options with the specified spatial factor.
    pub fn with_spatial_factor(mut self, spatial_factor: f64) -> Self {
        self.spatial_factor = spatial_factor;
        self
    }

    /// Create options with the specified range factor.
    pub fn with_range_factor(mut self, range_factor: f64) -> Self {
        self.range_factor = range_factor;
        self
    }

    /// Create options with the specified mode.
    pub fn with_mode(mut self, mode: FilterMode) -> Self {
        self.mode = mode;
        self
    }

    /// Blur normals before building the curvature transform.
    pub fn with_normals_blur(mut self, blur: NormalsBlur) -> Self {
        self.normals_blur = Some(blur);
        self
    }

    /// Set or disable the blur of the raw curvature transform.
    pub fn with_domain_blur(mut self, blur: Option<DomainBlur>) -> Self {
        self.domain_blur = blur;
        self
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Create options for single-threaded execution.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Check user-supplied parameters.
    ///
    /// [`filter`] trusts its options; call this on anything coming from
    /// outside the program first.
    pub fn validate(&self) -> Result<()> {
        if !self.spatial_factor.is_finite() || self.spatial_factor < 0.0 {
            return Err(GimError::invalid_param(
                "spatial_factor",
                self.spatial_factor,
                "must be finite and non-negative",
            ));
        }
        if self.mode.is_weighted() && !(self.range_factor.is_finite() && self.range_factor > 0.0) {
            return Err(GimError::invalid_param(
                "range_factor",
                self.range_factor,
                "must be finite and positive in weighted modes",
            ));
        }
        if let Some(blur) = &self.normals_blur {
            if blur.mode.is_weighted() {
                return Err(GimError::invalid_param(
                    "normals_blur.mode",
                    format!("{:?}", blur.mode),
                    "normals can only be blurred in plain mode",
                ));
            }
            if !blur.spatial_factor.is_finite() || blur.spatial_factor < 0.0 {
                return Err(GimError::invalid_param(
                    "normals_blur.spatial_factor",
                    blur.spatial_factor,
                    "must be finite and non-negative",
                ));
            }
        }
        if let Some(blur) = &self.domain_blur {
            if !blur.spatial_factor.is_finite() || blur.spatial_factor < 0.0 {
                return Err(GimError::invalid_param(
                    "domain_blur.spatial_factor",
                    blur.spatial_factor,
                    "must be finite and non-negative",
                ));
            }
        }
        Ok(())
    }
}

/// Filter a geometry image.
///
/// Returns a new image; `input` is not modified. The result carries no
/// normals. See the [module documentation](self) for the modes.
pub fn filter(input: &GeometryImage, options: &FilterOptions) -> GeometryImage {
    filter_with_progress(input, options, &Progress::none())
}

/// Filter a geometry image with progress reporting.
///
/// Reports one step per iteration.
pub fn filter_with_progress(
    input: &GeometryImage,
    options: &FilterOptions,
    progress: &Progress,
) -> GeometryImage {
    debug_assert!(options.validate().is_ok(), "invalid filter options: {:?}", options);

    let start = Instant::now();
    let size = input.size();
    let total = options.iterations;
    log::info!(
        "Filtering {}x{} geometry image ({:?}, {} iterations, spatial {}, range {})",
        size,
        size,
        options.mode,
        total,
        options.spatial_factor,
        options.range_factor
    );

    let mut positions = input.positions().clone();
    if total == 0 {
        return GeometryImage::from_filtered(positions);
    }

    let filter = RecursiveFilter::new(size, options.spatial_factor, total)
        .with_parallel(options.parallel);
    let domain = build_domain_transform(input, options, filter.plan());

    for iteration in 0..total {
        progress.report(iteration, total, "Filtering");
        filter.run_iteration(&mut positions, iteration, domain.as_ref());
        log::debug!("Iteration {}/{} done", iteration + 1, total);
    }
    progress.report(total, total, "Filtering");

    log::info!("Filtered in {:.2?}", start.elapsed());
    GeometryImage::from_filtered(positions)
}

fn build_domain_transform(
    input: &GeometryImage,
    options: &FilterOptions,
    plan: &SweepPlan,
) -> Option<DomainTransform> {
    let raw = match options.mode {
        FilterMode::Plain => return None,
        FilterMode::Distance => DomainTransform::positional(plan, input.positions()),
        FilterMode::Curvature => {
            let normals: Cow<'_, Grid<Vector4<f64>>> = match input.normals() {
                Some(normals) => Cow::Borrowed(normals),
                None => {
                    log::debug!("No normals supplied, computing them from positions");
                    let mesh = GimMesh::from_geometry_image(input);
                    Cow::Owned(mesh.cell_normals(input.size()))
                }
            };
            let normals = match &options.normals_blur {
                Some(blur) => {
                    log::debug!("Blurring normals ({} iterations)", blur.iterations);
                    Cow::Owned(blur_normals(&normals, blur, options.parallel))
                }
                None => normals,
            };

            let mut raw = DomainTransform::curvature(plan, &normals);
            if let Some(blur) = &options.domain_blur {
                log::debug!("Blurring domain transform ({} iterations)", blur.iterations);
                raw.blur(blur, options.parallel);
            }
            raw
        }
    };
    Some(raw.into_weights(options.spatial_factor, options.range_factor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::noise::{add_noise, NoiseOptions};
    use crate::gim::shapes;
    use nalgebra::Point3;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn noisy_sphere(size: usize) -> GeometryImage {
        let sphere = shapes::octahedral_sphere(size, 1.0);
        add_noise(&sphere, &NoiseOptions::default().with_intensity(0.05).with_seed(7))
    }

    #[test]
    fn test_zero_spatial_factor_returns_input() {
        let input = noisy_sphere(9);
        for mode in [FilterMode::Plain, FilterMode::Curvature, FilterMode::Distance] {
            let options = FilterOptions::default()
                .with_mode(mode)
                .with_spatial_factor(0.0)
                .with_iterations(3);
            let output = filter(&input, &options);
            assert_eq!(output.positions(), input.positions(), "{:?}", mode);
        }
    }

    #[test]
    fn test_border_invariant_is_preserved() {
        for size in [3, 5, 7, 9, 15] {
            let input = noisy_sphere(size);
            assert!(input.border_mismatches(0.0).is_empty());

            for mode in [FilterMode::Plain, FilterMode::Curvature, FilterMode::Distance] {
                let options = FilterOptions::default()
                    .with_mode(mode)
                    .with_spatial_factor(3.0)
                    .with_range_factor(0.3);
                let output = filter(&input, &options);
                let mismatches = output.border_mismatches(1e-5);
                assert!(mismatches.is_empty(), "size {} {:?}: {:?}", size, mode, mismatches);
            }
        }
    }

    #[test]
    fn test_constant_image_is_unchanged() {
        let c = Point3::new(1.5, -2.0, 0.25);
        let input = GeometryImage::new(Grid::new(7, 7, c)).unwrap();
        let options = FilterOptions::default()
            .with_mode(FilterMode::Plain)
            .with_spatial_factor(10.0)
            .with_iterations(4);
        let output = filter(&input, &options);
        for p in output.positions().iter() {
            assert!((p - c).norm() < 1e-12);
        }
    }

    #[test]
    fn test_bump_spreads_to_neighbours() {
        let size = 5;
        let mut positions = Grid::new(size, size, Point3::origin());
        positions[(1, 1)] = Point3::new(0.0, 1.0, 0.0);
        let input = GeometryImage::new(positions).unwrap();

        let options = FilterOptions::default()
            .with_mode(FilterMode::Plain)
            .with_spatial_factor(0.5)
            .with_iterations(1);
        let output = filter(&input, &options);

        let bump = output.position(1, 1).y;
        assert!(bump > 0.0 && bump < 1.0, "bump {}", bump);
        for (x, y) in [(0, 1), (2, 1), (1, 0), (1, 2)] {
            let v = output.position(x, y).y;
            assert!(v > 0.0 && v < bump, "({}, {}) = {}", x, y, v);
        }
        // Only the y component was ever non-zero.
        assert!(output.positions().iter().all(|p| p.x == 0.0 && p.z == 0.0));
        assert!(output.border_mismatches(0.0).is_empty());
    }

    /// A raised square plateau with a crease around it.
    fn plateau(size: usize) -> GeometryImage {
        let centre = size / 2;
        let inside = |x: usize, y: usize| x.abs_diff(centre) <= 2 && y.abs_diff(centre) <= 2;
        let positions = Grid::from_fn(size, size, |x, y| {
            Point3::new(0.0, if inside(x, y) { 1.0 } else { 0.0 }, 0.0)
        });
        let normals = Grid::from_fn(size, size, |x, y| {
            if inside(x, y) {
                Vector4::new(0.0, 1.0, 0.0, 0.0)
            } else {
                Vector4::new(1.0, 0.0, 0.0, 0.0)
            }
        });
        GeometryImage::new(positions)
            .and_then(|gim| gim.with_normals(normals))
            .unwrap()
    }

    #[test]
    fn test_curvature_mode_preserves_crease() {
        let size = 11;
        let input = plateau(size);
        let base = FilterOptions::default()
            .with_spatial_factor(2.0)
            .with_range_factor(0.05)
            .with_iterations(3)
            .with_domain_blur(None);

        let plain = filter(&input, &base.clone().with_mode(FilterMode::Plain));
        let curvature = filter(&input, &base.with_mode(FilterMode::Curvature));

        // Step across the plateau boundary on the centre row.
        let step = |gim: &GeometryImage| gim.position(7, 5).y - gim.position(8, 5).y;
        assert!(step(&curvature) > step(&plain), "{} vs {}", step(&curvature), step(&plain));
        assert!(step(&curvature) > 0.9);
    }

    #[test]
    fn test_curvature_mode_computes_missing_normals() {
        let input = shapes::octahedral_cube(9, 1.0);
        assert!(input.normals().is_none());
        let options = FilterOptions::default()
            .with_spatial_factor(2.0)
            .with_normals_blur(NormalsBlur::default());
        let output = filter(&input, &options);
        assert!(output.normals().is_none());
        assert!(output.positions().iter().all(|p| p.coords.iter().all(|c| c.is_finite())));
    }

    #[test]
    fn test_zero_iterations_copies_input() {
        let input = noisy_sphere(7);
        let output = filter(&input, &FilterOptions::default().with_iterations(0));
        assert_eq!(output.positions(), input.positions());
    }

    #[test]
    fn test_progress_reports_every_iteration() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let progress = Progress::new(move |_, _, _| {
            counter.fetch_add(1, Ordering::Relaxed);
        });

        let options = FilterOptions::default()
            .with_mode(FilterMode::Plain)
            .with_spatial_factor(1.0)
            .with_iterations(4);
        filter_with_progress(&noisy_sphere(5), &options, &progress);
        assert_eq!(calls.load(Ordering::Relaxed), 5);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let input = noisy_sphere(13);
        let options = FilterOptions::default().with_spatial_factor(3.0);
        let parallel = filter(&input, &options);
        let sequential = filter(&input, &options.clone().sequential());
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_validate_rejects_bad_parameters() {
        assert!(FilterOptions::default().validate().is_ok());
        assert!(FilterOptions::default().with_spatial_factor(-1.0).validate().is_err());
        assert!(FilterOptions::default().with_range_factor(0.0).validate().is_err());
        assert!(FilterOptions::default()
            .with_mode(FilterMode::Plain)
            .with_range_factor(0.0)
            .validate()
            .is_ok());

        let weighted_blur = NormalsBlur {
            mode: FilterMode::Distance,
            ..NormalsBlur::default()
        };
        let err = FilterOptions::default()
            .with_normals_blur(weighted_blur)
            .validate()
            .unwrap_err();
        assert!(matches!(err, GimError::InvalidParameter { name: "normals_blur.mode", .. }));
    }
}
