//! Geometry images.
//!
//! A [`GeometryImage`] is a closed genus-0 surface resampled onto an `n × n`
//! grid of positions, with `n` odd. Connectivity is implicit: grid neighbours
//! are surface neighbours, and the border is glued to itself as described in
//! [`crate::grid::mirror`].
//!
//! # Example
//!
//! ```
//! use gimsmooth::gim::{shapes, GeometryImage};
//!
//! let mut gim: GeometryImage = shapes::octahedral_sphere(9, 1.0);
//! assert_eq!(gim.size(), 9);
//! assert!(gim.normals().is_none());
//!
//! gim.update_normals();
//! assert!(gim.normals().is_some());
//! ```

mod mesh;
pub mod shapes;

use nalgebra::{Point3, Vector4};

use crate::error::{GimError, Result};
use crate::grid::{self, BorderMismatch, Grid};

pub use mesh::GimMesh;

/// A square, odd-sized grid of surface positions with optional per-cell normals.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryImage {
    positions: Grid<Point3<f64>>,
    normals: Option<Grid<Vector4<f64>>>,
}

impl GeometryImage {
    /// Create a geometry image from a position grid.
    ///
    /// Fails unless the grid is square with an odd side of at least 3.
    pub fn new(positions: Grid<Point3<f64>>) -> Result<Self> {
        validate_shape(positions.width(), positions.height())?;
        Ok(Self {
            positions,
            normals: None,
        })
    }

    /// Attach a normals grid of the same dimensions.
    pub fn with_normals(mut self, normals: Grid<Vector4<f64>>) -> Result<Self> {
        if !normals.same_shape(&self.positions) {
            return Err(GimError::NormalsMismatch {
                positions: self.size(),
                normals: normals.width().max(normals.height()),
            });
        }
        self.normals = Some(normals);
        Ok(self)
    }

    /// Wrap a position grid already known to be valid.
    pub(crate) fn from_filtered(positions: Grid<Point3<f64>>) -> Self {
        debug_assert!(validate_shape(positions.width(), positions.height()).is_ok());
        Self {
            positions,
            normals: None,
        }
    }

    /// Side length of the grid.
    #[inline]
    pub fn size(&self) -> usize {
        self.positions.width()
    }

    /// Index of the centre row and column.
    #[inline]
    pub fn half(&self) -> usize {
        self.size() / 2
    }

    /// The position grid.
    #[inline]
    pub fn positions(&self) -> &Grid<Point3<f64>> {
        &self.positions
    }

    /// Mutable access to the position grid.
    ///
    /// Any stored normals are dropped since they no longer describe the surface.
    pub fn positions_mut(&mut self) -> &mut Grid<Point3<f64>> {
        self.normals = None;
        &mut self.positions
    }

    /// Consume the image and return its position grid.
    pub fn into_positions(self) -> Grid<Point3<f64>> {
        self.positions
    }

    /// The per-cell normals, if computed or supplied.
    #[inline]
    pub fn normals(&self) -> Option<&Grid<Vector4<f64>>> {
        self.normals.as_ref()
    }

    /// Position at cell `(x, y)`.
    #[inline]
    pub fn position(&self, x: usize, y: usize) -> &Point3<f64> {
        self.positions.get(x, y)
    }

    /// Recompute per-cell normals from the positions.
    ///
    /// Builds the welded triangulation of the image and stores the
    /// area-weighted vertex normal of every cell (with `w = 0`).
    pub fn update_normals(&mut self) {
        let mesh = GimMesh::from_geometry_image(self);
        self.normals = Some(mesh.cell_normals(self.size()));
    }

    /// Axis-aligned bounding box of the positions.
    pub fn bounding_box(&self) -> (Point3<f64>, Point3<f64>) {
        let mut min = Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
        let mut max = Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in self.positions.iter() {
            min = min.inf(p);
            max = max.sup(p);
        }
        (min, max)
    }

    /// Glued border cells whose positions differ by more than `tolerance`.
    pub fn border_mismatches(&self, tolerance: f64) -> Vec<BorderMismatch> {
        grid::check_borders(&self.positions, tolerance)
    }
}

/// Check the dimensions required of a geometry image.
pub fn validate_shape(width: usize, height: usize) -> Result<()> {
    if width != height {
        return Err(GimError::NotSquare { width, height });
    }
    if width < 3 || width % 2 == 0 {
        return Err(GimError::InvalidSize { size: width });
    }
    Ok(())
}
