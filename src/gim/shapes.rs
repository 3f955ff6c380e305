//! Synthetic geometry images.
//!
//! These shapes use the octahedral parametrization of the sphere: the square
//! chart is unfolded from an octahedron, which gives exactly the mirrored
//! border gluing a spherical geometry image requires. They are handy for
//! tests, benchmarks and for trying the filters without a parametrization
//! pipeline.

use nalgebra::{Point3, Vector3};

use super::{validate_shape, GeometryImage};
use crate::grid::Grid;

/// Build a geometry image by mapping every chart direction to a position.
///
/// `f` receives the unit direction of the octahedral parametrization for each
/// cell. As long as `f` is a function of the direction alone the result
/// satisfies the border invariant exactly.
///
/// # Panics
///
/// Panics if `size` is even or smaller than 3.
pub fn from_directions<F>(size: usize, f: F) -> GeometryImage
where
    F: Fn(&Vector3<f64>) -> Point3<f64>,
{
    assert!(
        validate_shape(size, size).is_ok(),
        "geometry image side must be odd and at least 3, got {}",
        size
    );
    let positions = Grid::from_fn(size, size, |x, y| f(&octahedral_direction(size, x, y)));
    GeometryImage::from_filtered(positions)
}

/// A sphere of the given radius centred at the origin.
///
/// # Panics
///
/// Panics if `size` is even or smaller than 3.
pub fn octahedral_sphere(size: usize, radius: f64) -> GeometryImage {
    from_directions(size, |d| Point3::from(d * radius))
}

/// An axis-aligned cube with the given half extent, centred at the origin.
///
/// The sphere directions are projected radially onto the cube, so the surface
/// has sharp edges and corners. Useful for exercising feature preservation.
///
/// # Panics
///
/// Panics if `size` is even or smaller than 3.
pub fn octahedral_cube(size: usize, half_extent: f64) -> GeometryImage {
    from_directions(size, |d| {
        let scale = d.x.abs().max(d.y.abs()).max(d.z.abs());
        Point3::from(d * (half_extent / scale))
    })
}

/// Unit direction of cell `(x, y)` under the octahedral map.
fn octahedral_direction(size: usize, x: usize, y: usize) -> Vector3<f64> {
    let last = (size - 1) as f64;
    // Integer numerators keep mirrored cells exactly opposite.
    let u = (2.0 * x as f64 - last) / last;
    let v = (2.0 * y as f64 - last) / last;
    let z = 1.0 - u.abs() - v.abs();

    let (px, py) = if z >= 0.0 {
        (u, v)
    } else {
        ((1.0 - v.abs()) * u.signum(), (1.0 - u.abs()) * v.signum())
    };

    Vector3::new(px, py, z).normalize()
}
