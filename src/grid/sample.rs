//! Cell values the recursive filter can blend.

use nalgebra::{Point, SVector};

/// A cell value that can be linearly blended.
///
/// The recursive filter only needs a zero, scaling by a real factor, and
/// addition. Implemented for `f64`, fixed-size `nalgebra` vectors and points,
/// which covers scalar fields, normals and positions.
pub trait Sample: Copy + Send + Sync + 'static {
    /// The additive identity.
    fn zero() -> Self;

    /// Multiply by a scalar.
    fn scaled(self, factor: f64) -> Self;

    /// Component-wise sum.
    fn plus(self, other: Self) -> Self;

    /// Euclidean distance between two values.
    fn distance(&self, other: &Self) -> f64;
}

impl Sample for f64 {
    #[inline]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn scaled(self, factor: f64) -> Self {
        self * factor
    }

    #[inline]
    fn plus(self, other: Self) -> Self {
        self + other
    }

    #[inline]
    fn distance(&self, other: &Self) -> f64 {
        (self - other).abs()
    }
}

impl<const D: usize> Sample for SVector<f64, D> {
    #[inline]
    fn zero() -> Self {
        SVector::zeros()
    }

    #[inline]
    fn scaled(self, factor: f64) -> Self {
        self * factor
    }

    #[inline]
    fn plus(self, other: Self) -> Self {
        self + other
    }

    #[inline]
    fn distance(&self, other: &Self) -> f64 {
        (self - other).norm()
    }
}

impl<const D: usize> Sample for Point<f64, D> {
    #[inline]
    fn zero() -> Self {
        Point::origin()
    }

    #[inline]
    fn scaled(self, factor: f64) -> Self {
        Point::from(self.coords * factor)
    }

    #[inline]
    fn plus(self, other: Self) -> Self {
        Point::from(self.coords + other.coords)
    }

    #[inline]
    fn distance(&self, other: &Self) -> f64 {
        (self - other).norm()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Point3, Vector4};

    #[test]
    fn test_point_blend() {
        let a = Point3::new(1.0, 2.0, 3.0);
        let b = Point3::new(3.0, 2.0, 1.0);
        let mid = a.scaled(0.5).plus(b.scaled(0.5));
        assert_eq!(mid, Point3::new(2.0, 2.0, 2.0));
        assert_eq!(Point3::<f64>::zero(), Point3::origin());
    }

    #[test]
    fn test_vector_distance() {
        let a = Vector4::new(1.0, 0.0, 0.0, 0.0);
        let b = Vector4::new(0.0, 1.0, 0.0, 0.0);
        assert!((a.distance(&b) - 2.0_f64.sqrt()).abs() < 1e-12);
        assert_eq!(3.0_f64.distance(&-1.0), 4.0);
    }
}
