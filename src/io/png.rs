//! PNG visualizations.
//!
//! Positions are shown as colours: each coordinate axis is normalized to
//! `[0, 1]` over the image and mapped to one of the red, green and blue
//! channels. Scalar fields such as the curvature map are written as
//! normalized greyscale.

use std::path::Path;

use image::{GrayImage, Luma, Rgb, RgbImage};

use crate::error::{GimError, Result};
use crate::gim::GeometryImage;
use crate::grid::Grid;

/// Save the positions of a geometry image as a normalized RGB image.
pub fn save<P: AsRef<Path>>(gim: &GeometryImage, path: P) -> Result<()> {
    let path = path.as_ref();
    to_rgb(gim).save(path).map_err(|e| GimError::SaveError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Save a scalar field as a normalized greyscale image.
pub fn save_scalar_field<P: AsRef<Path>>(field: &Grid<f64>, path: P) -> Result<()> {
    let path = path.as_ref();
    to_gray(field).save(path).map_err(|e| GimError::SaveError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Colour image of the positions, one pixel per cell.
pub fn to_rgb(gim: &GeometryImage) -> RgbImage {
    let (min, max) = gim.bounding_box();
    let positions = gim.positions();
    RgbImage::from_fn(gim.size() as u32, gim.size() as u32, |x, y| {
        let p = positions[(x as usize, y as usize)];
        Rgb([
            channel(p.x, min.x, max.x),
            channel(p.y, min.y, max.y),
            channel(p.z, min.z, max.z),
        ])
    })
}

/// Greyscale image of a scalar field, one pixel per cell.
pub fn to_gray(field: &Grid<f64>) -> GrayImage {
    let (min, max) = field
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    GrayImage::from_fn(field.width() as u32, field.height() as u32, |x, y| {
        Luma([channel(field[(x as usize, y as usize)], min, max)])
    })
}

/// Map `value` from `[min, max]` to a byte; a flat range maps to mid-grey.
fn channel(value: f64, min: f64, max: f64) -> u8 {
    let range = max - min;
    let t = if range > 0.0 { (value - min) / range } else { 0.5 };
    (t.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gim::shapes;

    #[test]
    fn test_rgb_spans_full_range() {
        let gim = shapes::octahedral_sphere(9, 3.0);
        let img = to_rgb(&gim);
        assert_eq!(img.dimensions(), (9, 9));

        // The centre is the north pole: maximum z.
        assert_eq!(img.get_pixel(4, 4)[2], 255);
        // The corners are the south pole: minimum z.
        assert_eq!(img.get_pixel(0, 0)[2], 0);
    }

    #[test]
    fn test_flat_field_is_mid_grey() {
        let img = to_gray(&Grid::new(3, 3, 7.0));
        assert!(img.pixels().all(|p| p[0] == 128));
    }

    #[test]
    fn test_save_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sphere.png");
        save(&shapes::octahedral_sphere(5, 1.0), &path).unwrap();
        assert!(path.exists());
    }
}
