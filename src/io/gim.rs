//! Binary `.gim` format.
//!
//! A little-endian header of two `i32` (width, height) followed by
//! `width * height` position triples of `f32`, row by row.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use nalgebra::Point3;

use crate::error::{GimError, Result};
use crate::gim::{validate_shape, GeometryImage};
use crate::grid::Grid;

/// Load a geometry image from a `.gim` file.
///
/// # Example
///
/// ```no_run
/// use gimsmooth::io::gim;
///
/// let image = gim::load("bunny.gim").unwrap();
/// println!("{}x{}", image.size(), image.size());
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<GeometryImage> {
    let path = path.as_ref();
    let mut reader = BufReader::new(File::open(path)?);
    read(&mut reader).map_err(|e| match e {
        GimError::Io(io) if io.kind() == std::io::ErrorKind::UnexpectedEof => GimError::LoadError {
            path: path.to_path_buf(),
            message: "file is truncated".to_string(),
        },
        other => other,
    })
}

/// Save a geometry image to a `.gim` file.
///
/// Positions are narrowed to `f32`.
pub fn save<P: AsRef<Path>>(gim: &GeometryImage, path: P) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    write(gim, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Read a geometry image from any byte stream.
pub fn read<R: Read>(reader: &mut R) -> Result<GeometryImage> {
    let width = read_dimension(reader, "width")?;
    let height = read_dimension(reader, "height")?;

    validate_shape(width, height)?;

    // Read through `take` so a corrupt header cannot force a huge allocation.
    let expected = (width as u64).saturating_mul(height as u64).saturating_mul(12);
    let mut bytes = Vec::new();
    reader.take(expected).read_to_end(&mut bytes)?;
    if (bytes.len() as u64) < expected {
        return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
    }

    let positions: Vec<Point3<f64>> = bytes
        .chunks_exact(12)
        .map(|cell| {
            let coord = |i: usize| {
                f32::from_le_bytes([cell[i], cell[i + 1], cell[i + 2], cell[i + 3]]) as f64
            };
            Point3::new(coord(0), coord(4), coord(8))
        })
        .collect();

    GeometryImage::new(Grid::from_vec(width, height, positions)?)
}

/// Write a geometry image to any byte sink.
pub fn write<W: Write>(gim: &GeometryImage, writer: &mut W) -> Result<()> {
    let size = i32::try_from(gim.size())
        .map_err(|_| GimError::invalid_param("size", gim.size(), "too large for the .gim header"))?;
    writer.write_all(&size.to_le_bytes())?;
    writer.write_all(&size.to_le_bytes())?;

    for p in gim.positions().iter() {
        for c in [p.x, p.y, p.z] {
            writer.write_all(&(c as f32).to_le_bytes())?;
        }
    }
    Ok(())
}

fn read_dimension<R: Read>(reader: &mut R, name: &'static str) -> Result<usize> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    let value = i32::from_le_bytes(buf);
    usize::try_from(value).map_err(|_| GimError::invalid_param(name, value, "must not be negative"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gim::shapes;

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sphere.gim");
        let sphere = shapes::octahedral_sphere(9, 2.0);

        save(&sphere, &path).unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 8 + 81 * 12);

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.size(), 9);
        for (a, b) in loaded.positions().iter().zip(sphere.positions().iter()) {
            assert!((a - b).norm() < 1e-6);
        }
        assert!(loaded.border_mismatches(0.0).is_empty());
    }

    #[test]
    fn test_header_layout() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&3i32.to_le_bytes());
        bytes.extend_from_slice(&3i32.to_le_bytes());
        for i in 0..27 {
            bytes.extend_from_slice(&(i as f32).to_le_bytes());
        }

        let gim = read(&mut bytes.as_slice()).unwrap();
        assert_eq!(*gim.position(1, 0), Point3::new(3.0, 4.0, 5.0));
        assert_eq!(*gim.position(2, 2), Point3::new(24.0, 25.0, 26.0));
    }

    #[test]
    fn test_truncated_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.gim");
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&5i32.to_le_bytes());
        bytes.extend_from_slice(&5i32.to_le_bytes());
        bytes.extend_from_slice(&[0u8; 40]);
        std::fs::write(&path, bytes).unwrap();

        assert!(matches!(load(&path), Err(GimError::LoadError { .. })));
    }

    #[test]
    fn test_invalid_dimensions_are_rejected() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&4i32.to_le_bytes());
        bytes.extend_from_slice(&4i32.to_le_bytes());
        bytes.extend_from_slice(&[0u8; 16 * 12]);
        assert!(matches!(read(&mut bytes.as_slice()), Err(GimError::InvalidSize { size: 4 })));

        let mut negative = Vec::new();
        negative.extend_from_slice(&(-3i32).to_le_bytes());
        negative.extend_from_slice(&3i32.to_le_bytes());
        assert!(matches!(
            read(&mut negative.as_slice()),
            Err(GimError::InvalidParameter { name: "width", .. })
        ));
    }
}
