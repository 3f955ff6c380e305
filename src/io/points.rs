//! ASCII point cloud export: one `x y z` line per surface point.
//!
//! Glued border cells are one surface point and are written once.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;
use crate::gim::GeometryImage;
use crate::grid::mirror::identified_index;

/// Save the surface points of a geometry image.
pub fn save<P: AsRef<Path>>(gim: &GeometryImage, path: P) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    write(gim, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Write the surface points of a geometry image as text.
pub fn write<W: Write>(gim: &GeometryImage, writer: &mut W) -> Result<()> {
    let size = gim.size();
    for (index, p) in gim.positions().iter().enumerate() {
        if identified_index(size, index).canonical() == index {
            writeln!(writer, "{} {} {}", p.x, p.y, p.z)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gim::shapes;

    #[test]
    fn test_writes_each_surface_point_once() {
        let gim = shapes::octahedral_sphere(7, 1.0);
        let mut out = Vec::new();
        write(&gim, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 49 - 14 + 3);
        for line in lines {
            let coords: Vec<f64> = line.split(' ').map(|t| t.parse().unwrap()).collect();
            assert_eq!(coords.len(), 3);
            let r = coords.iter().map(|c| c * c).sum::<f64>().sqrt();
            assert!((r - 1.0).abs() < 1e-12);
        }
    }
}
