//! Wavefront OBJ export.
//!
//! The image is written as its welded triangulation (see [`GimMesh`]), with
//! one `vn` normal per vertex.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;
use crate::gim::{GeometryImage, GimMesh};

/// Save the welded mesh of a geometry image as OBJ.
///
/// # Example
///
/// ```no_run
/// use gimsmooth::gim::shapes;
/// use gimsmooth::io::obj;
///
/// obj::save(&shapes::octahedral_sphere(33, 1.0), "sphere.obj").unwrap();
/// ```
pub fn save<P: AsRef<Path>>(gim: &GeometryImage, path: P) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    write(gim, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Write the welded mesh of a geometry image as OBJ text.
pub fn write<W: Write>(gim: &GeometryImage, writer: &mut W) -> Result<()> {
    let mesh = GimMesh::from_geometry_image(gim);

    writeln!(writer, "# geometry image {}x{}", gim.size(), gim.size())?;
    writeln!(
        writer,
        "# {} vertices, {} faces",
        mesh.num_vertices(),
        mesh.num_triangles()
    )?;

    for p in mesh.vertices() {
        writeln!(writer, "v {} {} {}", p.x, p.y, p.z)?;
    }
    for n in mesh.normals() {
        writeln!(writer, "vn {} {} {}", n.x, n.y, n.z)?;
    }
    // OBJ indices are 1-based.
    for &[a, b, c] in mesh.triangles() {
        writeln!(writer, "f {0}//{0} {1}//{1} {2}//{2}", a + 1, b + 1, c + 1)?;
    }

    Ok(())
}
