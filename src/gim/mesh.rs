//! Triangle mesh view of a geometry image.
//!
//! Glued border cells are welded into a single vertex, so the resulting mesh
//! is closed. Grid quads are split along the diagonal parallel to the
//! octahedron edge of their quadrant, the diamond joining the midpoints of
//! the chart sides. The triangulation is then symmetric under the border
//! gluing and closed for every odd size, including 3 where the mesh is the
//! octahedron itself. Triangles that collapse after welding are dropped.

use std::collections::HashSet;

use nalgebra::{Point3, Vector3, Vector4};

use super::GeometryImage;
use crate::grid::{mirror, Grid};

/// A welded triangle mesh built from a geometry image.
#[derive(Debug, Clone)]
pub struct GimMesh {
    vertices: Vec<Point3<f64>>,
    triangles: Vec<[usize; 3]>,
    normals: Vec<Vector3<f64>>,
    cell_vertex: Vec<usize>,
}

impl GimMesh {
    /// Triangulate a geometry image and compute vertex normals.
    pub fn from_geometry_image(gim: &GeometryImage) -> Self {
        let size = gim.size();
        let positions = gim.positions();

        // Canonical cells come first in row-major order, so each glued set
        // creates its vertex on its first visit.
        let mut vertices = Vec::new();
        let mut cell_vertex = vec![usize::MAX; size * size];
        for index in 0..size * size {
            let canonical = mirror::identified_index(size, index).canonical();
            if canonical == index {
                cell_vertex[index] = vertices.len();
                vertices.push(positions.as_slice()[index]);
            } else {
                cell_vertex[index] = cell_vertex[canonical];
            }
        }

        let vertex = |x: usize, y: usize| cell_vertex[y * size + x];
        let half = size / 2;
        let mut triangles = Vec::with_capacity(2 * (size - 1) * (size - 1));
        for y in 0..size - 1 {
            for x in 0..size - 1 {
                let bottom_left = vertex(x, y);
                let top_left = vertex(x, y + 1);
                let bottom_right = vertex(x + 1, y);
                let top_right = vertex(x + 1, y + 1);

                // Lower-left and upper-right quadrants cut bottom-right to
                // top-left; the other two cut bottom-left to top-right.
                let split = if (x < half) == (y < half) {
                    [
                        [bottom_left, bottom_right, top_left],
                        [bottom_right, top_right, top_left],
                    ]
                } else {
                    [
                        [bottom_left, top_right, top_left],
                        [bottom_left, bottom_right, top_right],
                    ]
                };
                for triangle in split {
                    let [a, b, c] = triangle;
                    if a != b && b != c && a != c {
                        triangles.push(triangle);
                    }
                }
            }
        }

        let normals = vertex_normals(&vertices, &triangles);

        Self {
            vertices,
            triangles,
            normals,
            cell_vertex,
        }
    }

    /// Number of welded vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// Welded vertex positions.
    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    /// Triangles as vertex index triples.
    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    /// Unit vertex normals (zero for isolated or degenerate vertices).
    pub fn normals(&self) -> &[Vector3<f64>] {
        &self.normals
    }

    /// Vertex index of grid cell at linear `index`.
    pub fn cell_vertex(&self, index: usize) -> usize {
        self.cell_vertex[index]
    }

    /// Euler characteristic `V - E + F`; 2 for a closed sphere-like surface.
    pub fn euler_characteristic(&self) -> i64 {
        let mut edges = HashSet::with_capacity(self.triangles.len() * 3 / 2);
        for &[a, b, c] in &self.triangles {
            for (u, v) in [(a, b), (b, c), (c, a)] {
                edges.insert((u.min(v), u.max(v)));
            }
        }
        self.vertices.len() as i64 - edges.len() as i64 + self.triangles.len() as i64
    }

    /// Per-cell normals of a `size × size` image, as 4-vectors with `w = 0`.
    pub(crate) fn cell_normals(&self, size: usize) -> Grid<Vector4<f64>> {
        Grid::from_fn(size, size, |x, y| {
            let n = self.normals[self.cell_vertex[y * size + x]];
            Vector4::new(n.x, n.y, n.z, 0.0)
        })
    }
}

/// Area-weighted vertex normals.
fn vertex_normals(vertices: &[Point3<f64>], triangles: &[[usize; 3]]) -> Vec<Vector3<f64>> {
    let mut normals = vec![Vector3::zeros(); vertices.len()];

    for &[a, b, c] in triangles {
        let e1 = vertices[b] - vertices[a];
        let e2 = vertices[c] - vertices[a];
        let face_normal = e1.cross(&e2);

        normals[a] += face_normal;
        normals[b] += face_normal;
        normals[c] += face_normal;
    }

    for n in &mut normals {
        let len = n.norm();
        if len > 1e-12 {
            *n /= len;
        }
    }

    normals
}
