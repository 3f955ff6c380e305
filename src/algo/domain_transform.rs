//! Domain transform: per-adjacency weights for anisotropic filtering.
//!
//! The transform holds one weight for every adjacency the recursive filter
//! crosses, stored in two fields: `horizontal[y][x]` for the adjacency
//! between `(x - 1, y)` and `(x, y)`, and `vertical[y][x]` for the adjacency
//! between `(x, y - 1)` and `(x, y)`. Weights are filled by walking the very
//! loops the filter walks (see [`SweepPlan`]), so each filter step reads the
//! weight computed for the same two cells.
//!
//! Raw values are distances between the two cells. They are mapped to
//! weights `1 + (spatial / range) * d`; raising the decay factor to a weight
//! above one shortens the reach of the filter across that adjacency.

use nalgebra::{Point3, Vector4};

use crate::algo::recursive::{Edge, RecursiveFilter, SweepPlan};
use crate::grid::Grid;

/// Pre-smoothing of the raw domain transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DomainBlur {
    /// Spatial factor of the blur.
    pub spatial_factor: f64,
    /// Number of blur iterations.
    pub iterations: usize,
}

impl Default for DomainBlur {
    fn default() -> Self {
        Self {
            spatial_factor: 0.8,
            iterations: 10,
        }
    }
}

impl DomainBlur {
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

/// Horizontal and vertical adjacency fields of a chart.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainTransform {
    horizontal: Grid<f64>,
    vertical: Grid<f64>,
}

impl DomainTransform {
    /// A transform with every field value set to `value`.
    pub fn uniform(size: usize, value: f64) -> Self {
        Self {
            horizontal: Grid::new(size, size, value),
            vertical: Grid::new(size, size, value),
        }
    }

    /// Raw distances over every adjacency crossed by `plan`.
    ///
    /// `distance(a, b)` receives the linear indices of the cell a loop leaves
    /// and the cell it enters. Adjacencies lying along the glued border are
    /// written to both of their mirrored slots. The slots no loop crosses,
    /// column 0 of `horizontal` and row 0 of `vertical`, take the value of
    /// the adjacency they are glued to.
    pub fn from_distances<F>(plan: &SweepPlan, distance: F) -> Self
    where
        F: Fn(usize, usize) -> f64,
    {
        let mut dt = Self::uniform(plan.size(), 0.0);
        for (_, paths) in plan.passes() {
            for path in paths {
                let steps = path.steps();
                let len = steps.len();
                for (k, step) in steps.iter().enumerate() {
                    let prev = steps[(k + len - 1) % len].cell;
                    dt.set_mirrored(step.edge, distance(prev, step.cell));
                }
            }
        }
        dt.fill_glued_slots();
        dt
    }

    /// Raw normal differences `|normalize(n_a) - normalize(n_b)|`.
    pub fn curvature(plan: &SweepPlan, normals: &Grid<Vector4<f64>>) -> Self {
        debug_assert_eq!(normals.width(), plan.size());
        let unit: Vec<Vector4<f64>> = normals.iter().map(normalized).collect();
        Self::from_distances(plan, |a, b| (unit[a] - unit[b]).norm())
    }

    /// Raw L1 distances between adjacent positions.
    pub fn positional(plan: &SweepPlan, positions: &Grid<Point3<f64>>) -> Self {
        debug_assert_eq!(positions.width(), plan.size());
        let cells = positions.as_slice();
        Self::from_distances(plan, |a, b| (cells[a] - cells[b]).abs().sum())
    }

    /// Side length of the chart.
    pub fn size(&self) -> usize {
        self.horizontal.width()
    }

    /// The horizontal field.
    pub fn horizontal(&self) -> &Grid<f64> {
        &self.horizontal
    }

    /// The vertical field.
    pub fn vertical(&self) -> &Grid<f64> {
        &self.vertical
    }

    /// Value stored for one adjacency.
    #[inline]
    pub fn weight(&self, edge: Edge) -> f64 {
        match edge {
            Edge::Horizontal(slot) => self.horizontal.as_slice()[slot],
            Edge::Vertical(slot) => self.vertical.as_slice()[slot],
        }
    }

    /// Smooth both fields with the plain recursive filter.
    ///
    /// The filter glues the fields like cells, pairing border slot `x` with
    /// `n - 1 - x`, while border adjacencies are glued `x` with `n - x`.
    /// Each mirrored pair is averaged afterwards, which mixes the weights of
    /// neighbouring border adjacencies by up to one slot.
    pub fn blur(&mut self, blur: &DomainBlur, parallel: bool) {
        let filter = RecursiveFilter::new(self.size(), blur.spatial_factor, blur.iterations)
            .with_parallel(parallel);
        filter.run(&mut self.horizontal, None);
        filter.run(&mut self.vertical, None);
        self.pair_border_slots();
        self.fill_glued_slots();
    }

    /// Map raw distances to weights `1 + (spatial / range) * d`.
    pub fn into_weights(mut self, spatial_factor: f64, range_factor: f64) -> Self {
        debug_assert!(range_factor > 0.0, "range factor must be positive");
        let ratio = spatial_factor / range_factor;
        for d in self
            .horizontal
            .as_mut_slice()
            .iter_mut()
            .chain(self.vertical.as_mut_slice().iter_mut())
        {
            *d = 1.0 + ratio * *d;
        }
        self
    }

    fn set_mirrored(&mut self, edge: Edge, value: f64) {
        let size = self.size();
        for slot in [Some(edge), mirrored_slot(size, edge)].into_iter().flatten() {
            match slot {
                Edge::Horizontal(i) => self.horizontal.as_mut_slice()[i] = value,
                Edge::Vertical(i) => self.vertical.as_mut_slice()[i] = value,
            }
        }
    }

    /// `horizontal[y][0]` is the adjacency left of `(0, y)`, glued to the one
    /// right of `(0, n - 1 - y)`; `vertical[0][x]` likewise.
    fn fill_glued_slots(&mut self) {
        let n = self.size();
        for y in 0..n {
            let h = self.horizontal.as_mut_slice();
            h[y * n] = h[(n - 1 - y) * n + 1];
        }
        for x in 0..n {
            let v = self.vertical.as_mut_slice();
            v[x] = v[n + n - 1 - x];
        }
    }

    fn pair_border_slots(&mut self) {
        let n = self.size();
        for row in [0, n - 1] {
            for x in 1..=n / 2 {
                let (a, b) = (row * n + x, row * n + n - x);
                let h = self.horizontal.as_mut_slice();
                let mean = 0.5 * (h[a] + h[b]);
                h[a] = mean;
                h[b] = mean;
            }
        }
        for column in [0, n - 1] {
            for y in 1..=n / 2 {
                let (a, b) = (y * n + column, (n - y) * n + column);
                let v = self.vertical.as_mut_slice();
                let mean = 0.5 * (v[a] + v[b]);
                v[a] = mean;
                v[b] = mean;
            }
        }
    }
}

/// The slot of the adjacency glued to `edge`, if `edge` runs along the border.
fn mirrored_slot(size: usize, edge: Edge) -> Option<Edge> {
    let last = size - 1;
    match edge {
        Edge::Horizontal(i) => {
            let (x, y) = (i % size, i / size);
            (x >= 1 && (y == 0 || y == last)).then(|| Edge::Horizontal(y * size + size - x))
        }
        Edge::Vertical(i) => {
            let (x, y) = (i % size, i / size);
            (y >= 1 && (x == 0 || x == last)).then(|| Edge::Vertical((size - y) * size + x))
        }
    }
}

fn normalized(n: &Vector4<f64>) -> Vector4<f64> {
    let len = n.norm();
    if len > 1e-12 {
        n / len
    } else {
        *n
    }
}

/// Per-cell curvature estimate from normal differences.
///
/// The value of a cell is the mean of the raw horizontal and vertical
/// normal differences stored at that cell. Useful for visualization and
/// statistics; the filter does not use it.
pub fn curvature_map(normals: &Grid<Vector4<f64>>) -> Grid<f64> {
    let plan = SweepPlan::new(normals.width());
    let raw = DomainTransform::curvature(&plan, normals);
    Grid::from_fn(normals.width(), normals.height(), |x, y| {
        0.5 * (raw.horizontal[(x, y)] + raw.vertical[(x, y)])
    })
}
