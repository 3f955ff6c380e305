//! Closed paths through the glued chart.
//!
//! Every sub-pass of the recursive filter walks a set of closed loops. A loop
//! is stored as a list of [`Step`]s; each step names the cell it enters and
//! the adjacency it crosses to get there, as a slot of the horizontal or
//! vertical domain-transform field.
//!
//! Slots follow one rule. Entering `(x, y)`:
//!
//! ```text
//! from (x - 1, y)  ->  horizontal[y][x]
//! from (x + 1, y)  ->  horizontal[y][x + 1]
//! from (x, y - 1)  ->  vertical[y][x]
//! from (x, y + 1)  ->  vertical[y + 1][x]
//! ```
//!
//! Step 0 crosses the adjacency closing the loop, from the last cell back to
//! the first. Each loop visits every glued cell set at most once, and the
//! loops of one sub-pass never share a cell set.

/// One adjacency slot of the domain-transform fields, as a linear index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Slot of the horizontal field.
    Horizontal(usize),
    /// Slot of the vertical field.
    Vertical(usize),
}

/// A cell of a loop together with the adjacency leading into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// Linear index of the entered cell.
    pub cell: usize,
    /// Adjacency crossed to enter the cell.
    pub edge: Edge,
}

/// A closed loop of cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedPath {
    steps: Vec<Step>,
}

impl ClosedPath {
    fn new(steps: Vec<Step>) -> Self {
        debug_assert!(!steps.is_empty());
        Self { steps }
    }

    /// The steps of the loop in walking order.
    #[inline]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Number of cells on the loop.
    #[inline]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always false for the loops of a sweep plan.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The same loop walked in the opposite direction.
    ///
    /// Step `j` of the result enters cell `L - 1 - j` of `self` through the
    /// adjacency that `self` crosses at step `(L - j) mod L`.
    pub fn reversed(&self) -> Self {
        let len = self.steps.len();
        let steps = (0..len)
            .map(|j| Step {
                cell: self.steps[len - 1 - j].cell,
                edge: self.steps[(len - j) % len].edge,
            })
            .collect();
        Self { steps }
    }
}

/// The four sub-passes of one filter iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubPass {
    /// Row loops, each joining row `i` with its mirror row `n - 1 - i`.
    Horizontal,
    /// Column loops, each joining column `j` with its mirror column.
    Vertical,
    /// The centre column closed through the top and bottom rows.
    CentreColumn,
    /// The centre row closed through the left and right columns.
    CentreRow,
}

impl SubPass {
    /// Sub-passes in execution order.
    pub const ORDER: [SubPass; 4] = [
        SubPass::Horizontal,
        SubPass::Vertical,
        SubPass::CentreColumn,
        SubPass::CentreRow,
    ];

    /// Short name used in log output.
    pub fn name(self) -> &'static str {
        match self {
            SubPass::Horizontal => "horizontal",
            SubPass::Vertical => "vertical",
            SubPass::CentreColumn => "centre column",
            SubPass::CentreRow => "centre row",
        }
    }
}

/// All loops of one filter iteration on a `size × size` chart.
#[derive(Debug, Clone)]
pub struct SweepPlan {
    size: usize,
    passes: Vec<(SubPass, Vec<ClosedPath>)>,
}

impl SweepPlan {
    /// Build the loops for a chart of odd side `size >= 3`.
    pub fn new(size: usize) -> Self {
        debug_assert!(size >= 3 && size % 2 == 1, "invalid chart size {}", size);
        let passes = SubPass::ORDER
            .iter()
            .map(|&pass| {
                let paths = match pass {
                    SubPass::Horizontal => row_loops(size),
                    SubPass::Vertical => column_loops(size),
                    SubPass::CentreColumn => vec![centre_column_loop(size)],
                    SubPass::CentreRow => vec![centre_row_loop(size)],
                };
                (pass, paths)
            })
            .collect();
        Self { size, passes }
    }

    /// Chart side length.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Sub-passes in execution order, each with its loops.
    pub fn passes(&self) -> &[(SubPass, Vec<ClosedPath>)] {
        &self.passes
    }

    /// Loops of one sub-pass.
    pub fn paths(&self, pass: SubPass) -> &[ClosedPath] {
        self.passes
            .iter()
            .find(|(p, _)| *p == pass)
            .map(|(_, paths)| paths.as_slice())
            .unwrap_or(&[])
    }
}

fn row_loops(n: usize) -> Vec<ClosedPath> {
    let h = n / 2;
    let at = |x: usize, y: usize| y * n + x;
    (1..h)
        .map(|i| {
            let m = n - 1 - i;
            let mut steps = Vec::with_capacity(2 * (n - 1));
            for j in 1..n {
                steps.push(Step {
                    cell: at(j, i),
                    edge: Edge::Horizontal(at(j, i)),
                });
            }
            for j in (0..n - 1).rev() {
                steps.push(Step {
                    cell: at(j, m),
                    edge: Edge::Horizontal(at(j + 1, m)),
                });
            }
            ClosedPath::new(steps)
        })
        .collect()
}

fn column_loops(n: usize) -> Vec<ClosedPath> {
    let h = n / 2;
    let at = |x: usize, y: usize| y * n + x;
    (1..h)
        .map(|j| {
            let m = n - 1 - j;
            let mut steps = Vec::with_capacity(2 * (n - 1));
            for i in 1..n {
                steps.push(Step {
                    cell: at(j, i),
                    edge: Edge::Vertical(at(j, i)),
                });
            }
            for i in (0..n - 1).rev() {
                steps.push(Step {
                    cell: at(m, i),
                    edge: Edge::Vertical(at(m, i + 1)),
                });
            }
            ClosedPath::new(steps)
        })
        .collect()
}

fn centre_column_loop(n: usize) -> ClosedPath {
    let h = n / 2;
    let last = n - 1;
    let at = |x: usize, y: usize| y * n + x;
    let mut steps = Vec::with_capacity(2 * n - 2);

    // Up the centre column. The closing step arrives at (h, 0) from the
    // bottom row, through the slot mirrored onto horizontal[0][h].
    for i in 0..n {
        let edge = if i == 0 {
            Edge::Horizontal(at(h, 0))
        } else {
            Edge::Vertical(at(h, i))
        };
        steps.push(Step { cell: at(h, i), edge });
    }
    // Right along the top row to the corner.
    for j in h + 1..n {
        steps.push(Step {
            cell: at(j, last),
            edge: Edge::Horizontal(at(j, last)),
        });
    }
    // Back along the bottom row, which continues from the shared corner.
    for j in (h + 1..last).rev() {
        steps.push(Step {
            cell: at(j, 0),
            edge: Edge::Horizontal(at(j + 1, 0)),
        });
    }

    ClosedPath::new(steps)
}

fn centre_row_loop(n: usize) -> ClosedPath {
    let h = n / 2;
    let last = n - 1;
    let at = |x: usize, y: usize| y * n + x;
    let mut steps = Vec::with_capacity(2 * n - 2);

    for j in 0..n {
        let edge = if j == 0 {
            Edge::Vertical(at(0, h))
        } else {
            Edge::Horizontal(at(j, h))
        };
        steps.push(Step { cell: at(j, h), edge });
    }
    for i in h + 1..n {
        steps.push(Step {
            cell: at(last, i),
            edge: Edge::Vertical(at(last, i)),
        });
    }
    for i in (h + 1..last).rev() {
        steps.push(Step {
            cell: at(0, i),
            edge: Edge::Vertical(at(0, i + 1)),
        });
    }

    ClosedPath::new(steps)
}
