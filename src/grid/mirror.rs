//! Mirror identification of the borders of a square chart.
//!
//! A spherical geometry image glues its border to itself: the left column is
//! folded onto itself around its midpoint, and so are the right column, the top
//! row and the bottom row. All four corners are the same surface point. For a
//! grid of side `n` with `last = n - 1`:
//!
//! ```text
//! (0, y)    ~ (0, last - y)
//! (last, y) ~ (last, last - y)
//! (x, 0)    ~ (last - x, 0)
//! (x, last) ~ (last - x, last)
//! (0, 0) ~ (last, 0) ~ (0, last) ~ (last, last)
//! ```
//!
//! Cells glued together must always hold the same value. The filter keeps this
//! true by writing every result to the whole [`Identified`] set of a cell.

use super::{Grid, Sample};

/// The set of cells glued to one cell, the cell itself included.
///
/// Holds one cell for interior cells and border midpoints, two for other
/// border cells and four for the corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identified {
    cells: [usize; 4],
    len: usize,
}

impl Identified {
    fn single(index: usize) -> Self {
        Self {
            cells: [index; 4],
            len: 1,
        }
    }

    fn pair(a: usize, b: usize) -> Self {
        if a == b {
            Self::single(a)
        } else {
            Self {
                cells: [a, b, a, a],
                len: 2,
            }
        }
    }

    /// Linear indices of the glued cells.
    #[inline]
    pub fn as_slice(&self) -> &[usize] {
        &self.cells[..self.len]
    }

    /// Number of glued cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false: a set contains at least its own cell.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The smallest linear index of the set, shared by all its members.
    pub fn canonical(&self) -> usize {
        self.as_slice().iter().copied().min().unwrap_or(self.cells[0])
    }
}

/// Cells of a `size × size` chart glued to cell `(x, y)`.
pub fn identified(size: usize, x: usize, y: usize) -> Identified {
    let last = size - 1;
    let index = |cx: usize, cy: usize| cy * size + cx;

    let on_vertical_border = x == 0 || x == last;
    let on_horizontal_border = y == 0 || y == last;

    if on_vertical_border && on_horizontal_border {
        Identified {
            cells: [index(0, 0), index(last, 0), index(0, last), index(last, last)],
            len: 4,
        }
    } else if on_vertical_border {
        Identified::pair(index(x, y), index(x, last - y))
    } else if on_horizontal_border {
        Identified::pair(index(x, y), index(last - x, y))
    } else {
        Identified::single(index(x, y))
    }
}

/// Cells of a `size × size` chart glued to the cell at linear `index`.
#[inline]
pub fn identified_index(size: usize, index: usize) -> Identified {
    identified(size, index % size, index / size)
}

impl<T: Copy> Grid<T> {
    /// Write `value` to `(x, y)` and to every cell glued to it.
    ///
    /// The grid must be square.
    pub fn set_identified(&mut self, x: usize, y: usize, value: T) {
        let i = self.index_of(x, y);
        self.set_identified_index(i, value);
    }

    /// Write `value` to the cell at linear `index` and every cell glued to it.
    #[inline]
    pub(crate) fn set_identified_index(&mut self, index: usize, value: T) {
        debug_assert!(self.is_square());
        let cells = identified_index(self.width(), index);
        let data = self.as_mut_slice();
        for &cell in cells.as_slice() {
            data[cell] = value;
        }
    }
}

/// A pair of glued cells whose values disagree.
#[derive(Debug, Clone, PartialEq)]
pub struct BorderMismatch {
    /// The checked cell.
    pub cell: (usize, usize),
    /// A glued cell holding a different value.
    pub partner: (usize, usize),
    /// Distance between the two values.
    pub distance: f64,
}

/// Find glued border cells whose values differ by more than `tolerance`.
///
/// Each disagreeing pair is reported once. An empty result means the grid
/// satisfies the border invariant of a spherical geometry image.
pub fn check_borders<T: Sample>(grid: &Grid<T>, tolerance: f64) -> Vec<BorderMismatch> {
    let size = grid.width();
    let mut mismatches = Vec::new();
    if !grid.is_square() || size == 0 {
        return mismatches;
    }

    let last = size - 1;
    let border = (0..size)
        .flat_map(|t| [(t, 0), (t, last), (0, t), (last, t)])
        .map(|(x, y)| grid.index_of(x, y));

    let mut seen = std::collections::HashSet::new();
    for index in border {
        if !seen.insert(index) {
            continue;
        }
        let value = &grid.as_slice()[index];
        for &partner in identified_index(size, index).as_slice() {
            if partner <= index {
                continue;
            }
            let distance = value.distance(&grid.as_slice()[partner]);
            if distance > tolerance {
                mismatches.push(BorderMismatch {
                    cell: grid.coords_of(index),
                    partner: grid.coords_of(partner),
                    distance,
                });
            }
        }
    }

    mismatches
}
