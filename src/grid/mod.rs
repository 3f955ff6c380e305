//! Dense row-major grids of per-cell values.
//!
//! [`Grid`] is the storage primitive behind every field of a geometry image:
//! positions, normals, and the scalar fields of the domain transform are all
//! grids over different cell types. Cells are addressed by `(x, y)` where `x`
//! is the column and `y` the row, or by the linear index `y * width + x`.
//!
//! The filtering engine is generic over the cell type through the [`Sample`]
//! trait, so one implementation smooths positions, normals and scalars alike.
//!
//! # Example
//!
//! ```
//! use gimsmooth::grid::Grid;
//!
//! let mut grid = Grid::from_fn(3, 3, |x, y| (x + 10 * y) as f64);
//! assert_eq!(grid[(2, 1)], 12.0);
//!
//! grid[(0, 0)] = -1.0;
//! assert_eq!(grid.get(0, 0), &-1.0);
//! ```

pub mod mirror;
mod sample;

use std::ops::{Index, IndexMut};

use crate::error::{GimError, Result};

pub use mirror::{check_borders, identified, BorderMismatch, Identified};
pub use sample::Sample;

/// A `width × height` array of cells stored in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

impl<T: Clone> Grid<T> {
    /// Create a grid with every cell set to `value`.
    pub fn new(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }
}

impl<T> Grid<T> {
    /// Create a grid by evaluating `f(x, y)` for every cell.
    pub fn from_fn<F>(width: usize, height: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> T,
    {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self { width, height, data }
    }

    /// Wrap an existing row-major buffer.
    ///
    /// Fails if the buffer does not hold exactly `width * height` cells.
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Result<Self> {
        if data.len() != width * height {
            return Err(GimError::BufferSize {
                expected: width * height,
                actual: data.len(),
            });
        }
        Ok(Self { width, height, data })
    }

    /// Number of columns.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the grid has no cells.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Check if the grid has as many rows as columns.
    #[inline]
    pub fn is_square(&self) -> bool {
        self.width == self.height
    }

    /// Linear index of cell `(x, y)`.
    #[inline]
    pub fn index_of(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height, "cell ({}, {}) out of bounds", x, y);
        y * self.width + x
    }

    /// Cell coordinates of a linear index.
    #[inline]
    pub fn coords_of(&self, index: usize) -> (usize, usize) {
        (index % self.width, index / self.width)
    }

    /// Get a reference to cell `(x, y)`.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.data[self.index_of(x, y)]
    }

    /// Get a mutable reference to cell `(x, y)`.
    #[inline]
    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut T {
        let i = self.index_of(x, y);
        &mut self.data[i]
    }

    /// Overwrite cell `(x, y)`.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let i = self.index_of(x, y);
        self.data[i] = value;
    }

    /// All cells in row-major order.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// All cells in row-major order, mutably.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consume the grid and return its buffer.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// One row of the grid.
    pub fn row(&self, y: usize) -> &[T] {
        let start = y * self.width;
        &self.data[start..start + self.width]
    }

    /// Iterate over cells in row-major order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// Iterate over `(x, y, cell)` triples in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, &T)> + '_ {
        let width = self.width;
        self.data
            .iter()
            .enumerate()
            .map(move |(i, v)| (i % width, i / width, v))
    }

    /// Build a grid of the same shape by transforming every cell.
    pub fn map<U, F>(&self, f: F) -> Grid<U>
    where
        F: FnMut(&T) -> U,
    {
        Grid {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(f).collect(),
        }
    }

    /// Check whether `other` has the same dimensions.
    pub fn same_shape<U>(&self, other: &Grid<U>) -> bool {
        self.width == other.width && self.height == other.height
    }
}

impl<T> Index<(usize, usize)> for Grid<T> {
    type Output = T;

    #[inline]
    fn index(&self, (x, y): (usize, usize)) -> &T {
        self.get(x, y)
    }
}

impl<T> IndexMut<(usize, usize)> for Grid<T> {
    #[inline]
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut T {
        self.get_mut(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    #[test]
    fn test_from_fn_is_row_major() {
        let grid = Grid::from_fn(4, 2, |x, y| (x, y));
        assert_eq!(grid.as_slice()[1], (1, 0));
        assert_eq!(grid.as_slice()[4], (0, 1));
        assert_eq!(grid.index_of(3, 1), 7);
        assert_eq!(grid.coords_of(7), (3, 1));
        assert_eq!(grid.row(1), &[(0, 1), (1, 1), (2, 1), (3, 1)]);
    }

    #[test]
    fn test_from_vec_rejects_wrong_length() {
        let err = Grid::from_vec(3, 3, vec![0.0_f64; 8]).unwrap_err();
        assert!(matches!(err, GimError::BufferSize { expected: 9, actual: 8 }));
        assert!(Grid::from_vec(3, 3, vec![0.0_f64; 9]).is_ok());
    }

    #[test]
    fn test_clone_is_deep() {
        let original = Grid::new(3, 3, Vector3::new(1.0, 2.0, 3.0));
        let mut copy = original.clone();
        copy[(1, 1)] = Vector3::zeros();

        assert_eq!(original[(1, 1)], Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(copy[(1, 1)], Vector3::zeros());
    }

    #[test]
    fn test_map_changes_cell_type() {
        let grid = Grid::from_fn(3, 3, |x, y| Vector3::new(x as f64, y as f64, 0.0));
        let lengths = grid.map(|v| v.norm());
        assert!(lengths.same_shape(&grid));
        assert!((lengths[(2, 2)] - 8.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_cells_iterator_yields_coordinates() {
        let grid = Grid::from_fn(3, 2, |x, y| x * y);
        let collected: Vec<_> = grid.cells().map(|(x, y, v)| (x, y, *v)).collect();
        assert_eq!(collected.len(), 6);
        assert_eq!(collected[5], (2, 1, 2));
    }
}
