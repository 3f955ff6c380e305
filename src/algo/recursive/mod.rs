//! Recursive (first-order IIR) filtering on the glued chart.
//!
//! One iteration runs four sub-passes in a fixed order (see [`SubPass`]).
//! Each sub-pass smooths a set of closed loops, first forward and then
//! backward, with the recurrence
//!
//! ```text
//! out[k] = f[k] * out[k - 1] + (1 - f[k]) * in[k]
//! ```
//!
//! A loop has no first cell, so a plain forward scan started from zero is
//! wrong near its start. [`smooth_cycle`] solves the circular recurrence
//! exactly: with `P` the product of all factors and `y` the zero-started scan,
//! the solution is `y[k] + B * (f[0] * ... * f[k])` where
//! `B = y[L - 1] / (1 - P)`. Products are accumulated as sums of logarithms,
//! which keeps very long loops and factors close to one well conditioned.
//!
//! The decay factor of iteration `i` out of `n` is `a = exp(-sqrt(2) / sigma)`
//! with `sigma = s * sqrt(3) * 2^(n - i - 1) / sqrt(4^n - 1)`. Weighted
//! filtering raises `a` to the domain-transform weight of each adjacency.

pub mod path;

use rayon::prelude::*;

use crate::algo::domain_transform::DomainTransform;
use crate::grid::{Grid, Sample};

pub use path::{ClosedPath, Edge, Step, SubPass, SweepPlan};

/// Natural logarithm of the decay factor of every iteration.
///
/// A zero spatial factor gives `-inf`: the factor is zero and the filter
/// leaves its input untouched.
pub fn log_coefficients(spatial_factor: f64, iterations: usize) -> Vec<f64> {
    let n = iterations as i32;
    // sqrt(4^n - 1) = 2^n * sqrt(1 - 4^-n), which does not overflow.
    let norm = (1.0 - 4.0_f64.powi(-n)).sqrt();
    (0..n)
        .map(|i| {
            let sigma = spatial_factor * 3.0_f64.sqrt() * 2.0_f64.powi(-i - 1) / norm;
            -std::f64::consts::SQRT_2 / sigma
        })
        .collect()
}

/// Decay factor of every iteration, in `[0, 1)`.
pub fn coefficients(spatial_factor: f64, iterations: usize) -> Vec<f64> {
    log_coefficients(spatial_factor, iterations)
        .into_iter()
        .map(f64::exp)
        .collect()
}

/// Exact forward solution of the recurrence on a closed loop.
///
/// `log_factors[k]` is `ln f[k]`, the decay applied when entering `values[k]`
/// from its predecessor; the predecessor of `values[0]` is the last value.
pub fn smooth_cycle<T: Sample>(values: &[T], log_factors: &[f64]) -> Vec<T> {
    debug_assert_eq!(values.len(), log_factors.len());

    let mut out = Vec::with_capacity(values.len());
    let mut log_prefix = Vec::with_capacity(values.len());
    let mut last = T::zero();
    let mut log_product = 0.0;

    for (&value, &ln_f) in values.iter().zip(log_factors) {
        // 1 - f = -expm1(ln f) stays exact for f near one.
        last = last.scaled(ln_f.exp()).plus(value.scaled(-ln_f.exp_m1()));
        log_product += ln_f;
        out.push(last);
        log_prefix.push(log_product);
    }

    let denominator = -log_product.exp_m1();
    if denominator.is_nan() || denominator <= 0.0 {
        // Every factor is one: the loop settles on its mean.
        let mean = values
            .iter()
            .fold(T::zero(), |acc, &v| acc.plus(v))
            .scaled(1.0 / values.len().max(1) as f64);
        return vec![mean; values.len()];
    }

    let boundary = last.scaled(1.0 / denominator);
    for (y, ln_p) in out.iter_mut().zip(log_prefix) {
        *y = y.plus(boundary.scaled(ln_p.exp()));
    }
    out
}

/// Forward then backward smoothing of one loop; results are in loop order.
fn smooth_path<T: Sample>(
    grid: &Grid<T>,
    path: &ClosedPath,
    log_a: f64,
    weights: Option<&DomainTransform>,
) -> Vec<T> {
    let log_factor = |edge: Edge| match weights {
        Some(dt) => dt.weight(edge) * log_a,
        None => log_a,
    };
    let cells = grid.as_slice();

    let values: Vec<T> = path.steps().iter().map(|s| cells[s.cell]).collect();
    let factors: Vec<f64> = path.steps().iter().map(|s| log_factor(s.edge)).collect();
    let forward = smooth_cycle(&values, &factors);

    let back_path = path.reversed();
    let back_values: Vec<T> = forward.into_iter().rev().collect();
    let back_factors: Vec<f64> = back_path.steps().iter().map(|s| log_factor(s.edge)).collect();
    let mut result = smooth_cycle(&back_values, &back_factors);

    result.reverse();
    result
}

/// The recursive filter for one chart size and parameter set.
///
/// # Example
///
/// ```
/// use gimsmooth::algo::recursive::RecursiveFilter;
/// use gimsmooth::grid::Grid;
///
/// let mut field = Grid::from_fn(5, 5, |x, y| if (x, y) == (2, 2) { 1.0 } else { 0.0 });
/// RecursiveFilter::new(5, 2.0, 3).run(&mut field, None);
/// assert!(field[(2, 2)] < 1.0);
/// assert!(field[(1, 2)] > 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct RecursiveFilter {
    plan: SweepPlan,
    log_coefficients: Vec<f64>,
    parallel: bool,
}

impl RecursiveFilter {
    /// Create a filter for a `size × size` chart (`size` odd, at least 3).
    pub fn new(size: usize, spatial_factor: f64, iterations: usize) -> Self {
        Self {
            plan: SweepPlan::new(size),
            log_coefficients: log_coefficients(spatial_factor, iterations),
            parallel: false,
        }
    }

    /// Smooth the loops of each sub-pass in parallel.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Number of iterations.
    pub fn iterations(&self) -> usize {
        self.log_coefficients.len()
    }

    /// The loops walked by every iteration.
    pub fn plan(&self) -> &SweepPlan {
        &self.plan
    }

    /// Run every iteration.
    pub fn run<T: Sample>(&self, grid: &mut Grid<T>, weights: Option<&DomainTransform>) {
        for iteration in 0..self.iterations() {
            self.run_iteration(grid, iteration, weights);
        }
    }

    /// Run the four sub-passes of one iteration.
    pub fn run_iteration<T: Sample>(
        &self,
        grid: &mut Grid<T>,
        iteration: usize,
        weights: Option<&DomainTransform>,
    ) {
        debug_assert_eq!(grid.width(), self.plan.size());
        debug_assert!(grid.is_square());

        let log_a = self.log_coefficients[iteration];
        for (pass, paths) in self.plan.passes() {
            log::trace!("iteration {} {} pass: {} loops", iteration, pass.name(), paths.len());
            self.run_sub_pass(grid, paths, log_a, weights);
        }
    }

    fn run_sub_pass<T: Sample>(
        &self,
        grid: &mut Grid<T>,
        paths: &[ClosedPath],
        log_a: f64,
        weights: Option<&DomainTransform>,
    ) {
        // Loops of a sub-pass never share a cell, so they can be smoothed
        // against the same snapshot.
        let snapshot: &Grid<T> = grid;
        let results: Vec<Vec<T>> = if self.parallel {
            paths
                .par_iter()
                .map(|path| smooth_path(snapshot, path, log_a, weights))
                .collect()
        } else {
            paths
                .iter()
                .map(|path| smooth_path(snapshot, path, log_a, weights))
                .collect()
        };

        for (path, values) in paths.iter().zip(results) {
            for (step, value) in path.steps().iter().zip(values) {
                grid.set_identified_index(step.cell, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::check_borders;
    use nalgebra::{DMatrix, DVector, Point3};

    /// Solve the circular recurrence directly.
    fn solve_cycle(values: &[f64], factors: &[f64]) -> Vec<f64> {
        let len = values.len();
        let matrix = DMatrix::from_fn(len, len, |row, col| {
            if row == col {
                1.0
            } else if col == (row + len - 1) % len {
                -factors[row]
            } else {
                0.0
            }
        });
        let rhs = DVector::from_fn(len, |k, _| (1.0 - factors[k]) * values[k]);
        let solution = matrix.lu().solve(&rhs).unwrap();
        solution.iter().copied().collect()
    }

    fn assert_close(actual: &[f64], expected: &[f64], tolerance: f64) {
        assert_eq!(actual.len(), expected.len());
        for (k, (a, e)) in actual.iter().zip(expected).enumerate() {
            assert!((a - e).abs() < tolerance, "index {}: {} vs {}", k, a, e);
        }
    }

    #[test]
    fn test_single_iteration_uses_spatial_factor() {
        // With one iteration sigma equals the spatial factor.
        let a = coefficients(2.0, 1);
        assert_eq!(a.len(), 1);
        assert!((a[0] - (-std::f64::consts::SQRT_2 / 2.0).exp()).abs() < 1e-12);
    }

    #[test]
    fn test_coefficients_shrink_each_iteration() {
        let a = coefficients(10.0, 5);
        for pair in a.windows(2) {
            assert!(pair[1] < pair[0]);
        }
        assert!(a.iter().all(|&f| f > 0.0 && f < 1.0));
        // Many iterations stay finite.
        assert!(coefficients(1.0, 600).iter().all(|f| f.is_finite()));
    }

    #[test]
    fn test_zero_spatial_factor_gives_zero_decay() {
        assert!(log_coefficients(0.0, 3).iter().all(|&l| l == f64::NEG_INFINITY));
        assert!(coefficients(0.0, 3).iter().all(|&f| f == 0.0));
    }

    #[test]
    fn test_smooth_cycle_matches_linear_solve() {
        let values = [0.3, -1.2, 4.0, 2.5, 0.0, 1.1, -0.7];
        let factors = [0.2, 0.9, 0.55, 0.7, 0.05, 0.99, 0.4];
        let logs: Vec<f64> = factors.iter().map(|f: &f64| f.ln()).collect();

        let result = smooth_cycle(&values, &logs);
        assert_close(&result, &solve_cycle(&values, &factors), 1e-10);
    }

    #[test]
    fn test_smooth_cycle_is_start_independent() {
        let values = [1.0, 5.0, -2.0, 3.0, 0.5];
        let logs = [-0.3, -1.5, -0.1, -2.0, -0.8];
        let direct = smooth_cycle(&values, &logs);

        let rotated_values = [-2.0, 3.0, 0.5, 1.0, 5.0];
        let rotated_logs = [-0.1, -2.0, -0.8, -0.3, -1.5];
        let rotated = smooth_cycle(&rotated_values, &rotated_logs);

        for k in 0..5 {
            assert!((direct[(k + 2) % 5] - rotated[k]).abs() < 1e-12);
        }
    }

    #[test]
    fn test_long_loop_near_unity_is_stable() {
        let len = 2000;
        let values: Vec<f64> = (0..len).map(|k| (k as f64 * 0.01).sin()).collect();
        let logs = vec![0.9999_f64.ln(); len];

        let result = smooth_cycle(&values, &logs);
        assert!(result.iter().all(|v| v.is_finite()));

        let constant = smooth_cycle(&vec![3.25; len], &logs);
        assert_close(&constant, &vec![3.25; len], 1e-9);

        let mean = values.iter().sum::<f64>() / len as f64;
        let almost_one = smooth_cycle(&values, &vec![-1e-13; len]);
        assert!(almost_one.iter().all(|v| (v - mean).abs() < 1e-3));
    }

    #[test]
    fn test_tiny_factors_return_input() {
        let values = [1.0, -2.0, 3.0];
        let result = smooth_cycle(&values, &[-800.0, -900.0, -1000.0]);
        assert_close(&result, &values, 1e-12);

        let exact = smooth_cycle(&values, &[f64::NEG_INFINITY; 3]);
        assert_eq!(exact, values.to_vec());
    }

    #[test]
    fn test_smallest_chart_matches_direct_solve() {
        let size = 3;
        let values = [0.4, 1.0, 0.4, 2.0, -1.0, 3.0, 0.4, 1.0, 0.4];
        let mut grid = Grid::from_vec(size, size, values.to_vec()).unwrap();
        let spatial = 1.5;

        RecursiveFilter::new(size, spatial, 1).run(&mut grid, None);

        // The two loops of a 3x3 chart, solved forward then backward.
        let f = coefficients(spatial, 1)[0];
        let mut expected = Grid::from_vec(size, size, values.to_vec()).unwrap();
        for cells in [[(1, 0), (1, 1), (1, 2), (2, 2)], [(0, 1), (1, 1), (2, 1), (2, 2)]] {
            let loop_values: Vec<f64> = cells.iter().map(|&(x, y)| expected[(x, y)]).collect();
            let forward = solve_cycle(&loop_values, &[f; 4]);
            let reversed: Vec<f64> = forward.into_iter().rev().collect();
            let backward = solve_cycle(&reversed, &[f; 4]);
            for (&(x, y), value) in cells.iter().zip(backward.into_iter().rev()) {
                expected.set_identified(x, y, value);
            }
        }

        assert_close(grid.as_slice(), expected.as_slice(), 1e-10);
        assert!(check_borders(&grid, 1e-12).is_empty());
    }

    #[test]
    fn test_constant_field_is_fixed_point() {
        let value = Point3::new(0.25, -4.0, 7.5);
        let mut grid = Grid::new(9, 9, value);
        RecursiveFilter::new(9, 20.0, 4).run(&mut grid, None);
        for p in grid.iter() {
            assert!((p - value).norm() < 1e-12);
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let size = 11;
        let mut field = Grid::from_fn(size, size, |x, y| ((x * 7 + y * 13) % 5) as f64);
        let mut parallel = field.clone();

        RecursiveFilter::new(size, 3.0, 3).run(&mut field, None);
        RecursiveFilter::new(size, 3.0, 3)
            .with_parallel(true)
            .run(&mut parallel, None);

        assert_eq!(field, parallel);
    }
}
