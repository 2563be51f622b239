//! Sparse matrix helpers and the direct saddle-point solver.
//!
//! Matrices are assembled as triplet lists and compressed once into
//! [`CsrMatrix`]. The augmented system is symmetric but indefinite, so it is
//! factorized with a sparse LU decomposition with partial pivoting rather
//! than a Cholesky factorization.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use faer::linalg::solvers::Solve;
use faer::sparse::linalg::solvers::Lu;
use faer::sparse::{SparseColMat, Triplet};
use faer::ColMut;
use nalgebra::DVector;
use nalgebra_sparse::{CooMatrix, CsrMatrix};

use crate::error::{Result, SeamlessError};

/// Compress `(row, col, value)` triplets into a CSR matrix.
///
/// Duplicate entries at the same (row, col) are summed.
pub fn csr_from_triplets(
    rows: usize,
    cols: usize,
    triplets: &[(usize, usize, f64)],
) -> CsrMatrix<f64> {
    let mut coo = CooMatrix::new(rows, cols);
    for &(r, c, v) in triplets {
        coo.push(r, c, v);
    }
    CsrMatrix::from(&coo)
}

/// Square diagonal matrix with the given entries.
pub fn diagonal(values: &[f64]) -> CsrMatrix<f64> {
    let n = values.len();
    let triplets: Vec<_> = values.iter().enumerate().map(|(i, &v)| (i, i, v)).collect();
    csr_from_triplets(n, n, &triplets)
}

/// Infinity norm (maximum absolute row sum).
pub fn norm_inf(a: &CsrMatrix<f64>) -> f64 {
    a.row_iter()
        .map(|row| row.values().iter().map(|v| v.abs()).sum::<f64>())
        .fold(0.0, f64::max)
}

/// Whether `a` equals its transpose up to `tolerance`.
pub fn is_symmetric(a: &CsrMatrix<f64>, tolerance: f64) -> bool {
    if a.nrows() != a.ncols() {
        return false;
    }
    let at = a.transpose();
    a.triplet_iter().all(|(i, j, &v)| {
        let w = at.get_entry(i, j).map_or(0.0, |e| e.into_value());
        (v - w).abs() <= tolerance
    }) && at.triplet_iter().all(|(i, j, &v)| {
        let w = a.get_entry(i, j).map_or(0.0, |e| e.into_value());
        (v - w).abs() <= tolerance
    })
}

/// Fractional part of the golden ratio, spreads the estimation right-hand side.
const GOLDEN_RATIO_FRACTION: f64 = 0.618_033_988_749_895;

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("zero pivot")
}

/// Index of the first row with no nonzero value, if any.
fn first_empty_row(a: &CsrMatrix<f64>) -> Option<usize> {
    a.row_iter()
        .position(|row| row.values().iter().all(|&v| v == 0.0))
}

/// Direct solver for a symmetric indefinite (saddle-point) system.
///
/// Factorizes once with [`SaddlePointSolver::factorize`], then solves any
/// number of right-hand sides. Each solve checks that the result is finite and
/// that its backward error is small; anything else is reported as
/// [`SeamlessError::SolveFailed`].
pub struct SaddlePointSolver<'a> {
    matrix: &'a CsrMatrix<f64>,
    lu: Lu<usize, f64>,
    residual_tolerance: f64,
    condition_limit: f64,
}

impl<'a> SaddlePointSolver<'a> {
    /// Default bound on the scaled residual `|Ax - b| / (|A| |x| + |b|)`.
    pub const DEFAULT_RESIDUAL_TOLERANCE: f64 = 1e-8;

    /// Default bound on [`condition_estimate`](Self::condition_estimate).
    /// Rank-deficient systems estimate near `1 / epsilon`.
    pub const DEFAULT_CONDITION_LIMIT: f64 = 1e10;

    /// Factorize a square system matrix.
    ///
    /// # Errors
    ///
    /// Returns [`SeamlessError::FactorizationFailed`] if the matrix is not
    /// square, is empty, has a row without any nonzero entry, or if the LU
    /// factorization itself fails. Singular matrices are rejected both on an
    /// exact zero pivot and when the condition estimate exceeds
    /// [`DEFAULT_CONDITION_LIMIT`](Self::DEFAULT_CONDITION_LIMIT).
    pub fn factorize(matrix: &'a CsrMatrix<f64>) -> Result<Self> {
        Self::factorize_with_condition_limit(matrix, Self::DEFAULT_CONDITION_LIMIT)
    }

    /// [`factorize`](Self::factorize) with an explicit bound on the
    /// condition estimate.
    ///
    /// # Errors
    ///
    /// As [`factorize`](Self::factorize).
    pub fn factorize_with_condition_limit(
        matrix: &'a CsrMatrix<f64>,
        condition_limit: f64,
    ) -> Result<Self> {
        let n = matrix.nrows();
        if n != matrix.ncols() {
            return Err(SeamlessError::FactorizationFailed {
                details: format!("matrix is {}x{}, expected square", n, matrix.ncols()),
            });
        }
        if n == 0 {
            return Err(SeamlessError::FactorizationFailed {
                details: "matrix is empty".to_string(),
            });
        }
        if let Some(row) = first_empty_row(matrix) {
            return Err(SeamlessError::FactorizationFailed {
                details: format!("row {} is structurally zero", row),
            });
        }

        let triplets: Vec<Triplet<usize, usize, f64>> = matrix
            .triplet_iter()
            .filter(|&(_, _, v)| *v != 0.0)
            .map(|(i, j, &v)| Triplet::new(i, j, v))
            .collect();

        let a = SparseColMat::<usize, f64>::try_new_from_triplets(n, n, &triplets).map_err(
            |err| SeamlessError::FactorizationFailed {
                details: format!("could not build column matrix: {:?}", err),
            },
        )?;

        // faer panics on an exact zero pivot instead of returning an error
        let lu = panic::catch_unwind(AssertUnwindSafe(|| a.sp_lu()))
            .map_err(|payload| SeamlessError::FactorizationFailed {
                details: format!("numerically singular: {}", panic_message(payload.as_ref())),
            })?
            .map_err(|err| SeamlessError::FactorizationFailed {
                details: format!("{:?}", err),
            })?;

        log::debug!("factorized {}x{} system with {} nonzeros", n, n, triplets.len());

        let solver = Self {
            matrix,
            lu,
            residual_tolerance: Self::DEFAULT_RESIDUAL_TOLERANCE,
            condition_limit,
        };
        solver.check_conditioning()?;
        Ok(solver)
    }

    /// Lower bound on the infinity-norm condition number of the factorized
    /// matrix, `|A| |z| / |b|` for `z = A⁻¹ b` with a fixed positive `b`.
    pub fn condition_estimate(&self) -> f64 {
        let n = self.dim();
        let b: Vec<f64> = (0..n)
            .map(|i| 1.0 + ((i as f64 + 1.0) * GOLDEN_RATIO_FRACTION).fract())
            .collect();
        let b_norm = b.iter().fold(0.0_f64, |m, v| m.max(v.abs()));

        let mut z = b;
        self.solve_raw(&mut z);

        let z_norm = z.iter().fold(0.0_f64, |m, v| {
            if v.is_finite() {
                m.max(v.abs())
            } else {
                f64::INFINITY
            }
        });
        norm_inf(self.matrix) * z_norm / b_norm
    }

    // A rank-deficient system factorizes with a pivot near machine epsilon
    // and yields solutions shifted arbitrarily along its null space.
    fn check_conditioning(&self) -> Result<()> {
        let estimate = self.condition_estimate();
        log::debug!("condition estimate {:.3e}", estimate);

        if estimate.is_nan() || estimate > self.condition_limit {
            return Err(SeamlessError::FactorizationFailed {
                details: format!(
                    "system is numerically singular (condition estimate {:.3e} exceeds {:.3e})",
                    estimate, self.condition_limit
                ),
            });
        }
        Ok(())
    }

    fn solve_raw(&self, values: &mut [f64]) {
        let col = ColMut::from_slice_mut(values);
        self.lu.solve_in_place(col.as_mat_mut());
    }

    /// Set the scaled residual bound checked after each solve.
    pub fn with_residual_tolerance(mut self, tolerance: f64) -> Self {
        self.residual_tolerance = tolerance;
        self
    }

    /// Dimension of the factorized system.
    #[inline]
    pub fn dim(&self) -> usize {
        self.matrix.nrows()
    }

    /// Solve `A x = rhs`.
    ///
    /// # Errors
    ///
    /// Returns [`SeamlessError::SolveFailed`] on a dimension mismatch, a
    /// non-finite solution, or a scaled residual above the tolerance.
    pub fn solve(&self, rhs: &DVector<f64>) -> Result<DVector<f64>> {
        if rhs.len() != self.dim() {
            return Err(SeamlessError::SolveFailed {
                details: format!(
                    "right-hand side has length {}, system has dimension {}",
                    rhs.len(),
                    self.dim()
                ),
            });
        }

        let mut values: Vec<f64> = rhs.iter().copied().collect();
        self.solve_raw(&mut values);

        if let Some(i) = values.iter().position(|v| !v.is_finite()) {
            return Err(SeamlessError::SolveFailed {
                details: format!("solution entry {} is not finite", i),
            });
        }

        let x = DVector::from_vec(values);
        let residual = self.matrix * &x - rhs;
        let scale = norm_inf(self.matrix) * x.amax() + rhs.amax();
        let scaled = if scale > 0.0 { residual.amax() / scale } else { residual.amax() };
        log::debug!("solve residual {:.3e} (scaled)", scaled);

        if scaled.is_nan() || scaled > self.residual_tolerance {
            return Err(SeamlessError::SolveFailed {
                details: format!(
                    "scaled residual {:.3e} exceeds tolerance {:.3e}",
                    scaled, self.residual_tolerance
                ),
            });
        }

        Ok(x)
    }
}

impl std::fmt::Debug for SaddlePointSolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaddlePointSolver")
            .field("dim", &self.dim())
            .field("residual_tolerance", &self.residual_tolerance)
            .field("condition_limit", &self.condition_limit)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csr_from_triplets_with_duplicates() {
        let triplets = vec![
            (0, 0, 2.0),
            (0, 0, 2.0), // Duplicate: should sum to 4.0
            (0, 1, 1.0),
            (1, 0, 1.0),
            (1, 1, 3.0),
        ];
        let a = csr_from_triplets(2, 2, &triplets);

        let y = &a * &DVector::from_vec(vec![1.0, 0.0]);
        assert!((y[0] - 4.0).abs() < 1e-10);
        assert!((y[1] - 1.0).abs() < 1e-10);
        assert!((norm_inf(&a) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_diagonal() {
        let m = diagonal(&[1.0, 0.0, 3.0]);
        assert_eq!(m.nrows(), 3);
        let y = &m * &DVector::from_vec(vec![2.0, 2.0, 2.0]);
        assert_eq!(y.as_slice(), &[2.0, 0.0, 6.0]);
    }

    #[test]
    fn test_symmetry_check() {
        let sym = csr_from_triplets(2, 2, &[(0, 1, 1.0), (1, 0, 1.0), (1, 1, 2.0)]);
        assert!(is_symmetric(&sym, 0.0));

        let skew = csr_from_triplets(2, 2, &[(0, 1, 1.0), (1, 0, -1.0)]);
        assert!(!is_symmetric(&skew, 1e-12));
    }

    #[test]
    fn test_solve_spd() {
        // [ 4  1 ] [ x ]   [ 1 ]
        // [ 1  3 ] [ y ] = [ 2 ]
        // Solution: x = 1/11, y = 7/11
        let a = csr_from_triplets(2, 2, &[(0, 0, 4.0), (0, 1, 1.0), (1, 0, 1.0), (1, 1, 3.0)]);
        let solver = SaddlePointSolver::factorize(&a).unwrap();
        let x = solver.solve(&DVector::from_vec(vec![1.0, 2.0])).unwrap();

        assert!((x[0] - 1.0 / 11.0).abs() < 1e-12);
        assert!((x[1] - 7.0 / 11.0).abs() < 1e-12);
    }

    #[test]
    fn test_solve_saddle_point() {
        // minimize x^2 + y^2 subject to x + y = 2
        // [ 2  0  1 ]
        // [ 0  2  1 ]
        // [ 1  1  0 ]
        let a = csr_from_triplets(
            3,
            3,
            &[
                (0, 0, 2.0),
                (1, 1, 2.0),
                (0, 2, 1.0),
                (2, 0, 1.0),
                (1, 2, 1.0),
                (2, 1, 1.0),
            ],
        );
        assert!(is_symmetric(&a, 0.0));

        let solver = SaddlePointSolver::factorize(&a).unwrap();
        let x = solver.solve(&DVector::from_vec(vec![0.0, 0.0, 2.0])).unwrap();

        assert!((x[0] - 1.0).abs() < 1e-12);
        assert!((x[1] - 1.0).abs() < 1e-12);
        // Multiplier: 2x + lambda = 0
        assert!((x[2] + 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_factorize_rejects_empty_row() {
        let a = csr_from_triplets(2, 2, &[(0, 0, 1.0)]);
        match SaddlePointSolver::factorize(&a) {
            Err(SeamlessError::FactorizationFailed { details }) => {
                assert!(details.contains("row 1"));
            }
            other => panic!("expected FactorizationFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_factorize_rejects_non_square() {
        let a = csr_from_triplets(2, 3, &[(0, 0, 1.0), (1, 1, 1.0)]);
        assert!(matches!(
            SaddlePointSolver::factorize(&a),
            Err(SeamlessError::FactorizationFailed { .. })
        ));
    }

    #[test]
    fn test_solve_rejects_wrong_rhs_length() {
        let a = diagonal(&[1.0, 2.0]);
        let solver = SaddlePointSolver::factorize(&a).unwrap();
        assert!(matches!(
            solver.solve(&DVector::from_vec(vec![1.0])),
            Err(SeamlessError::SolveFailed { .. })
        ));
    }

    #[test]
    fn test_condition_estimate_of_diagonal() {
        let a = diagonal(&[1.0, 2.0]);
        let solver = SaddlePointSolver::factorize(&a).unwrap();
        assert!((solver.condition_estimate() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_factorize_rejects_exactly_singular() {
        // Rank one: the second pivot is exactly zero
        let a = csr_from_triplets(2, 2, &[(0, 0, 1.0), (0, 1, 1.0), (1, 0, 1.0), (1, 1, 1.0)]);
        assert!(matches!(
            SaddlePointSolver::factorize(&a),
            Err(SeamlessError::FactorizationFailed { .. })
        ));
    }

    #[test]
    fn test_factorize_rejects_nearly_singular() {
        let a = csr_from_triplets(
            2,
            2,
            &[(0, 0, 1.0), (0, 1, 1.0), (1, 0, 1.0), (1, 1, 1.0 + 1e-14)],
        );
        match SaddlePointSolver::factorize(&a) {
            Err(SeamlessError::FactorizationFailed { details }) => {
                assert!(details.contains("singular"), "{}", details);
            }
            other => panic!("expected FactorizationFailed, got {:?}", other),
        }

        // Accepted once the limit is raised past the true condition number
        let solver = SaddlePointSolver::factorize_with_condition_limit(&a, 1e20).unwrap();
        assert!(solver.condition_estimate() > 1e10);
    }
}
