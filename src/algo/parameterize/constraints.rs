//! Linear equality constraints over reduced unknowns.
//!
//! A [`ConstraintSet`] pairs a constraint matrix `C` with the target vector
//! `t` of `C x = t`. Targets land in the bottom segment of the augmented
//! right-hand side, so pinning to nonzero values needs no change to `C`.
//! The homogeneous case (`t = 0`) is the default.

use std::collections::HashSet;

use nalgebra::DVector;
use nalgebra_sparse::CsrMatrix;

use crate::error::{Result, SeamlessError};

use super::sparse::csr_from_triplets;

/// Constraint matrix and target values.
#[derive(Debug, Clone)]
pub struct ConstraintSet {
    matrix: CsrMatrix<f64>,
    targets: DVector<f64>,
}

impl ConstraintSet {
    /// Constraints `C x = t`.
    ///
    /// # Errors
    ///
    /// Returns an error if `targets` does not have one entry per row of
    /// `matrix`.
    pub fn new(matrix: CsrMatrix<f64>, targets: DVector<f64>) -> Result<Self> {
        if targets.len() != matrix.nrows() {
            return Err(SeamlessError::mismatch(
                "constraint targets",
                matrix.nrows(),
                targets.len(),
            ));
        }
        Ok(Self { matrix, targets })
    }

    /// Homogeneous constraints `C x = 0`.
    pub fn homogeneous(matrix: CsrMatrix<f64>) -> Self {
        let targets = DVector::zeros(matrix.nrows());
        Self { matrix, targets }
    }

    /// One constraint row per `(index, value)` pin: `x[index] = value`.
    ///
    /// # Errors
    ///
    /// Returns an error if an index is not below `reduced_dim` or an index is
    /// pinned twice.
    ///
    /// # Example
    ///
    /// ```
    /// use seamless::algo::parameterize::ConstraintSet;
    ///
    /// let pins = ConstraintSet::pins(4, &[(0, 0.0), (3, 1.5)]).unwrap();
    /// assert_eq!(pins.len(), 2);
    /// assert_eq!(pins.reduced_dim(), 4);
    /// assert_eq!(pins.targets()[1], 1.5);
    /// ```
    pub fn pins(reduced_dim: usize, pins: &[(usize, f64)]) -> Result<Self> {
        let mut seen = HashSet::with_capacity(pins.len());
        let mut triplets = Vec::with_capacity(pins.len());

        for (row, &(index, _)) in pins.iter().enumerate() {
            if index >= reduced_dim {
                return Err(SeamlessError::invalid_param(
                    "pinned index",
                    index,
                    "must be below the reduced dimension",
                ));
            }
            if !seen.insert(index) {
                return Err(SeamlessError::invalid_param(
                    "pinned index",
                    index,
                    "pinned more than once",
                ));
            }
            triplets.push((row, index, 1.0));
        }

        let matrix = csr_from_triplets(pins.len(), reduced_dim, &triplets);
        let targets = DVector::from_iterator(pins.len(), pins.iter().map(|&(_, v)| v));
        Ok(Self { matrix, targets })
    }

    /// Stack two constraint sets over the same reduced unknowns.
    ///
    /// # Errors
    ///
    /// Returns an error if the column counts differ.
    pub fn stack(&self, other: &ConstraintSet) -> Result<Self> {
        if self.reduced_dim() != other.reduced_dim() {
            return Err(SeamlessError::mismatch(
                "constraint columns",
                self.reduced_dim(),
                other.reduced_dim(),
            ));
        }

        let offset = self.len();
        let triplets: Vec<_> = self
            .matrix
            .triplet_iter()
            .map(|(r, c, &v)| (r, c, v))
            .chain(
                other
                    .matrix
                    .triplet_iter()
                    .map(|(r, c, &v)| (r + offset, c, v)),
            )
            .collect();

        let matrix = csr_from_triplets(offset + other.len(), self.reduced_dim(), &triplets);
        let targets = DVector::from_iterator(
            offset + other.len(),
            self.targets.iter().chain(other.targets.iter()).copied(),
        );
        Ok(Self { matrix, targets })
    }

    /// The constraint matrix `C`.
    #[inline]
    pub fn matrix(&self) -> &CsrMatrix<f64> {
        &self.matrix
    }

    /// The targets `t`.
    #[inline]
    pub fn targets(&self) -> &DVector<f64> {
        &self.targets
    }

    /// Number of constraints.
    #[inline]
    pub fn len(&self) -> usize {
        self.matrix.nrows()
    }

    /// Whether there are no constraints.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.matrix.nrows() == 0
    }

    /// Number of reduced unknowns the constraints act on.
    #[inline]
    pub fn reduced_dim(&self) -> usize {
        self.matrix.ncols()
    }

    /// Whether all targets are zero.
    pub fn is_homogeneous(&self) -> bool {
        self.targets.iter().all(|&t| t == 0.0)
    }

    /// Constraint residual `C x - t`.
    ///
    /// # Panics
    ///
    /// Panics if `x` does not have [`reduced_dim`](Self::reduced_dim) entries.
    pub fn residual(&self, x: &DVector<f64>) -> DVector<f64> {
        &self.matrix * x - &self.targets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pins_build_selection_rows() {
        let pins = ConstraintSet::pins(3, &[(2, 4.0), (0, -1.0)]).unwrap();
        assert_eq!(pins.len(), 2);
        assert!(!pins.is_homogeneous());

        let x = DVector::from_vec(vec![-1.0, 7.0, 4.0]);
        assert!(pins.residual(&x).amax() < 1e-15);

        let y = DVector::from_vec(vec![0.0, 0.0, 0.0]);
        assert_eq!(pins.residual(&y).as_slice(), &[-4.0, 1.0]);
    }

    #[test]
    fn test_pins_reject_bad_indices() {
        assert!(ConstraintSet::pins(2, &[(2, 0.0)]).is_err());
        assert!(ConstraintSet::pins(3, &[(1, 0.0), (1, 1.0)]).is_err());
    }

    #[test]
    fn test_homogeneous_and_new() {
        let c = csr_from_triplets(1, 2, &[(0, 0, 1.0), (0, 1, -1.0)]);
        let set = ConstraintSet::homogeneous(c.clone());
        assert!(set.is_homogeneous());
        assert_eq!(set.reduced_dim(), 2);

        assert!(ConstraintSet::new(c.clone(), DVector::zeros(2)).is_err());
        let set = ConstraintSet::new(c, DVector::from_vec(vec![0.5])).unwrap();
        assert_eq!(set.targets()[0], 0.5);
    }

    #[test]
    fn test_stack() {
        // x0 - x1 = 0 (continuity) then x0 = 2 (pin)
        let tie = ConstraintSet::homogeneous(csr_from_triplets(
            1,
            2,
            &[(0, 0, 1.0), (0, 1, -1.0)],
        ));
        let pin = ConstraintSet::pins(2, &[(0, 2.0)]).unwrap();
        let both = tie.stack(&pin).unwrap();

        assert_eq!(both.len(), 2);
        assert_eq!(both.targets().as_slice(), &[0.0, 2.0]);
        let x = DVector::from_vec(vec![2.0, 2.0]);
        assert!(both.residual(&x).amax() < 1e-15);

        let other = ConstraintSet::pins(3, &[(0, 0.0)]).unwrap();
        assert!(tie.stack(&other).is_err());
    }
}
