//! Assembly of the constrained least-squares system.
//!
//! The energy `|D P x - gamma|²_M` over reduced unknowns `x` has Hessian
//! `E = Pᵗ Dᵗ M D P` and gradient term `g = Pᵗ Dᵗ M gamma`. Constraints
//! `C x = t` are attached with Lagrange multipliers, giving the symmetric
//! indefinite system
//!
//! ```text
//! [ E  Cᵗ ] [ x      ]   [ g ]
//! [ C  0  ] [ lambda ] = [ t ]
//! ```

use nalgebra::DVector;
use nalgebra_sparse::CsrMatrix;

use crate::error::{Result, SeamlessError};

use super::constraints::ConstraintSet;
use super::operator::DifferentialOperator;
use super::sparse::csr_from_triplets;

/// Reduced energy Hessian and gradient term.
#[derive(Debug, Clone)]
pub struct ReducedEnergy {
    /// `E = Pᵗ Dᵗ M D P`, symmetric positive semi-definite.
    pub hessian: CsrMatrix<f64>,
    /// `g = Pᵗ Dᵗ M gamma`.
    pub gradient: DVector<f64>,
}

/// The augmented saddle-point system `A [x; lambda] = b`.
#[derive(Debug, Clone)]
pub struct AugmentedSystem {
    /// The symmetric indefinite matrix `A`.
    pub matrix: CsrMatrix<f64>,
    /// The right-hand side `b = [g; t]`.
    pub rhs: DVector<f64>,
    /// Number of reduced unknowns (size of the `E` block).
    pub reduced_dim: usize,
    /// Number of constraints (size of the zero block).
    pub num_constraints: usize,
}

impl AugmentedSystem {
    /// Total dimension of the system.
    #[inline]
    pub fn dim(&self) -> usize {
        self.reduced_dim + self.num_constraints
    }

    /// Split a solution into reduced unknowns and Lagrange multipliers.
    pub fn split_solution(&self, solution: &DVector<f64>) -> (DVector<f64>, DVector<f64>) {
        let x = solution.rows(0, self.reduced_dim).into_owned();
        let lambda = solution
            .rows(self.reduced_dim, self.num_constraints)
            .into_owned();
        (x, lambda)
    }
}

/// Form the reduced energy `E` and gradient term `g`.
///
/// # Errors
///
/// Returns an error if the operator, mass matrix and corner map do not agree
/// on their dimensions.
pub fn reduced_energy(
    operator: &DifferentialOperator,
    mass: &CsrMatrix<f64>,
    corner_map: &CsrMatrix<f64>,
) -> Result<ReducedEnergy> {
    let d = &operator.matrix;
    if mass.nrows() != d.nrows() || mass.ncols() != d.nrows() {
        return Err(SeamlessError::mismatch(
            "mass matrix size",
            d.nrows(),
            mass.nrows(),
        ));
    }
    if operator.gamma.len() != d.nrows() {
        return Err(SeamlessError::mismatch(
            "gamma length",
            d.nrows(),
            operator.gamma.len(),
        ));
    }
    if corner_map.nrows() != d.ncols() {
        return Err(SeamlessError::mismatch(
            "corner map rows",
            d.ncols(),
            corner_map.nrows(),
        ));
    }

    // D P maps reduced unknowns straight to edge differences
    let dp = d * corner_map;
    let mdp = mass * &dp;
    let dpt = dp.transpose();

    let hessian = &dpt * &mdp;
    let gradient = &dpt * &(mass * &operator.gamma);

    log::debug!(
        "reduced energy: {} unknowns, {} nonzeros",
        hessian.nrows(),
        hessian.nnz()
    );

    Ok(ReducedEnergy { hessian, gradient })
}

/// Embed the reduced energy and constraints into the augmented system.
///
/// # Errors
///
/// Returns an error if the constraint matrix's column count differs from the
/// reduced dimension.
pub fn augment(energy: &ReducedEnergy, constraints: &ConstraintSet) -> Result<AugmentedSystem> {
    let n = energy.hessian.nrows();
    let m = constraints.len();
    if constraints.reduced_dim() != n {
        return Err(SeamlessError::mismatch(
            "constraint columns",
            n,
            constraints.reduced_dim(),
        ));
    }

    let mut triplets: Vec<(usize, usize, f64)> =
        Vec::with_capacity(energy.hessian.nnz() + 2 * constraints.matrix().nnz());
    triplets.extend(energy.hessian.triplet_iter().map(|(r, c, &v)| (r, c, v)));
    for (r, c, &v) in constraints.matrix().triplet_iter() {
        triplets.push((n + r, c, v));
        triplets.push((c, n + r, v));
    }

    let matrix = csr_from_triplets(n + m, n + m, &triplets);

    let mut rhs = DVector::zeros(n + m);
    rhs.rows_mut(0, n).copy_from(&energy.gradient);
    rhs.rows_mut(n, m).copy_from(constraints.targets());

    Ok(AugmentedSystem {
        matrix,
        rhs,
        reduced_dim: n,
        num_constraints: m,
    })
}

/// Assemble the augmented system from the operator, mass matrix, corner map
/// and constraints.
///
/// Inputs are only read; `A` and `b` are freshly allocated.
///
/// # Errors
///
/// Returns [`SeamlessError::DimensionMismatch`] if any two inputs disagree.
pub fn assemble_system(
    operator: &DifferentialOperator,
    mass: &CsrMatrix<f64>,
    corner_map: &CsrMatrix<f64>,
    constraints: &ConstraintSet,
) -> Result<AugmentedSystem> {
    let energy = reduced_energy(operator, mass, corner_map)?;
    augment(&energy, constraints)
}
