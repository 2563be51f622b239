//! Constrained global parameterization from a combed directional field.
//!
//! Given an N-directional field on the faces of a mesh, finds per-corner
//! values whose differences along every triangle edge best match the field's
//! projection onto that edge, in a weighted least-squares sense and subject to
//! linear equality constraints over reduced unknowns.
//!
//! The pipeline runs strictly forward:
//!
//! 1. difference operator `D` and edge targets `gamma`,
//! 2. edge mass matrix `M`,
//! 3. reduced energy `Pᵗ Dᵗ M D P` and the augmented saddle-point system,
//! 4. direct sparse factorization and solve,
//! 5. projection of the reduced solution back to corners.
//!
//! # References
//!
//! - Kälberer, F., Nieser, M., & Polthier, K. (2007). "QuadCover - Surface
//!   Parameterization using Branched Coverings." Computer Graphics Forum.
//! - Bommes, D., Zimmer, H., & Kobbelt, L. (2009). "Mixed-integer
//!   quadrangulation." ACM SIGGRAPH.

use std::time::Instant;

use nalgebra::{DVector, Point3};
use nalgebra_sparse::CsrMatrix;

use crate::algo::Progress;
use crate::algo::Stage;
use crate::error::{Result, SeamlessError};
use crate::field::DirectionalField;
use crate::mesh::{validate_faces, TriMesh};

use super::constraints::ConstraintSet;
use super::corner::{project_to_corners, CornerUV};
use super::operator::differential_operator;
use super::sparse::SaddlePointSolver;
use super::system::assemble_system;
use super::weights::{edge_mass_matrix, validate_edge_weights};

/// Options for the seamless parameterization solve.
#[derive(Debug, Clone)]
pub struct SeamlessOptions {
    /// Whether to build per-face operator blocks in parallel (default: true).
    pub parallel: bool,

    /// Reject negative or non-finite edge weights (default: true).
    pub check_weights: bool,

    /// Check `C x = t` after solving (default: true).
    pub verify_constraints: bool,

    /// Tolerance for the constraint check, relative to `1 + |t|∞`.
    pub constraint_tolerance: f64,

    /// Bound on the scaled residual of the augmented solve.
    pub residual_tolerance: f64,

    /// Largest accepted condition estimate of the augmented system.
    pub condition_limit: f64,
}

impl Default for SeamlessOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            check_weights: true,
            verify_constraints: true,
            constraint_tolerance: 1e-8,
            residual_tolerance: SaddlePointSolver::DEFAULT_RESIDUAL_TOLERANCE,
            condition_limit: SaddlePointSolver::DEFAULT_CONDITION_LIMIT,
        }
    }
}

impl SeamlessOptions {
    /// Set whether to use parallel assembly.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Use single-threaded assembly.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set whether edge weights are checked for sign and finiteness.
    pub fn with_check_weights(mut self, check: bool) -> Self {
        self.check_weights = check;
        self
    }

    /// Set the post-solve constraint tolerance, enabling the check.
    pub fn with_constraint_tolerance(mut self, tol: f64) -> Self {
        self.verify_constraints = true;
        self.constraint_tolerance = tol;
        self
    }

    /// Skip the post-solve constraint check.
    pub fn without_constraint_check(mut self) -> Self {
        self.verify_constraints = false;
        self
    }

    /// Set the scaled residual bound for the augmented solve.
    pub fn with_residual_tolerance(mut self, tol: f64) -> Self {
        self.residual_tolerance = tol;
        self
    }

    /// Set the condition estimate above which the system counts as singular.
    pub fn with_condition_limit(mut self, limit: f64) -> Self {
        self.condition_limit = limit;
        self
    }
}

/// All inputs of one parameterization solve, borrowed from the caller.
#[derive(Debug, Clone, Copy)]
pub struct SeamlessProblem<'a> {
    /// Vertex positions.
    pub vertices: &'a [Point3<f64>],
    /// Counter-clockwise triangle faces.
    pub faces: &'a [[usize; 3]],
    /// Global edge of each local edge of each face.
    pub face_edges: &'a [[usize; 3]],
    /// Combed N-directional field, one set of `N` vectors per face.
    pub field: &'a DirectionalField,
    /// One weight per global edge.
    pub edge_weights: &'a [f64],
    /// Corner map `P` from reduced unknowns to corner branches.
    pub corner_map: &'a CsrMatrix<f64>,
    /// Constraints `C x = t` over reduced unknowns.
    pub constraints: &'a ConstraintSet,
}

impl<'a> SeamlessProblem<'a> {
    /// Bundle a mesh with the remaining inputs.
    pub fn new(
        mesh: &'a TriMesh,
        face_edges: &'a [[usize; 3]],
        field: &'a DirectionalField,
        edge_weights: &'a [f64],
        corner_map: &'a CsrMatrix<f64>,
        constraints: &'a ConstraintSet,
    ) -> Self {
        Self {
            vertices: mesh.vertices(),
            faces: mesh.faces(),
            face_edges,
            field,
            edge_weights,
            corner_map,
            constraints,
        }
    }

    /// Field degree `N`.
    #[inline]
    pub fn degree(&self) -> usize {
        self.field.degree()
    }

    /// Number of corner branches, `3N·#F`.
    #[inline]
    pub fn num_corner_values(&self) -> usize {
        3 * self.degree() * self.faces.len()
    }

    /// Number of reduced unknowns.
    #[inline]
    pub fn reduced_dim(&self) -> usize {
        self.corner_map.ncols()
    }

    /// Check every dimension and index before any matrix is built.
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found: invalid faces, a field that
    /// does not cover every face or is not finite, a face-edge map of the
    /// wrong length or with edges that have no weight, invalid weights (if
    /// `check_weights`), or a corner map / constraint matrix whose dimensions
    /// disagree.
    pub fn validate(&self, check_weights: bool) -> Result<()> {
        validate_faces(self.faces, self.vertices.len())?;

        if self.field.num_faces() != self.faces.len() {
            return Err(SeamlessError::mismatch(
                "field faces",
                self.faces.len(),
                self.field.num_faces(),
            ));
        }
        if !self.field.is_finite() {
            return Err(SeamlessError::invalid_param(
                "field",
                "non-finite",
                "every component must be finite",
            ));
        }

        if self.face_edges.len() != self.faces.len() {
            return Err(SeamlessError::mismatch(
                "face-edge map rows",
                self.faces.len(),
                self.face_edges.len(),
            ));
        }
        validate_edge_weights(self.face_edges, self.edge_weights, check_weights)?;

        if self.corner_map.nrows() != self.num_corner_values() {
            return Err(SeamlessError::mismatch(
                "corner map rows",
                self.num_corner_values(),
                self.corner_map.nrows(),
            ));
        }
        if self.constraints.reduced_dim() != self.reduced_dim() {
            return Err(SeamlessError::mismatch(
                "constraint columns",
                self.reduced_dim(),
                self.constraints.reduced_dim(),
            ));
        }

        Ok(())
    }
}

/// Result of a solve, including the reduced solution.
#[derive(Debug, Clone)]
pub struct SeamlessSolution {
    /// Per-corner values, `P x`.
    pub corner_uv: CornerUV,
    /// Reduced unknowns `x`.
    pub reduced: DVector<f64>,
    /// Lagrange multipliers, one per constraint.
    pub multipliers: DVector<f64>,
}

/// Compute per-corner parametric values from a directional field.
///
/// # Errors
///
/// - Dimension and index errors from [`SeamlessProblem::validate`].
/// - [`SeamlessError::FactorizationFailed`] if the augmented system is
///   singular or numerically close to it, typically because constraints are
///   dependent or do not fix the energy's null space.
/// - [`SeamlessError::SolveFailed`] if the solution is not finite, its
///   residual is too large, or it violates the constraints.
///
/// No partial output is produced on failure.
///
/// # Example
///
/// ```
/// use seamless::algo::parameterize::{
///     identity_corner_map, parameterize, ConstraintSet, SeamlessOptions, SeamlessProblem,
/// };
/// use seamless::field::DirectionalField;
/// use nalgebra::{Point3, Vector3};
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let faces = vec![[0, 1, 2]];
/// let face_edges = vec![[0, 1, 2]];
/// let field = DirectionalField::uniform(1, &[Vector3::x()]).unwrap();
/// let weights = vec![1.0; 3];
/// let corner_map = identity_corner_map(1, 1);
/// let constraints = ConstraintSet::pins(3, &[(0, 0.0)]).unwrap();
///
/// let problem = SeamlessProblem {
///     vertices: &vertices,
///     faces: &faces,
///     face_edges: &face_edges,
///     field: &field,
///     edge_weights: &weights,
///     corner_map: &corner_map,
///     constraints: &constraints,
/// };
/// let uv = parameterize(&problem, &SeamlessOptions::default()).unwrap();
/// assert!((uv.get(0, 1, 0) - 1.0).abs() < 1e-10);
/// ```
pub fn parameterize(problem: &SeamlessProblem<'_>, options: &SeamlessOptions) -> Result<CornerUV> {
    parameterize_with_progress(problem, options, &Progress::none())
}

/// [`parameterize`] with stage-by-stage progress reporting.
pub fn parameterize_with_progress(
    problem: &SeamlessProblem<'_>,
    options: &SeamlessOptions,
    progress: &Progress,
) -> Result<CornerUV> {
    solve_seamless(problem, options, progress).map(|solution| solution.corner_uv)
}

/// Run the full pipeline and return the reduced solution alongside corner
/// values.
pub fn solve_seamless(
    problem: &SeamlessProblem<'_>,
    options: &SeamlessOptions,
    progress: &Progress,
) -> Result<SeamlessSolution> {
    problem.validate(options.check_weights)?;

    let degree = problem.degree();
    let num_faces = problem.faces.len();
    log::debug!(
        "seamless solve: {} faces, degree {}, {} reduced unknowns, {} constraints",
        num_faces,
        degree,
        problem.reduced_dim(),
        problem.constraints.len()
    );

    let start = Instant::now();

    progress.stage(Stage::Operator);
    let operator =
        differential_operator(problem.vertices, problem.faces, problem.field, options.parallel);
    log::debug!("operator built in {:.2?}", start.elapsed());

    progress.stage(Stage::Weights);
    let mass = edge_mass_matrix(problem.face_edges, problem.edge_weights, degree);

    progress.stage(Stage::Assembly);
    let stage_start = Instant::now();
    let system = assemble_system(&operator, &mass, problem.corner_map, problem.constraints)?;
    log::debug!(
        "assembled {}x{} system in {:.2?}",
        system.dim(),
        system.dim(),
        stage_start.elapsed()
    );

    progress.stage(Stage::Solve);
    let stage_start = Instant::now();
    let solver =
        SaddlePointSolver::factorize_with_condition_limit(&system.matrix, options.condition_limit)?
            .with_residual_tolerance(options.residual_tolerance);
    let solution = solver.solve(&system.rhs)?;
    let (reduced, multipliers) = system.split_solution(&solution);
    log::debug!("factorized and solved in {:.2?}", stage_start.elapsed());

    if options.verify_constraints && !problem.constraints.is_empty() {
        let violation = problem.constraints.residual(&reduced).amax();
        let bound = options.constraint_tolerance * (1.0 + problem.constraints.targets().amax());
        if violation.is_nan() || violation > bound {
            return Err(SeamlessError::SolveFailed {
                details: format!(
                    "constraint violation {:.3e} exceeds {:.3e}",
                    violation, bound
                ),
            });
        }
    }

    progress.stage(Stage::Projection);
    let corner_uv = project_to_corners(problem.corner_map, &reduced, num_faces, degree)?;

    log::info!("seamless solve finished in {:.2?}", start.elapsed());

    Ok(SeamlessSolution {
        corner_uv,
        reduced,
        multipliers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::parameterize::corner::identity_corner_map;
    use nalgebra::Vector3;
    use std::sync::{Arc, Mutex};

    struct Fixture {
        vertices: Vec<Point3<f64>>,
        faces: Vec<[usize; 3]>,
        face_edges: Vec<[usize; 3]>,
        field: DirectionalField,
        weights: Vec<f64>,
        corner_map: CsrMatrix<f64>,
        constraints: ConstraintSet,
    }

    impl Fixture {
        fn problem(&self) -> SeamlessProblem<'_> {
            SeamlessProblem {
                vertices: &self.vertices,
                faces: &self.faces,
                face_edges: &self.face_edges,
                field: &self.field,
                edge_weights: &self.weights,
                corner_map: &self.corner_map,
                constraints: &self.constraints,
            }
        }
    }

    fn unit_triangle() -> Fixture {
        Fixture {
            vertices: vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            faces: vec![[0, 1, 2]],
            face_edges: vec![[0, 1, 2]],
            field: DirectionalField::uniform(1, &[Vector3::x()]).unwrap(),
            weights: vec![1.0; 3],
            corner_map: identity_corner_map(1, 1),
            constraints: ConstraintSet::pins(3, &[(0, 0.0)]).unwrap(),
        }
    }

    #[test]
    fn test_unit_triangle_recovers_x() {
        let fx = unit_triangle();
        let uv = parameterize(&fx.problem(), &SeamlessOptions::default()).unwrap();

        assert_eq!(uv.len(), 3);
        assert!((uv.get(0, 0, 0) - 0.0).abs() < 1e-10);
        assert!((uv.get(0, 1, 0) - 1.0).abs() < 1e-10);
        assert!((uv.get(0, 2, 0) - 0.0).abs() < 1e-10);
    }

    #[test]
    fn test_solution_exposes_multipliers() {
        let fx = unit_triangle();
        let solution =
            solve_seamless(&fx.problem(), &SeamlessOptions::default(), &Progress::none()).unwrap();

        assert_eq!(solution.reduced.len(), 3);
        assert_eq!(solution.multipliers.len(), 1);
        // Exact fit: zero energy gradient, so the pin needs no force
        assert!(solution.multipliers[0].abs() < 1e-10);
    }

    #[test]
    fn test_progress_reports_every_stage() {
        let fx = unit_triangle();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let progress = Progress::new(move |current, total, message| {
            sink.lock().unwrap().push((current, total, message.to_string()));
        });

        parameterize_with_progress(&fx.problem(), &SeamlessOptions::default(), &progress).unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), Stage::COUNT);
        for (i, (current, total, _)) in seen.iter().enumerate() {
            assert_eq!(*current, i);
            assert_eq!(*total, Stage::COUNT);
        }
        assert_eq!(seen[3].2, Stage::Solve.message());
    }

    #[test]
    fn test_validate_rejects_field_face_mismatch() {
        let mut fx = unit_triangle();
        fx.field = DirectionalField::uniform(2, &[Vector3::x()]).unwrap();
        assert!(matches!(
            parameterize(&fx.problem(), &SeamlessOptions::default()),
            Err(SeamlessError::DimensionMismatch { what: "field faces", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_degree_mismatch_with_corner_map() {
        // Field of degree 2 against a corner map sized for degree 1
        let mut fx = unit_triangle();
        fx.field = DirectionalField::uniform(1, &[Vector3::x(), Vector3::y()]).unwrap();
        assert!(matches!(
            parameterize(&fx.problem(), &SeamlessOptions::default()),
            Err(SeamlessError::DimensionMismatch { what: "corner map rows", expected: 6, found: 3 })
        ));
    }

    #[test]
    fn test_validate_rejects_constraint_columns() {
        let mut fx = unit_triangle();
        fx.constraints = ConstraintSet::pins(4, &[(0, 0.0)]).unwrap();
        assert!(matches!(
            parameterize(&fx.problem(), &SeamlessOptions::default()),
            Err(SeamlessError::DimensionMismatch { what: "constraint columns", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_face_edges() {
        let mut fx = unit_triangle();
        fx.face_edges = vec![];
        assert!(matches!(
            parameterize(&fx.problem(), &SeamlessOptions::default()),
            Err(SeamlessError::DimensionMismatch { what: "face-edge map rows", .. })
        ));

        let mut fx = unit_triangle();
        fx.face_edges = vec![[0, 1, 7]];
        assert!(matches!(
            parameterize(&fx.problem(), &SeamlessOptions::default()),
            Err(SeamlessError::InvalidEdgeIndex { edge: 7, .. })
        ));
    }

    #[test]
    fn test_negative_weight_policy() {
        let mut fx = unit_triangle();
        fx.weights = vec![1.0, -1.0, 1.0];
        let err = parameterize(&fx.problem(), &SeamlessOptions::default()).unwrap_err();
        assert!(err.is_input_error());

        // With checks off the weight flows through to the energy
        let options = SeamlessOptions::default().with_check_weights(false);
        assert!(fx.problem().validate(options.check_weights).is_ok());
    }

    #[test]
    fn test_non_finite_field_rejected() {
        let mut fx = unit_triangle();
        fx.field = DirectionalField::uniform(1, &[Vector3::new(f64::NAN, 0.0, 0.0)]).unwrap();
        assert!(matches!(
            parameterize(&fx.problem(), &SeamlessOptions::default()),
            Err(SeamlessError::InvalidParameter { name: "field", .. })
        ));
    }

    #[test]
    fn test_unconstrained_isolated_unknown_fails_factorization() {
        // Zero weights and no constraints leave an all-zero system
        let mut fx = unit_triangle();
        fx.weights = vec![0.0; 3];
        fx.constraints = ConstraintSet::pins(3, &[]).unwrap();

        assert!(matches!(
            parameterize(&fx.problem(), &SeamlessOptions::default()),
            Err(SeamlessError::FactorizationFailed { .. })
        ));
    }

    #[test]
    fn test_sequential_and_parallel_agree() {
        let fx = unit_triangle();
        let a = parameterize(&fx.problem(), &SeamlessOptions::default().sequential()).unwrap();
        let b = parameterize(&fx.problem(), &SeamlessOptions::default().with_parallel(true))
            .unwrap();
        for (x, y) in a.as_slice().iter().zip(b.as_slice()) {
            assert!((x - y).abs() < 1e-12);
        }
    }

    #[test]
    fn test_missing_pin_fails_factorization() {
        // Unit weights and no constraints: constants stay free
        let mut fx = unit_triangle();
        fx.constraints = ConstraintSet::pins(3, &[]).unwrap();

        let err = parameterize(&fx.problem(), &SeamlessOptions::default()).unwrap_err();
        assert!(matches!(err, SeamlessError::FactorizationFailed { .. }));
        assert!(!err.is_input_error());
    }

    #[test]
    fn test_repeated_pin_fails_factorization() {
        let mut fx = unit_triangle();
        let pin = ConstraintSet::pins(3, &[(0, 0.0)]).unwrap();
        fx.constraints = pin.stack(&pin).unwrap();

        assert!(matches!(
            parameterize(&fx.problem(), &SeamlessOptions::default()),
            Err(SeamlessError::FactorizationFailed { .. })
        ));
    }
}
