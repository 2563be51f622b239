//! Face-based difference operator and edge targets.
//!
//! For every face `i`, local corner `j` and branch `k`, row
//! `r = 3N·i + N·j + k` of the operator `D` measures the directed difference
//! "value at corner `j + 1` minus value at corner `j`" of branch `k`, and
//! `gamma[r]` is the projection of field branch `k` onto the same edge. A
//! scalar function whose differences match `gamma` has the field as its
//! gradient.

use nalgebra::{DVector, Point3};
use nalgebra_sparse::CsrMatrix;
use rayon::prelude::*;

use crate::field::DirectionalField;
use crate::mesh::face_edge_vector;

use super::corner::corner_index;
use super::sparse::csr_from_triplets;

/// The difference operator `D` together with its target vector `gamma`.
#[derive(Debug, Clone)]
pub struct DifferentialOperator {
    /// Sparse operator from corner-branch values to face-edge-branch differences.
    pub matrix: CsrMatrix<f64>,
    /// Target differences, one per row of `matrix`.
    pub gamma: DVector<f64>,
}

/// Operator triplets and targets for a single face, in row order.
fn face_block(
    vertices: &[Point3<f64>],
    face: &[usize; 3],
    field: &DirectionalField,
    i: usize,
) -> (Vec<(usize, usize, f64)>, Vec<f64>) {
    let n = field.degree();
    let mut triplets = Vec::with_capacity(6 * n);
    let mut gamma = Vec::with_capacity(3 * n);

    for j in 0..3 {
        let edge = face_edge_vector(vertices, face, j);
        for k in 0..n {
            let row = corner_index(n, i, j, k);
            triplets.push((row, row, -1.0));
            triplets.push((row, corner_index(n, i, (j + 1) % 3, k), 1.0));
            gamma.push(field.vector(i, k).dot(&edge));
        }
    }

    (triplets, gamma)
}

/// Build the difference operator and edge targets for a mesh and field.
///
/// The operator is square with side `3N·#F`. Faces are processed in parallel
/// when `parallel` is set; the result does not depend on it.
///
/// Callers are expected to have validated that the field covers every face
/// and that face indices are in range.
///
/// # Example
///
/// ```
/// use seamless::algo::parameterize::differential_operator;
/// use seamless::field::DirectionalField;
/// use nalgebra::{Point3, Vector3};
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let field = DirectionalField::uniform(1, &[Vector3::x()]).unwrap();
/// let op = differential_operator(&vertices, &[[0, 1, 2]], &field, false);
/// assert_eq!(op.gamma.as_slice(), &[1.0, -1.0, 0.0]);
/// ```
pub fn differential_operator(
    vertices: &[Point3<f64>],
    faces: &[[usize; 3]],
    field: &DirectionalField,
    parallel: bool,
) -> DifferentialOperator {
    let dim = 3 * field.degree() * faces.len();

    let blocks: Vec<(Vec<(usize, usize, f64)>, Vec<f64>)> = if parallel {
        faces
            .par_iter()
            .enumerate()
            .map(|(i, face)| face_block(vertices, face, field, i))
            .collect()
    } else {
        faces
            .iter()
            .enumerate()
            .map(|(i, face)| face_block(vertices, face, field, i))
            .collect()
    };

    let mut triplets = Vec::with_capacity(2 * dim);
    let mut gamma = Vec::with_capacity(dim);
    for (t, g) in blocks {
        triplets.extend(t);
        gamma.extend(g);
    }

    DifferentialOperator {
        matrix: csr_from_triplets(dim, dim, &triplets),
        gamma: DVector::from_vec(gamma),
    }
}
