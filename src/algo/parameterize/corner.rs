//! Corner-branch indexing, corner maps and per-corner results.
//!
//! Per-corner values are laid out face-major, then corner, then branch:
//! value `(f, j, k)` sits at index `3N·f + N·j + k`. A corner map `P` takes
//! reduced unknowns (the degrees of freedom left after merging corners not
//! separated by a cut) to this layout.

use nalgebra::DVector;
use nalgebra_sparse::CsrMatrix;

use crate::error::{Result, SeamlessError};

use super::sparse::csr_from_triplets;

/// Flat index of branch `branch` at local corner `corner` of face `face`.
///
/// The corner is reduced modulo 3 before it is scaled by the degree, so
/// `corner_index(n, f, j + 3, k) == corner_index(n, f, j, k)`.
#[inline]
pub fn corner_index(degree: usize, face: usize, corner: usize, branch: usize) -> usize {
    3 * degree * face + degree * (corner % 3) + branch
}

/// Corner map with one reduced unknown per corner branch.
///
/// This is the map of a mesh cut along every edge: no two corners share a
/// value, so all coupling has to come from constraints.
pub fn identity_corner_map(num_faces: usize, degree: usize) -> CsrMatrix<f64> {
    CsrMatrix::identity(3 * degree * num_faces)
}

/// Corner map of a mesh without cuts.
///
/// Reduced unknown `N·v + k` holds branch `k` at vertex `v`, and every corner
/// that references `v` reads it.
///
/// # Errors
///
/// Returns an error if a face references a vertex out of range or `degree` is
/// zero.
pub fn vertex_corner_map(
    faces: &[[usize; 3]],
    num_vertices: usize,
    degree: usize,
) -> Result<CsrMatrix<f64>> {
    if degree == 0 {
        return Err(SeamlessError::invalid_param(
            "degree",
            degree,
            "must be at least 1",
        ));
    }

    let mut triplets = Vec::with_capacity(3 * degree * faces.len());
    for (f, face) in faces.iter().enumerate() {
        for (j, &v) in face.iter().enumerate() {
            if v >= num_vertices {
                return Err(SeamlessError::InvalidVertexIndex { face: f, vertex: v });
            }
            for k in 0..degree {
                triplets.push((corner_index(degree, f, j, k), degree * v + k, 1.0));
            }
        }
    }

    Ok(csr_from_triplets(
        3 * degree * faces.len(),
        degree * num_vertices,
        &triplets,
    ))
}

/// Map a reduced solution back to corners: `P · x`.
///
/// Only the first `P.ncols()` entries of `solution` are read; any trailing
/// entries (Lagrange multipliers) are ignored.
///
/// # Errors
///
/// Returns an error if `solution` is shorter than the reduced dimension or the
/// corner map's row count is not `3N·num_faces`.
pub fn project_to_corners(
    corner_map: &CsrMatrix<f64>,
    solution: &DVector<f64>,
    num_faces: usize,
    degree: usize,
) -> Result<CornerUV> {
    let reduced = corner_map.ncols();
    if solution.len() < reduced {
        return Err(SeamlessError::mismatch(
            "solution length",
            reduced,
            solution.len(),
        ));
    }
    if corner_map.nrows() != 3 * degree * num_faces {
        return Err(SeamlessError::mismatch(
            "corner map rows",
            3 * degree * num_faces,
            corner_map.nrows(),
        ));
    }

    let x = solution.rows(0, reduced).into_owned();
    let values = corner_map * &x;
    CornerUV::new(degree, values.as_slice().to_vec())
}

/// Per-corner parametric values.
///
/// Holds `3N` values per face, one per corner per branch.
///
/// # Example
///
/// ```
/// use seamless::algo::parameterize::CornerUV;
///
/// // One face, two branches
/// let uv = CornerUV::new(2, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
/// assert_eq!(uv.num_faces(), 1);
/// assert_eq!(uv.get(0, 1, 0), 2.0);
/// assert_eq!(uv.get(0, 2, 1), 5.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CornerUV {
    degree: usize,
    values: Vec<f64>,
}

impl CornerUV {
    /// Wrap raw values laid out as (face, corner, branch).
    ///
    /// # Errors
    ///
    /// Returns an error if `degree` is zero or the length is not a multiple of
    /// `3 * degree`.
    pub fn new(degree: usize, values: Vec<f64>) -> Result<Self> {
        if degree == 0 {
            return Err(SeamlessError::invalid_param(
                "degree",
                degree,
                "must be at least 1",
            ));
        }
        if values.len() % (3 * degree) != 0 {
            return Err(SeamlessError::invalid_param(
                "corner value count",
                values.len(),
                "must be a multiple of 3 * degree",
            ));
        }
        Ok(Self { degree, values })
    }

    /// Number of branches per corner.
    #[inline]
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Number of faces covered.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.values.len() / (3 * self.degree)
    }

    /// Value of branch `branch` at corner `corner` of face `face`.
    #[inline]
    pub fn get(&self, face: usize, corner: usize, branch: usize) -> f64 {
        self.values[corner_index(self.degree, face, corner, branch)]
    }

    /// The `3N` values of one face.
    #[inline]
    pub fn face(&self, face: usize) -> &[f64] {
        let stride = 3 * self.degree;
        &self.values[face * stride..(face + 1) * stride]
    }

    /// Total number of values.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw values.
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Take the raw values.
    pub fn into_vec(self) -> Vec<f64> {
        self.values
    }

    /// Minimum and maximum of each branch over all corners.
    ///
    /// Returns `None` if there are no values.
    pub fn branch_range(&self) -> Option<Vec<(f64, f64)>> {
        if self.values.is_empty() {
            return None;
        }

        let mut ranges = vec![(f64::INFINITY, f64::NEG_INFINITY); self.degree];
        for (i, &v) in self.values.iter().enumerate() {
            let range = &mut ranges[i % self.degree];
            range.0 = range.0.min(v);
            range.1 = range.1.max(v);
        }
        Some(ranges)
    }
}
