//! Per-face directional fields.
//!
//! A directional field of degree `N` stores `N` vectors on every face. The
//! vectors are expected to lie in the face plane and to be combed: branch `k`
//! on one face corresponds to branch `k` on its neighbors everywhere except
//! across seams.

use nalgebra::{DMatrix, Vector3};

use crate::error::{Result, SeamlessError};

/// An N-directional field sampled per face.
///
/// Vectors are stored face-major, branch-minor: branch `k` of face `f` is
/// element `f * N + k`.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalField {
    degree: usize,
    vectors: Vec<Vector3<f64>>,
}

impl DirectionalField {
    /// Build a field from the raw `#F x 3N` layout.
    ///
    /// Row `f` holds `x0 y0 z0 x1 y1 z1 ...` for the `N` branches of face `f`.
    /// The degree is inferred from the column count.
    ///
    /// # Errors
    ///
    /// Returns an error if the row count differs from `num_faces`, or if the
    /// column count is zero or not a multiple of three.
    ///
    /// # Example
    ///
    /// ```
    /// use seamless::field::DirectionalField;
    /// use nalgebra::DMatrix;
    ///
    /// // One face, two branches: +x and +y
    /// let raw = DMatrix::from_row_slice(1, 6, &[1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
    /// let field = DirectionalField::from_raw(1, &raw).unwrap();
    /// assert_eq!(field.degree(), 2);
    /// assert_eq!(field.vector(0, 1).y, 1.0);
    /// ```
    pub fn from_raw(num_faces: usize, raw: &DMatrix<f64>) -> Result<Self> {
        if raw.nrows() != num_faces {
            return Err(SeamlessError::mismatch("field rows", num_faces, raw.nrows()));
        }
        if raw.ncols() == 0 || raw.ncols() % 3 != 0 {
            return Err(SeamlessError::invalid_param(
                "field columns",
                raw.ncols(),
                "must be a positive multiple of 3",
            ));
        }

        let degree = raw.ncols() / 3;
        let mut vectors = Vec::with_capacity(num_faces * degree);
        for f in 0..num_faces {
            for k in 0..degree {
                vectors.push(Vector3::new(
                    raw[(f, 3 * k)],
                    raw[(f, 3 * k + 1)],
                    raw[(f, 3 * k + 2)],
                ));
            }
        }

        Ok(Self { degree, vectors })
    }

    /// Build a field from face-major, branch-minor vectors.
    ///
    /// # Errors
    ///
    /// Returns an error if `degree` is zero or the vector count is not a
    /// multiple of it.
    pub fn from_vectors(degree: usize, vectors: Vec<Vector3<f64>>) -> Result<Self> {
        if degree == 0 {
            return Err(SeamlessError::invalid_param(
                "degree",
                degree,
                "must be at least 1",
            ));
        }
        if vectors.len() % degree != 0 {
            return Err(SeamlessError::invalid_param(
                "field length",
                vectors.len(),
                "must be a multiple of the degree",
            ));
        }
        Ok(Self { degree, vectors })
    }

    /// A field where every face carries the same `N` vectors.
    pub fn uniform(num_faces: usize, branches: &[Vector3<f64>]) -> Result<Self> {
        let vectors = (0..num_faces)
            .flat_map(|_| branches.iter().copied())
            .collect();
        Self::from_vectors(branches.len(), vectors)
    }

    /// Number of branches per face (`N`).
    #[inline]
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Number of faces the field covers.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.vectors.len() / self.degree
    }

    /// Branch `k` of face `f`.
    #[inline]
    pub fn vector(&self, f: usize, k: usize) -> Vector3<f64> {
        self.vectors[f * self.degree + k]
    }

    /// All branches of face `f`.
    #[inline]
    pub fn face(&self, f: usize) -> &[Vector3<f64>] {
        &self.vectors[f * self.degree..(f + 1) * self.degree]
    }

    /// Whether every component is finite.
    pub fn is_finite(&self) -> bool {
        self.vectors
            .iter()
            .all(|v| v.iter().all(|c| c.is_finite()))
    }

    /// Back to the raw `#F x 3N` layout.
    pub fn to_raw(&self) -> DMatrix<f64> {
        DMatrix::from_fn(self.num_faces(), 3 * self.degree, |f, c| {
            self.vector(f, c / 3)[c % 3]
        })
    }
}
