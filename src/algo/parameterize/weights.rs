//! Edge weight (mass) matrix.

use nalgebra_sparse::CsrMatrix;

use crate::error::{Result, SeamlessError};

use super::corner::corner_index;
use super::sparse::diagonal;

/// Check that every face edge has a weight and, optionally, that weights are
/// finite and nonnegative.
pub(crate) fn validate_edge_weights(
    face_edges: &[[usize; 3]],
    edge_weights: &[f64],
    check_values: bool,
) -> Result<()> {
    for (face, fe) in face_edges.iter().enumerate() {
        for &edge in fe {
            if edge >= edge_weights.len() {
                return Err(SeamlessError::InvalidEdgeIndex {
                    face,
                    edge,
                    num_edges: edge_weights.len(),
                });
            }
        }
    }

    if check_values {
        if let Some((e, &w)) = edge_weights
            .iter()
            .enumerate()
            .find(|(_, w)| !(w.is_finite() && **w >= 0.0))
        {
            log::debug!("rejecting weight {} on edge {}", w, e);
            return Err(SeamlessError::invalid_param(
                "edge weight",
                w,
                "must be finite and nonnegative",
            ));
        }
    }

    Ok(())
}

/// Diagonal edge mass matrix `M`.
///
/// Entry `(r, r)` for `r = 3N·i + N·j + k` is the weight of the global edge at
/// local position `j` of face `i`, shared by all `N` branches. A zero weight
/// removes that difference from the energy.
///
/// Callers are expected to have checked that every edge index in
/// `face_edges` is in range (see [`SeamlessProblem::validate`]).
///
/// [`SeamlessProblem::validate`]: super::SeamlessProblem::validate
pub fn edge_mass_matrix(
    face_edges: &[[usize; 3]],
    edge_weights: &[f64],
    degree: usize,
) -> CsrMatrix<f64> {
    let mut diag = vec![0.0; 3 * degree * face_edges.len()];
    for (i, fe) in face_edges.iter().enumerate() {
        for (j, &edge) in fe.iter().enumerate() {
            for k in 0..degree {
                diag[corner_index(degree, i, j, k)] = edge_weights[edge];
            }
        }
    }
    diagonal(&diag)
}
