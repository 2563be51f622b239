//! Error types for seamless.
//!
//! Every fallible operation in the crate returns [`Result`]. Input problems are
//! reported before any matrix is assembled; factorization and solve failures
//! are terminal for the call and never leave a partial result behind.

use thiserror::Error;

/// Result type alias using [`SeamlessError`].
pub type Result<T> = std::result::Result<T, SeamlessError>;

/// Errors that can occur while building or solving a parameterization.
#[derive(Error, Debug)]
pub enum SeamlessError {
    /// The mesh has no faces.
    #[error("mesh has no faces")]
    EmptyMesh,

    /// A face references an invalid vertex index.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A face has duplicate vertex indices (degenerate triangle).
    #[error("face {face} is degenerate (has duplicate vertices)")]
    DegenerateFace {
        /// The face index.
        face: usize,
    },

    /// An edge has more than two incident faces.
    #[error("edge ({v0}, {v1}) has more than two incident faces")]
    NonManifoldEdge {
        /// First vertex of the edge.
        v0: usize,
        /// Second vertex of the edge.
        v1: usize,
    },

    /// The face-edge map references an edge with no weight.
    #[error("face {face} references edge {edge}, but only {num_edges} edge weights were given")]
    InvalidEdgeIndex {
        /// The face index.
        face: usize,
        /// The offending edge index.
        edge: usize,
        /// Number of edge weights supplied.
        num_edges: usize,
    },

    /// Two inputs disagree on a dimension.
    #[error("dimension mismatch in {what}: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Which quantity was checked.
        what: &'static str,
        /// The dimension implied by the other inputs.
        expected: usize,
        /// The dimension actually supplied.
        found: usize,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },

    /// The augmented system could not be factorized.
    #[error("factorization of the augmented system failed: {details}")]
    FactorizationFailed {
        /// Description of the failure.
        details: String,
    },

    /// Back-substitution produced an unusable solution.
    #[error("solving the augmented system failed: {details}")]
    SolveFailed {
        /// Description of the failure.
        details: String,
    },
}

impl SeamlessError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        SeamlessError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// Create a dimension mismatch error.
    pub fn mismatch(what: &'static str, expected: usize, found: usize) -> Self {
        SeamlessError::DimensionMismatch {
            what,
            expected,
            found,
        }
    }

    /// Whether this error was raised before any linear algebra ran.
    pub fn is_input_error(&self) -> bool {
        !matches!(
            self,
            SeamlessError::FactorizationFailed { .. } | SeamlessError::SolveFailed { .. }
        )
    }
}
