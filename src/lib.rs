//! # Seamless
//!
//! Constrained global parameterization of triangle meshes from combed
//! directional fields.
//!
//! Given an N-directional field on the faces of a mesh whose branches have
//! already been matched across edges, seamless computes per-corner parametric
//! coordinates whose discrete gradient best matches the field in a weighted
//! least-squares sense, subject to linear equality constraints (continuity
//! across cuts, fixed values, period conditions).
//!
//! ## Features
//!
//! - **Face-based difference operator**: one directed difference per face
//!   edge and field branch
//! - **Saddle-point assembly**: energy and constraints combined through
//!   Lagrange multipliers, with non-homogeneous targets
//! - **Direct sparse solve**: LU factorization of the indefinite system via
//!   `faer`
//! - **Typed failures**: dimension errors before solving, explicit
//!   factorization and solve errors after
//!
//! ## Quick Start
//!
//! ```
//! use seamless::prelude::*;
//! use nalgebra::{Point3, Vector3};
//!
//! let mesh = TriMesh::new(
//!     vec![
//!         Point3::new(0.0, 0.0, 0.0),
//!         Point3::new(1.0, 0.0, 0.0),
//!         Point3::new(0.0, 1.0, 0.0),
//!     ],
//!     vec![[0, 1, 2]],
//! )
//! .unwrap();
//! let topo = EdgeTopology::from_faces(mesh.faces(), mesh.num_vertices()).unwrap();
//!
//! let field = DirectionalField::uniform(1, &[Vector3::x()]).unwrap();
//! let weights = vec![1.0; topo.num_edges()];
//! let corner_map = identity_corner_map(1, 1);
//! let constraints = ConstraintSet::pins(3, &[(0, 0.0)]).unwrap();
//!
//! let problem = SeamlessProblem::new(
//!     &mesh,
//!     topo.face_edges(),
//!     &field,
//!     &weights,
//!     &corner_map,
//!     &constraints,
//! );
//! let uv = parameterize(&problem, &SeamlessOptions::default()).unwrap();
//!
//! // The recovered function is the x-coordinate
//! assert!((uv.get(0, 1, 0) - 1.0).abs() < 1e-10);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod field;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// ```
/// use seamless::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::parameterize::{
        identity_corner_map, parameterize, vertex_corner_map, ConstraintSet, CornerUV,
        SeamlessOptions, SeamlessProblem,
    };
    pub use crate::algo::Progress;
    pub use crate::error::{Result, SeamlessError};
    pub use crate::field::DirectionalField;
    pub use crate::mesh::{EdgeTopology, TriMesh};
}

// Re-export the linear algebra crates used in the public API
pub use nalgebra;
pub use nalgebra_sparse;

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use nalgebra::{Point3, Vector3};

    #[test]
    fn test_tetrahedron_pipeline() {
        // Closed surface, cut-free map: gradient of f = z on a tetrahedron
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, 0.5, 1.0),
        ];
        let faces = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
        let mesh = TriMesh::new(vertices.clone(), faces).unwrap();
        let topo = EdgeTopology::from_faces(mesh.faces(), mesh.num_vertices()).unwrap();

        // Project the constant gradient (0, 0, 1) onto each face plane
        let per_face: Vec<Vector3<f64>> = (0..mesh.num_faces())
            .map(|f| {
                let n = mesh.face_normal(f).normalize();
                let g = Vector3::z();
                g - n * n.dot(&g)
            })
            .collect();
        let field = DirectionalField::from_vectors(1, per_face).unwrap();

        let weights = vec![1.0; topo.num_edges()];
        let corner_map = vertex_corner_map(mesh.faces(), mesh.num_vertices(), 1).unwrap();
        let constraints = ConstraintSet::pins(4, &[(0, 0.0)]).unwrap();

        let problem = SeamlessProblem::new(
            &mesh,
            topo.face_edges(),
            &field,
            &weights,
            &corner_map,
            &constraints,
        );
        let uv = parameterize(&problem, &SeamlessOptions::default()).unwrap();

        for (f, face) in mesh.faces().iter().enumerate() {
            for (j, &v) in face.iter().enumerate() {
                assert!(
                    (uv.get(f, j, 0) - vertices[v].z).abs() < 1e-9,
                    "face {} corner {}",
                    f,
                    j
                );
            }
        }
    }
}
