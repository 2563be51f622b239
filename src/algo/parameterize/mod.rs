//! Seamless parameterization from directional fields.
//!
//! This module computes per-corner parametric coordinates whose discrete
//! gradient best matches a combed N-directional field, subject to linear
//! constraints over a reduced set of unknowns. Each pipeline stage is public
//! so it can be run and inspected on its own:
//!
//! - [`differential_operator`]: difference operator `D` and edge targets `gamma`
//! - [`edge_mass_matrix`]: diagonal edge weights `M`
//! - [`assemble_system`]: reduced energy and augmented saddle-point system
//! - [`SaddlePointSolver`]: direct sparse LU factorization and solve
//! - [`project_to_corners`]: reduced solution back to corners
//!
//! [`parameterize`] runs all of them.
//!
//! # Inputs
//!
//! The caller supplies the mesh, the face-edge map, the field, one weight per
//! edge, the corner map `P` (which encodes the cut graph) and the constraint
//! set `C x = t` (which encodes seam continuity, pins and period jumps).
//! Building `P` and `C` for a cut mesh is the caller's job; this module only
//! ships builders for the two trivial cases, [`identity_corner_map`] and
//! [`vertex_corner_map`], and for pin constraints.
//!
//! # Example
//!
//! ```
//! use seamless::algo::parameterize::{
//!     parameterize, vertex_corner_map, ConstraintSet, SeamlessOptions, SeamlessProblem,
//! };
//! use seamless::field::DirectionalField;
//! use seamless::mesh::{EdgeTopology, TriMesh};
//! use nalgebra::{Point3, Vector3};
//!
//! let mesh = TriMesh::new(
//!     vec![
//!         Point3::new(0.0, 0.0, 0.0),
//!         Point3::new(1.0, 0.0, 0.0),
//!         Point3::new(1.0, 1.0, 0.0),
//!         Point3::new(0.0, 1.0, 0.0),
//!     ],
//!     vec![[0, 1, 2], [0, 2, 3]],
//! )
//! .unwrap();
//! let topo = EdgeTopology::from_faces(mesh.faces(), mesh.num_vertices()).unwrap();
//!
//! // Gradient of f(x, y) = x + 2y
//! let field = DirectionalField::uniform(mesh.num_faces(), &[Vector3::new(1.0, 2.0, 0.0)]).unwrap();
//! let weights = vec![1.0; topo.num_edges()];
//! let corner_map = vertex_corner_map(mesh.faces(), mesh.num_vertices(), 1).unwrap();
//! let constraints = ConstraintSet::pins(mesh.num_vertices(), &[(0, 0.0)]).unwrap();
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
//! // Corner 2 of face 0 is vertex 2 at (1, 1)
//! assert!((uv.get(0, 2, 0) - 3.0).abs() < 1e-9);
//! ```

mod constraints;
mod corner;
mod operator;
mod seamless;
mod sparse;
mod system;
mod weights;

pub use constraints::ConstraintSet;
pub use corner::{
    corner_index, identity_corner_map, project_to_corners, vertex_corner_map, CornerUV,
};
pub use operator::{differential_operator, DifferentialOperator};
pub use seamless::{
    parameterize, parameterize_with_progress, solve_seamless, SeamlessOptions, SeamlessProblem,
    SeamlessSolution,
};
pub use sparse::{csr_from_triplets, diagonal, is_symmetric, SaddlePointSolver};
pub use system::{assemble_system, augment, reduced_energy, AugmentedSystem, ReducedEnergy};
pub use weights::edge_mass_matrix;
