//! Mesh containers and topology.
//!
//! The parameterization works directly on face-vertex arrays. This module
//! provides a validated container for them, [`TriMesh`], and the edge tables
//! ([`EdgeTopology`]) from which the face-edge map is taken.
//!
//! # Conventions
//!
//! - Faces are `[usize; 3]` vertex triples, consistently counter-clockwise.
//! - Local corner `j` of face `f` is `faces[f][j]`.
//! - Local edge `j` of face `f` runs from corner `j` to corner `(j + 1) % 3`.
//!
//! ```
//! use seamless::mesh::{EdgeTopology, TriMesh};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let mesh = TriMesh::new(vertices, vec![[0, 1, 2], [0, 2, 3]]).unwrap();
//! let topo = EdgeTopology::from_faces(mesh.faces(), mesh.num_vertices()).unwrap();
//! assert_eq!(topo.num_edges(), 5);
//! ```

mod topology;
mod trimesh;

pub use topology::EdgeTopology;
pub use trimesh::TriMesh;

pub(crate) use trimesh::{face_edge_vector, validate_faces};
