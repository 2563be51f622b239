//! Edge topology of a face-vertex mesh.
//!
//! Builds the three tables the parameterization consumes: the face-edge map,
//! the edge-vertex table and the edge-face table.

use std::collections::HashMap;

use super::trimesh::validate_faces;
use crate::error::{Result, SeamlessError};

/// Edge adjacency tables for a triangle mesh.
///
/// Edges are numbered in the order they are first met when scanning faces and
/// then local edges. For edge `e` with `edge_vertices[e] = [a, b]` (`a < b`),
/// `edge_faces[e][0]` is the face that traverses the edge from `a` to `b` and
/// `edge_faces[e][1]` the face that traverses it from `b` to `a`. A missing
/// side is `None`, which marks a boundary edge.
#[derive(Debug, Clone)]
pub struct EdgeTopology {
    edge_vertices: Vec<[usize; 2]>,
    edge_faces: Vec<[Option<usize>; 2]>,
    face_edges: Vec<[usize; 3]>,
}

impl EdgeTopology {
    /// Extract edge topology from triangle faces.
    ///
    /// # Errors
    ///
    /// Returns an error if the faces are invalid, or if an edge is traversed
    /// twice in the same direction (more than two incident faces, or
    /// inconsistent orientation).
    ///
    /// # Example
    ///
    /// ```
    /// use seamless::mesh::EdgeTopology;
    ///
    /// let faces = vec![[0, 1, 2], [1, 3, 2]];
    /// let topo = EdgeTopology::from_faces(&faces, 4).unwrap();
    /// assert_eq!(topo.num_edges(), 5);
    /// assert_eq!(topo.face_edges()[0][1], topo.face_edges()[1][2]);
    /// ```
    pub fn from_faces(faces: &[[usize; 3]], num_vertices: usize) -> Result<Self> {
        validate_faces(faces, num_vertices)?;

        let mut edge_index: HashMap<(usize, usize), usize> =
            HashMap::with_capacity(faces.len() * 3 / 2 + 1);
        let mut edge_vertices = Vec::new();
        let mut edge_faces: Vec<[Option<usize>; 2]> = Vec::new();
        let mut face_edges = Vec::with_capacity(faces.len());

        for (fi, face) in faces.iter().enumerate() {
            let mut fe = [0usize; 3];
            for j in 0..3 {
                let v0 = face[j];
                let v1 = face[(j + 1) % 3];
                let key = (v0.min(v1), v0.max(v1));
                let side = usize::from(v0 > v1);

                let e = *edge_index.entry(key).or_insert_with(|| {
                    edge_vertices.push([key.0, key.1]);
                    edge_faces.push([None, None]);
                    edge_vertices.len() - 1
                });

                if edge_faces[e][side].is_some() {
                    return Err(SeamlessError::NonManifoldEdge { v0: key.0, v1: key.1 });
                }
                edge_faces[e][side] = Some(fi);
                fe[j] = e;
            }
            face_edges.push(fe);
        }

        log::debug!(
            "edge topology: {} faces, {} edges",
            faces.len(),
            edge_vertices.len()
        );

        Ok(Self {
            edge_vertices,
            edge_faces,
            face_edges,
        })
    }

    /// Number of edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edge_vertices.len()
    }

    /// Edge-vertex table (`EV`), smaller vertex index first.
    #[inline]
    pub fn edge_vertices(&self) -> &[[usize; 2]] {
        &self.edge_vertices
    }

    /// Edge-face table (`EF`).
    #[inline]
    pub fn edge_faces(&self) -> &[[Option<usize>; 2]] {
        &self.edge_faces
    }

    /// Face-edge map (`FE`): global edge of each local edge of each face.
    #[inline]
    pub fn face_edges(&self) -> &[[usize; 3]] {
        &self.face_edges
    }

    /// Whether edge `e` has only one incident face.
    #[inline]
    pub fn is_boundary_edge(&self, e: usize) -> bool {
        self.edge_faces[e].iter().any(Option::is_none)
    }

    /// Indices of all boundary edges.
    pub fn boundary_edges(&self) -> Vec<usize> {
        (0..self.num_edges())
            .filter(|&e| self.is_boundary_edge(e))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_triangle() {
        let topo = EdgeTopology::from_faces(&[[0, 1, 2]], 3).unwrap();
        assert_eq!(topo.num_edges(), 3);
        assert_eq!(topo.face_edges()[0], [0, 1, 2]);
        assert_eq!(topo.edge_vertices(), &[[0, 1], [1, 2], [0, 2]]);
        // 2 -> 0 runs from the larger index to the smaller one
        assert_eq!(topo.edge_faces()[2], [None, Some(0)]);
        assert_eq!(topo.boundary_edges(), vec![0, 1, 2]);
    }

    #[test]
    fn test_shared_edge() {
        // Two triangles sharing edge (1, 2)
        let faces = vec![[0, 1, 2], [1, 3, 2]];
        let topo = EdgeTopology::from_faces(&faces, 4).unwrap();

        assert_eq!(topo.num_edges(), 5);
        let shared = topo.face_edges()[0][1];
        assert_eq!(topo.face_edges()[1][2], shared);
        assert_eq!(topo.edge_vertices()[shared], [1, 2]);
        assert_eq!(topo.edge_faces()[shared], [Some(0), Some(1)]);
        assert!(!topo.is_boundary_edge(shared));
        assert_eq!(topo.boundary_edges().len(), 4);
    }

    #[test]
    fn test_closed_tetrahedron() {
        let faces = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
        let topo = EdgeTopology::from_faces(&faces, 4).unwrap();
        assert_eq!(topo.num_edges(), 6);
        assert!(topo.boundary_edges().is_empty());
    }

    #[test]
    fn test_non_manifold_edge() {
        // Three faces on edge (0, 1)
        let faces = vec![[0, 1, 2], [1, 0, 3], [0, 1, 4]];
        let result = EdgeTopology::from_faces(&faces, 5);
        assert!(matches!(
            result,
            Err(SeamlessError::NonManifoldEdge { v0: 0, v1: 1 })
        ));
    }
}
