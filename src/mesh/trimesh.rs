//! Face-vertex triangle mesh.

use nalgebra::{Point3, Vector3};

use crate::error::{Result, SeamlessError};

/// A triangle mesh stored as vertex positions and face-vertex triples.
///
/// Faces are expected to be consistently counter-clockwise oriented. Local
/// corner `j` of a face is `faces[f][j]`, and local edge `j` runs from corner
/// `j` to corner `(j + 1) % 3`.
#[derive(Debug, Clone)]
pub struct TriMesh {
    vertices: Vec<Point3<f64>>,
    faces: Vec<[usize; 3]>,
}

impl TriMesh {
    /// Build a mesh from vertex positions and triangle faces.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no faces, a face references a vertex that
    /// does not exist, or a face repeats a vertex.
    ///
    /// # Example
    ///
    /// ```
    /// use seamless::mesh::TriMesh;
    /// use nalgebra::Point3;
    ///
    /// let vertices = vec![
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(1.0, 0.0, 0.0),
    ///     Point3::new(0.0, 1.0, 0.0),
    /// ];
    /// let mesh = TriMesh::new(vertices, vec![[0, 1, 2]]).unwrap();
    /// assert_eq!(mesh.num_faces(), 1);
    /// ```
    pub fn new(vertices: Vec<Point3<f64>>, faces: Vec<[usize; 3]>) -> Result<Self> {
        validate_faces(&faces, vertices.len())?;
        Ok(Self { vertices, faces })
    }

    /// Vertex positions.
    #[inline]
    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    /// Face-vertex triples.
    #[inline]
    pub fn faces(&self) -> &[[usize; 3]] {
        &self.faces
    }

    /// Number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Vector along local edge `j` of face `f`, from corner `j` to corner `j + 1`.
    #[inline]
    pub fn edge_vector(&self, f: usize, j: usize) -> Vector3<f64> {
        face_edge_vector(&self.vertices, &self.faces[f], j)
    }

    /// Unnormalized face normal (twice the area times the unit normal).
    pub fn face_normal(&self, f: usize) -> Vector3<f64> {
        self.edge_vector(f, 0).cross(&(-self.edge_vector(f, 2)))
    }

    /// Area of face `f`.
    pub fn face_area(&self, f: usize) -> f64 {
        0.5 * self.face_normal(f).norm()
    }
}

/// Vector along local edge `j` of `face`, from corner `j` to corner `(j + 1) % 3`.
#[inline]
pub(crate) fn face_edge_vector(
    vertices: &[Point3<f64>],
    face: &[usize; 3],
    j: usize,
) -> Vector3<f64> {
    vertices[face[(j + 1) % 3]] - vertices[face[j]]
}

/// Check that faces are non-empty, in range and non-degenerate.
pub(crate) fn validate_faces(faces: &[[usize; 3]], num_vertices: usize) -> Result<()> {
    if faces.is_empty() {
        return Err(SeamlessError::EmptyMesh);
    }

    for (fi, face) in faces.iter().enumerate() {
        for &vi in face {
            if vi >= num_vertices {
                return Err(SeamlessError::InvalidVertexIndex { face: fi, vertex: vi });
            }
        }
        if face[0] == face[1] || face[1] == face[2] || face[0] == face[2] {
            return Err(SeamlessError::DegenerateFace { face: fi });
        }
    }

    Ok(())
}
