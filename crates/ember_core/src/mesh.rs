//! Triangle mesh data handed to the renderer.
//!
//! A mesh is just vertex positions and per-face vertex index triples, as
//! produced by any asset importer. The renderer turns each face into a
//! flat-shaded triangle primitive.

use ember_math::{Aabb, Vec3};
use thiserror::Error;

/// Faces with less than this much area (doubled) are treated as degenerate.
const DEGENERATE_AREA: f32 = 1e-12;

/// Problems found while validating a mesh.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    #[error("Mesh has no faces")]
    NoFaces,

    #[error("Face {face} references vertex {index}, but the mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        face: usize,
        index: u32,
        vertex_count: usize,
    },
}

/// A mesh consisting of vertex positions and triangle index triples.
#[derive(Clone, Debug)]
pub struct Mesh {
    /// Vertex positions (one Vec3 per vertex)
    pub positions: Vec<Vec3>,

    /// Triangle faces, each three indices into `positions`
    pub faces: Vec<[u32; 3]>,

    /// Axis-aligned bounding box of all positions
    pub bounds: Aabb,
}

impl Mesh {
    /// Create a new mesh from positions and faces.
    ///
    /// No validation happens here; call [`Mesh::validate`] before rendering.
    pub fn new(positions: Vec<Vec3>, faces: Vec<[u32; 3]>) -> Self {
        let bounds = Self::compute_bounds(&positions);
        Self {
            positions,
            faces,
            bounds,
        }
    }

    /// Compute axis-aligned bounding box from positions.
    fn compute_bounds(positions: &[Vec3]) -> Aabb {
        if positions.is_empty() {
            return Aabb::EMPTY;
        }

        let (min, max) = positions.iter().fold(
            (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
            |(min, max), p| (min.min(*p), max.max(*p)),
        );

        Aabb::from_points(min, max)
    }

    /// Check that the mesh has faces and every index is in range.
    pub fn validate(&self) -> Result<(), MeshError> {
        if self.faces.is_empty() {
            return Err(MeshError::NoFaces);
        }

        let vertex_count = self.positions.len();
        for (face, indices) in self.faces.iter().enumerate() {
            if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(MeshError::IndexOutOfRange {
                    face,
                    index,
                    vertex_count,
                });
            }
        }

        Ok(())
    }

    /// Get the number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.faces.len()
    }

    /// Get the number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Resolve faces to vertex triples.
    ///
    /// Faces with out-of-range indices or (near) zero area are skipped with
    /// a warning, so the result only holds triangles a ray can actually hit.
    pub fn triangle_vertices(&self) -> Vec<[Vec3; 3]> {
        let mut triangles = Vec::with_capacity(self.triangle_count());

        for (face, &[i0, i1, i2]) in self.faces.iter().enumerate() {
            let (Some(&p0), Some(&p1), Some(&p2)) = (
                self.positions.get(i0 as usize),
                self.positions.get(i1 as usize),
                self.positions.get(i2 as usize),
            ) else {
                log::warn!(
                    "Skipping face {}: invalid indices [{}, {}, {}], vertex count: {}",
                    face,
                    i0,
                    i1,
                    i2,
                    self.positions.len()
                );
                continue;
            };

            if (p1 - p0).cross(p2 - p0).length_squared() < DEGENERATE_AREA {
                log::warn!("Skipping face {}: degenerate triangle", face);
                continue;
            }

            triangles.push([p0, p1, p2]);
        }

        triangles
    }
}
