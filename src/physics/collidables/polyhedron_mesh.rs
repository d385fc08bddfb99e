use glam::Vec3;

use crate::error::{CollisionError, Result};
use crate::utilities::BoundingBox;

use super::half_edge_structure::HalfEdgeStructure;

/// Faces of an axis aligned cuboid over the vertices produced by [`cuboid_vertices`],
/// ordered -Z, +Z, -Y, +Y, -X, +X.
pub(crate) const CUBOID_FACES: [[u32; 4]; 6] = [
    [0, 3, 2, 1],
    [4, 5, 6, 7],
    [0, 1, 5, 4],
    [3, 7, 6, 2],
    [0, 4, 7, 3],
    [1, 2, 6, 5],
];

/// Outward normals of [`CUBOID_FACES`].
pub(crate) const CUBOID_FACE_NORMALS: [Vec3; 6] = [
    Vec3::NEG_Z,
    Vec3::Z,
    Vec3::NEG_Y,
    Vec3::Y,
    Vec3::NEG_X,
    Vec3::X,
];

/// Corners of an axis aligned cuboid, bottom ring (-Z) first.
#[inline]
pub(crate) fn cuboid_vertices(half_extents: Vec3) -> [Vec3; 8] {
    let Vec3 { x, y, z } = half_extents;
    [
        Vec3::new(-x, -y, -z),
        Vec3::new(x, -y, -z),
        Vec3::new(x, y, -z),
        Vec3::new(-x, y, -z),
        Vec3::new(-x, -y, z),
        Vec3::new(x, -y, z),
        Vec3::new(x, y, z),
        Vec3::new(-x, y, z),
    ]
}

/// Convex polyhedron with precomputed face normals, centroid and edge adjacency.
///
/// Meshes are immutable once built. Shapes share them through `Arc`, so one mesh can back any
/// number of differently scaled shapes.
#[derive(Debug, Clone)]
pub struct PolyhedronMesh {
    vertices: Vec<Vec3>,
    face_normals: Vec<Vec3>,
    centroid: Vec3,
    half_edge_structure: HalfEdgeStructure,
}

impl PolyhedronMesh {
    /// Builds a mesh from vertex positions and faces.
    ///
    /// Each face lists vertex indices counter-clockwise when seen from outside. The faces must
    /// close the surface, and every vertex must lie on or behind every face plane.
    pub fn new(vertices: Vec<Vec3>, faces: &[Vec<u32>]) -> Result<Self> {
        let half_edge_structure = HalfEdgeStructure::build(vertices.len(), faces)?;

        let bounds = BoundingBox::from_points(&vertices)
            .ok_or_else(|| CollisionError::InvalidMesh("mesh has no vertices".into()))?;
        let size = bounds.extent().max_element();
        if !size.is_finite() || size <= 0.0 {
            return Err(CollisionError::InvalidMesh(format!(
                "mesh vertices span no volume (bounds {})",
                bounds
            )));
        }

        let face_normals = half_edge_structure
            .faces()
            .iter()
            .enumerate()
            .map(|(face_index, face)| {
                compute_face_normal(&vertices, &face.face_vertices).ok_or_else(|| {
                    CollisionError::InvalidMesh(format!("face {} has no area", face_index))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let plane_tolerance = size * 1e-4;
        for (face_index, face) in half_edge_structure.faces().iter().enumerate() {
            let normal = face_normals[face_index];
            let offset = normal.dot(vertices[face.face_vertices[0] as usize]);
            if let Some(outside) = vertices
                .iter()
                .position(|v| normal.dot(*v) - offset > plane_tolerance)
            {
                return Err(CollisionError::InvalidMesh(format!(
                    "vertex {} lies in front of face {}, the mesh is not convex",
                    outside, face_index
                )));
            }
        }

        let centroid = vertices.iter().copied().sum::<Vec3>() / vertices.len() as f32;

        // A double sided polygon closes and passes the plane test, but encloses nothing.
        let volume = enclosed_volume(&vertices, &half_edge_structure, centroid);
        if !(volume > size * size * size * 1e-6) {
            return Err(CollisionError::InvalidMesh(format!(
                "mesh encloses no volume ({})",
                volume
            )));
        }

        log::debug!(
            "Built polyhedron mesh with {} vertices, {} faces and {} half-edges",
            vertices.len(),
            half_edge_structure.face_count(),
            half_edge_structure.half_edge_count()
        );

        Ok(Self {
            vertices,
            face_normals,
            centroid,
            half_edge_structure,
        })
    }

    /// Builds the mesh of an axis aligned cuboid centered on the origin.
    pub fn cuboid(half_extents: Vec3) -> Result<Self> {
        let faces: Vec<Vec<u32>> = CUBOID_FACES.iter().map(|face| face.to_vec()).collect();
        Self::new(cuboid_vertices(half_extents).to_vec(), &faces)
    }

    #[inline(always)]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline(always)]
    pub fn face_count(&self) -> usize {
        self.face_normals.len()
    }

    /// Gets a vertex position. Panics if `index >= vertex_count()`.
    #[inline(always)]
    pub fn vertex(&self, index: usize) -> Vec3 {
        assert!(index < self.vertices.len(), "Vertex index {} out of range.", index);
        self.vertices[index]
    }

    #[inline(always)]
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    /// Gets the unit outward normal of a face. Panics if `index >= face_count()`.
    #[inline(always)]
    pub fn face_normal(&self, index: usize) -> Vec3 {
        assert!(index < self.face_normals.len(), "Face index {} out of range.", index);
        self.face_normals[index]
    }

    /// Gets the average of the mesh vertices.
    #[inline(always)]
    pub fn centroid(&self) -> Vec3 {
        self.centroid
    }

    #[inline(always)]
    pub fn half_edge_structure(&self) -> &HalfEdgeStructure {
        &self.half_edge_structure
    }
}

/// Sums the signed volumes of the face fan tetrahedra against an interior reference point.
fn enclosed_volume(vertices: &[Vec3], structure: &HalfEdgeStructure, reference: Vec3) -> f32 {
    let mut volume = 0.0;
    for face in structure.faces() {
        let (first, rest) = match face.face_vertices.split_first() {
            Some(split) => split,
            None => continue,
        };
        let a = vertices[*first as usize] - reference;
        for pair in rest.windows(2) {
            let b = vertices[pair[0] as usize] - reference;
            let c = vertices[pair[1] as usize] - reference;
            volume += a.dot(b.cross(c));
        }
    }
    volume / 6.0
}

/// Computes a polygon normal with Newell's method, which tolerates slightly non-planar faces.
fn compute_face_normal(vertices: &[Vec3], face_vertices: &[u32]) -> Option<Vec3> {
    let mut normal = Vec3::ZERO;
    for (i, &index) in face_vertices.iter().enumerate() {
        let current = vertices[index as usize];
        let next = vertices[face_vertices[(i + 1) % face_vertices.len()] as usize];
        normal.x += (current.y - next.y) * (current.z + next.z);
        normal.y += (current.z - next.z) * (current.x + next.x);
        normal.z += (current.x - next.x) * (current.y + next.y);
    }
    normal.try_normalize()
}
