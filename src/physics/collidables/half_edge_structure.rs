use std::collections::HashMap;

use crate::error::{CollisionError, Result};

/// Face of a half-edge structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Face {
    /// Index of one half-edge bounding this face.
    pub edge_index: u32,
    /// Vertex indices of the face boundary, counter-clockwise seen from outside.
    pub face_vertices: Vec<u32>,
}

/// Vertex of a half-edge structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vertex {
    /// Index of the vertex position in the owning mesh.
    pub vertex_point_index: u32,
    /// Index of one half-edge leaving this vertex.
    pub edge_index: u32,
}

/// Directed edge of a half-edge structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    /// Origin vertex of the half-edge.
    pub vertex_index: u32,
    /// Half-edge running the opposite way along the same edge.
    pub twin_edge_index: u32,
    /// Face to the left of the half-edge.
    pub face_index: u32,
    /// Following half-edge around the same face.
    pub next_edge_index: u32,
}

/// Adjacency of a closed polyhedron: every undirected edge is split into two half-edges,
/// one per incident face, linked as twins.
///
/// The structure is built once from a face list and never changes afterwards.
#[derive(Debug, Clone, Default)]
pub struct HalfEdgeStructure {
    faces: Vec<Face>,
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
}

impl HalfEdgeStructure {
    /// Builds the half-edge structure of a closed polyhedron.
    ///
    /// Each face lists its vertex indices counter-clockwise seen from outside. Every directed
    /// edge must appear exactly once and have its reverse in a neighboring face, and every
    /// vertex must be used by at least one face.
    pub fn build(vertex_count: usize, faces: &[Vec<u32>]) -> Result<Self> {
        if vertex_count == 0 {
            return Err(CollisionError::InvalidMesh("mesh has no vertices".into()));
        }
        if faces.is_empty() {
            return Err(CollisionError::InvalidMesh("mesh has no faces".into()));
        }

        let edge_count: usize = faces.iter().map(Vec::len).sum();
        let mut structure = Self {
            faces: Vec::with_capacity(faces.len()),
            vertices: Vec::with_capacity(vertex_count),
            edges: Vec::with_capacity(edge_count),
        };
        let mut directed_edges = HashMap::with_capacity(edge_count);

        for (face_index, face_vertices) in faces.iter().enumerate() {
            if face_vertices.len() < 3 {
                return Err(CollisionError::InvalidMesh(format!(
                    "face {} has {} vertices, at least 3 are required",
                    face_index,
                    face_vertices.len()
                )));
            }
            if let Some(&bad) = face_vertices.iter().find(|&&v| v as usize >= vertex_count) {
                return Err(CollisionError::InvalidMesh(format!(
                    "face {} references vertex {} of {}",
                    face_index, bad, vertex_count
                )));
            }

            let first_edge = structure.edges.len() as u32;
            let n = face_vertices.len() as u32;
            for i in 0..n {
                let origin = face_vertices[i as usize];
                let destination = face_vertices[((i + 1) % n) as usize];
                if origin == destination {
                    return Err(CollisionError::InvalidMesh(format!(
                        "face {} repeats vertex {} consecutively",
                        face_index, origin
                    )));
                }
                let edge_index = first_edge + i;
                if directed_edges
                    .insert((origin, destination), edge_index)
                    .is_some()
                {
                    return Err(CollisionError::InvalidMesh(format!(
                        "edge {} -> {} is used by more than one face",
                        origin, destination
                    )));
                }
                structure.edges.push(Edge {
                    vertex_index: origin,
                    // Patched once every face is known.
                    twin_edge_index: u32::MAX,
                    face_index: face_index as u32,
                    next_edge_index: first_edge + (i + 1) % n,
                });
            }
            structure.faces.push(Face {
                edge_index: first_edge,
                face_vertices: face_vertices.clone(),
            });
        }

        for edge_index in 0..structure.edges.len() {
            let origin = structure.edges[edge_index].vertex_index;
            let destination =
                structure.edges[structure.edges[edge_index].next_edge_index as usize].vertex_index;
            match directed_edges.get(&(destination, origin)) {
                Some(&twin) => structure.edges[edge_index].twin_edge_index = twin,
                None => {
                    return Err(CollisionError::InvalidMesh(format!(
                        "edge {} -> {} has no twin, the polyhedron is not closed",
                        origin, destination
                    )))
                }
            }
        }

        let mut outgoing = vec![u32::MAX; vertex_count];
        for (edge_index, edge) in structure.edges.iter().enumerate() {
            let slot = &mut outgoing[edge.vertex_index as usize];
            if *slot == u32::MAX {
                *slot = edge_index as u32;
            }
        }
        for (vertex_index, &edge_index) in outgoing.iter().enumerate() {
            if edge_index == u32::MAX {
                return Err(CollisionError::InvalidMesh(format!(
                    "vertex {} is not used by any face",
                    vertex_index
                )));
            }
            structure.vertices.push(Vertex {
                vertex_point_index: vertex_index as u32,
                edge_index,
            });
        }

        Ok(structure)
    }

    #[inline(always)]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    #[inline(always)]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline(always)]
    pub fn half_edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Gets a face. Panics if `index >= face_count()`.
    #[inline(always)]
    pub fn face(&self, index: usize) -> &Face {
        assert!(index < self.faces.len(), "Face index {} out of range.", index);
        &self.faces[index]
    }

    /// Gets a vertex. Panics if `index >= vertex_count()`.
    #[inline(always)]
    pub fn vertex(&self, index: usize) -> &Vertex {
        assert!(index < self.vertices.len(), "Vertex index {} out of range.", index);
        &self.vertices[index]
    }

    /// Gets a half-edge. Panics if `index >= half_edge_count()`.
    #[inline(always)]
    pub fn half_edge(&self, index: usize) -> &Edge {
        assert!(index < self.edges.len(), "Half-edge index {} out of range.", index);
        &self.edges[index]
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn half_edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Gets the vertex a half-edge points to.
    #[inline(always)]
    pub fn destination_vertex(&self, edge_index: usize) -> u32 {
        let edge = self.half_edge(edge_index);
        self.edges[edge.next_edge_index as usize].vertex_index
    }

    /// Enumerates the half-edges leaving a vertex by rotating around it through twin and next
    /// links.
    pub fn outgoing_edges(&self, vertex_index: usize) -> OutgoingEdges<'_> {
        let start = self.vertex(vertex_index).edge_index;
        OutgoingEdges {
            structure: self,
            start,
            current: Some(start),
            remaining: self.edges.len(),
        }
    }
}

/// Iterator over the half-edges leaving one vertex.
pub struct OutgoingEdges<'a> {
    structure: &'a HalfEdgeStructure,
    start: u32,
    current: Option<u32>,
    remaining: usize,
}

impl<'a> Iterator for OutgoingEdges<'a> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        let edge_index = self.current?;
        // A closed manifold returns to the start long before this; the bound only stops a walk
        // over a vertex whose neighborhood is not a single fan.
        if self.remaining == 0 {
            self.current = None;
            return None;
        }
        self.remaining -= 1;
        let edges = &self.structure.edges;
        let twin = edges[edge_index as usize].twin_edge_index;
        let following = edges[twin as usize].next_edge_index;
        self.current = if following == self.start {
            None
        } else {
            Some(following)
        };
        Some(edge_index)
    }
}
