use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::physics::collidables::polyhedron_mesh::PolyhedronMesh;

/// Defines a way of finding the mesh vertex furthest along a direction.
pub trait ISupportFinder {
    /// Returns the index of a vertex maximizing `dot(direction, vertex)`.
    ///
    /// `start_vertex` is a hint that a finder may begin its search from; finders that do not
    /// search locally ignore it.
    fn find_support_vertex(&self, mesh: &PolyhedronMesh, direction: Vec3, start_vertex: usize) -> usize;
}

/// Visits every vertex. O(n), needs no topology.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearScanSupportFinder;

impl ISupportFinder for LinearScanSupportFinder {
    fn find_support_vertex(&self, mesh: &PolyhedronMesh, direction: Vec3, _start_vertex: usize) -> usize {
        let mut best_index = 0;
        let mut best_dot = f32::MIN;
        for (index, vertex) in mesh.vertices().iter().enumerate() {
            let dot = direction.dot(*vertex);
            if dot > best_dot {
                best_dot = dot;
                best_index = index;
            }
        }
        best_index
    }
}

/// Walks the edge graph from a starting vertex, always moving to the neighbor that improves the
/// dot product the most.
///
/// On a convex polyhedron every local maximum of a linear function is a global maximum, so the
/// walk stops on a true support vertex. Starting from the previous frame's answer usually makes
/// it finish in a couple of steps.
#[derive(Debug, Clone, Copy, Default)]
pub struct HillClimbingSupportFinder;

impl ISupportFinder for HillClimbingSupportFinder {
    fn find_support_vertex(&self, mesh: &PolyhedronMesh, direction: Vec3, start_vertex: usize) -> usize {
        let structure = mesh.half_edge_structure();
        let vertex_count = structure.vertex_count();
        let mut current = if start_vertex < vertex_count { start_vertex } else { 0 };
        let mut current_dot = direction.dot(mesh.vertex(current));

        // Each step strictly increases the dot product, so no vertex is visited twice.
        for _ in 0..vertex_count {
            let mut best_neighbor = None;
            let mut best_dot = current_dot;
            for edge_index in structure.outgoing_edges(current) {
                let neighbor = structure.destination_vertex(edge_index as usize) as usize;
                let dot = direction.dot(mesh.vertex(neighbor));
                if dot > best_dot {
                    best_dot = dot;
                    best_neighbor = Some(neighbor);
                }
            }
            match best_neighbor {
                Some(neighbor) => {
                    current = neighbor;
                    current_dot = best_dot;
                }
                None => break,
            }
        }
        current
    }
}

/// Support query algorithm used by a convex mesh shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SupportStrategy {
    /// Scan every vertex.
    #[default]
    LinearScan,
    /// Climb the edge graph from a starting vertex.
    HillClimbing,
}

impl SupportStrategy {
    #[inline]
    pub fn from_edge_information(use_edge_information: bool) -> Self {
        if use_edge_information {
            SupportStrategy::HillClimbing
        } else {
            SupportStrategy::LinearScan
        }
    }

    #[inline]
    pub fn find_support_vertex(self, mesh: &PolyhedronMesh, direction: Vec3, start_vertex: usize) -> usize {
        match self {
            SupportStrategy::LinearScan => {
                LinearScanSupportFinder.find_support_vertex(mesh, direction, start_vertex)
            }
            SupportStrategy::HillClimbing => {
                HillClimbingSupportFinder.find_support_vertex(mesh, direction, start_vertex)
            }
        }
    }
}
