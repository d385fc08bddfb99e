use std::sync::Arc;

use glam::Vec3;

use crate::config::CollisionConfig;
use crate::error::Result;
use crate::physics::collision_detection::polyhedron_queries::IPolyhedronQueries;
use crate::physics::collision_detection::support_finder::SupportStrategy;
use crate::utilities::{BoundingBox, Matrix3x3};

use super::half_edge_structure::{Edge, Face, Vertex};
use super::polyhedron_mesh::PolyhedronMesh;
use super::ray::{Ray, RayHit};
use super::shape::{bounding_box_inertia, IConvexPolyhedron, IConvexShape, IShape};

/// Convex shape backed by a shared polyhedron mesh.
///
/// The shape adds a per-instance scaling and margin on top of the mesh. Local bounds are cached
/// and recomputed whenever the scaling changes; they cover the scaled vertices grown by the
/// margin.
#[derive(Debug, Clone)]
pub struct ConvexMeshShape {
    mesh: Arc<PolyhedronMesh>,
    bounds: BoundingBox,
    scaling: Vec3,
    margin: f32,
    support_strategy: SupportStrategy,
}

impl ConvexMeshShape {
    /// Type id of convex mesh shapes.
    pub const ID: i32 = 5;

    /// Creates a shape using the configured margin and support strategy.
    pub fn new(mesh: Arc<PolyhedronMesh>, config: &CollisionConfig) -> Self {
        let mut shape = Self::with_margin(mesh, config.object_margin);
        shape.set_edge_information_used(config.use_edge_information);
        shape
    }

    /// Creates a shape with an explicit margin. Support queries scan every vertex.
    pub fn with_margin(mesh: Arc<PolyhedronMesh>, margin: f32) -> Self {
        let mut shape = Self {
            mesh,
            bounds: BoundingBox::default(),
            scaling: Vec3::ONE,
            margin,
            support_strategy: SupportStrategy::LinearScan,
        };
        shape.recalculate_bounds();
        shape
    }

    fn recalculate_bounds(&mut self) {
        // A built mesh always has vertices.
        self.bounds = BoundingBox::from_scaled_points(self.mesh.vertices(), self.scaling)
            .unwrap_or_default()
            .expanded(self.margin);
    }

    #[inline(always)]
    pub fn mesh(&self) -> &Arc<PolyhedronMesh> {
        &self.mesh
    }

    #[inline(always)]
    pub fn support_strategy(&self) -> SupportStrategy {
        self.support_strategy
    }

    /// Chooses between hill climbing over the mesh edges and a linear vertex scan.
    pub fn set_edge_information_used(&mut self, used: bool) {
        self.support_strategy = SupportStrategy::from_edge_information(used);
    }

    #[inline(always)]
    pub fn is_edge_information_used(&self) -> bool {
        self.support_strategy == SupportStrategy::HillClimbing
    }

    /// Finds the support point without margin, starting the search at `start_vertex` and
    /// storing the winning vertex there for the next query.
    pub fn local_support_point_from(&self, direction: Vec3, start_vertex: &mut usize) -> Vec3 {
        // max dot(d, v * s) == max dot(d * s, v)
        let index =
            self.support_strategy
                .find_support_vertex(&self.mesh, direction * self.scaling, *start_vertex);
        *start_vertex = index;
        self.mesh.vertex(index) * self.scaling
    }

    /// Tests whether a local space point lies inside the shape.
    pub fn test_point_inside(&self, local_point: Vec3, queries: &dyn IPolyhedronQueries) -> bool {
        queries.test_point_inside(local_point, self)
    }

    /// Casts a local space ray against the shape.
    pub fn raycast(&self, ray: &Ray, queries: &dyn IPolyhedronQueries) -> Option<RayHit> {
        queries.raycast(ray, self)
    }
}

impl IShape for ConvexMeshShape {
    #[inline(always)]
    fn type_id() -> i32 {
        Self::ID
    }
}

impl IConvexShape for ConvexMeshShape {
    #[inline(always)]
    fn local_bounds(&self) -> BoundingBox {
        self.bounds
    }

    /// Approximates the inertia by the solid box of the local bounds. The mesh volume is not
    /// integrated.
    fn compute_local_inertia_tensor(&self, mass: f32) -> Result<Matrix3x3> {
        bounding_box_inertia(&self.bounds, mass)
    }

    /// Hill climbing starts from vertex 0 on every call here. Narrow phases that query the same
    /// shape repeatedly should keep the last support vertex and use
    /// [`local_support_point_from`](ConvexMeshShape::local_support_point_from) instead.
    fn local_support_point_without_margin(&self, direction: Vec3) -> Vec3 {
        let mut start_vertex = 0;
        self.local_support_point_from(direction, &mut start_vertex)
    }

    #[inline(always)]
    fn margin(&self) -> f32 {
        self.margin
    }

    #[inline(always)]
    fn local_scaling(&self) -> Vec3 {
        self.scaling
    }

    fn set_local_scaling(&mut self, scaling: Vec3) {
        self.scaling = scaling;
        self.recalculate_bounds();
    }

    fn size_in_bytes(&self) -> usize {
        std::mem::size_of::<Self>()
    }
}

impl IConvexPolyhedron for ConvexMeshShape {
    #[inline(always)]
    fn face_count(&self) -> usize {
        self.mesh.half_edge_structure().face_count()
    }

    #[inline(always)]
    fn face(&self, face_index: usize) -> &Face {
        self.mesh.half_edge_structure().face(face_index)
    }

    #[inline(always)]
    fn vertex_count(&self) -> usize {
        self.mesh.half_edge_structure().vertex_count()
    }

    #[inline(always)]
    fn vertex(&self, vertex_index: usize) -> &Vertex {
        self.mesh.half_edge_structure().vertex(vertex_index)
    }

    #[inline(always)]
    fn half_edge_count(&self) -> usize {
        self.mesh.half_edge_structure().half_edge_count()
    }

    #[inline(always)]
    fn half_edge(&self, edge_index: usize) -> &Edge {
        self.mesh.half_edge_structure().half_edge(edge_index)
    }

    #[inline(always)]
    fn vertex_position(&self, vertex_index: usize) -> Vec3 {
        let point_index = self.vertex(vertex_index).vertex_point_index as usize;
        self.mesh.vertex(point_index) * self.scaling
    }

    fn face_normal(&self, face_index: usize) -> Vec3 {
        // Normals transform by the inverse transpose, which for a scaling is the reciprocal.
        (self.mesh.face_normal(face_index) / self.scaling).normalize()
    }

    #[inline(always)]
    fn centroid(&self) -> Vec3 {
        self.mesh.centroid() * self.scaling
    }
}
