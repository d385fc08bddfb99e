use std::sync::OnceLock;

use glam::Vec3;

use crate::config::CollisionConfig;
use crate::error::Result;
use crate::utilities::{BoundingBox, Matrix3x3};

use super::half_edge_structure::{Edge, Face, HalfEdgeStructure, Vertex};
use super::polyhedron_mesh::{cuboid_vertices, CUBOID_FACES, CUBOID_FACE_NORMALS};
use super::ray::{Ray, RayHit};
use super::shape::{bounding_box_inertia, IConvexPolyhedron, IConvexShape, IShape};

/// Topology shared by every box; only the vertex positions depend on the extents.
fn cuboid_topology() -> &'static HalfEdgeStructure {
    static TOPOLOGY: OnceLock<HalfEdgeStructure> = OnceLock::new();
    TOPOLOGY.get_or_init(|| {
        let faces: Vec<Vec<u32>> = CUBOID_FACES.iter().map(|face| face.to_vec()).collect();
        HalfEdgeStructure::build(8, &faces).expect("Cuboid faces form a closed polyhedron.")
    })
}

/// Collision shape representing a solid cuboid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxShape {
    half_extents: Vec3,
    margin: f32,
    scaling: Vec3,
}

impl BoxShape {
    /// Type id of box shapes.
    pub const ID: i32 = 2;

    /// Creates a box shape with the default object margin.
    #[inline(always)]
    pub fn new(half_extents: Vec3) -> Self {
        Self::with_margin(half_extents, CollisionConfig::default().object_margin)
    }

    #[inline(always)]
    pub fn with_margin(half_extents: Vec3, margin: f32) -> Self {
        Self {
            half_extents,
            margin,
            scaling: Vec3::ONE,
        }
    }

    /// Gets the half extents of the core with the local scaling applied.
    #[inline(always)]
    pub fn half_extents(&self) -> Vec3 {
        self.half_extents * self.scaling
    }

    pub fn test_point_inside(&self, local_point: Vec3) -> bool {
        let half_extents = self.half_extents();
        local_point.abs().cmple(half_extents).all()
    }

    /// Slab test against the core box.
    pub fn raycast(&self, ray: &Ray) -> Option<RayHit> {
        let direction = ray.direction;
        let offset_to_t_scale = Vec3::new(
            if direction.x < 0.0 { 1.0 } else { -1.0 },
            if direction.y < 0.0 { 1.0 } else { -1.0 },
            if direction.z < 0.0 { 1.0 } else { -1.0 },
        ) / direction.abs().max(Vec3::splat(1e-15));

        let half_extents = self.half_extents();
        let negative_t = (ray.origin - half_extents) * offset_to_t_scale;
        let positive_t = (ray.origin + half_extents) * offset_to_t_scale;
        let entry_t = negative_t.min(positive_t);
        let exit_t = negative_t.max(positive_t);

        let earliest_exit = exit_t.min_element().min(ray.maximum_t);
        if earliest_exit < 0.0 {
            return None;
        }

        let (latest_entry, mut normal) = if entry_t.x > entry_t.y {
            if entry_t.x > entry_t.z {
                (entry_t.x, Vec3::X)
            } else {
                (entry_t.z, Vec3::Z)
            }
        } else if entry_t.y > entry_t.z {
            (entry_t.y, Vec3::Y)
        } else {
            (entry_t.z, Vec3::Z)
        };

        if earliest_exit < latest_entry {
            return None;
        }
        // The normal should point away from the center of the box.
        if normal.dot(ray.origin) < 0.0 {
            normal = -normal;
        }
        Some(RayHit {
            t: latest_entry.max(0.0),
            normal,
        })
    }
}

impl IShape for BoxShape {
    #[inline(always)]
    fn type_id() -> i32 {
        Self::ID
    }
}

impl IConvexShape for BoxShape {
    fn local_bounds(&self) -> BoundingBox {
        let extent = self.half_extents() + Vec3::splat(self.margin);
        BoundingBox::new(-extent, extent)
    }

    /// Uses the margin-expanded box, which is the exact solid box tensor.
    fn compute_local_inertia_tensor(&self, mass: f32) -> Result<Matrix3x3> {
        bounding_box_inertia(&self.local_bounds(), mass)
    }

    #[inline(always)]
    fn local_support_point_without_margin(&self, direction: Vec3) -> Vec3 {
        let half_extents = self.half_extents();
        Vec3::new(
            if direction.x < 0.0 { -half_extents.x } else { half_extents.x },
            if direction.y < 0.0 { -half_extents.y } else { half_extents.y },
            if direction.z < 0.0 { -half_extents.z } else { half_extents.z },
        )
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
    }

    fn size_in_bytes(&self) -> usize {
        std::mem::size_of::<Self>()
    }
}

impl IConvexPolyhedron for BoxShape {
    #[inline(always)]
    fn face_count(&self) -> usize {
        6
    }

    #[inline(always)]
    fn face(&self, face_index: usize) -> &Face {
        cuboid_topology().face(face_index)
    }

    #[inline(always)]
    fn vertex_count(&self) -> usize {
        8
    }

    #[inline(always)]
    fn vertex(&self, vertex_index: usize) -> &Vertex {
        cuboid_topology().vertex(vertex_index)
    }

    #[inline(always)]
    fn half_edge_count(&self) -> usize {
        24
    }

    #[inline(always)]
    fn half_edge(&self, edge_index: usize) -> &Edge {
        cuboid_topology().half_edge(edge_index)
    }

    fn vertex_position(&self, vertex_index: usize) -> Vec3 {
        assert!(vertex_index < 8, "Vertex index {} out of range.", vertex_index);
        cuboid_vertices(self.half_extents())[vertex_index]
    }

    fn face_normal(&self, face_index: usize) -> Vec3 {
        assert!(face_index < 6, "Face index {} out of range.", face_index);
        CUBOID_FACE_NORMALS[face_index]
    }

    #[inline(always)]
    fn centroid(&self) -> Vec3 {
        Vec3::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::collision_detection::polyhedron_queries::{
        FacePlaneQueries, IPolyhedronQueries,
    };
    use approx::assert_relative_eq;

    #[test]
    fn topology_matches_box() {
        let shape = BoxShape::with_margin(Vec3::new(1.0, 2.0, 3.0), 0.0);
        assert_eq!(shape.face_count(), cuboid_topology().face_count());
        assert_eq!(shape.vertex_count(), cuboid_topology().vertex_count());
        assert_eq!(shape.half_edge_count(), cuboid_topology().half_edge_count());
        for face_index in 0..6 {
            let normal = shape.face_normal(face_index);
            for &v in &shape.face(face_index).face_vertices {
                let position = shape.vertex_position(v as usize);
                assert_relative_eq!(normal.dot(position), normal.dot(shape.half_extents()).abs());
            }
        }
        assert!(shape.try_vertex_position(8).is_err());
    }

    #[test]
    fn inertia_includes_margin() {
        let shape = BoxShape::with_margin(Vec3::new(0.9, 1.9, 2.9), 0.1);
        let inertia = shape.compute_local_inertia_tensor(3.0).unwrap();
        assert_relative_eq!(inertia.get(0, 0), 13.0, epsilon = 1e-4);
        assert_relative_eq!(inertia.get(1, 1), 10.0, epsilon = 1e-4);
        assert_relative_eq!(inertia.get(2, 2), 5.0, epsilon = 1e-4);
    }

    #[test]
    fn support_picks_signed_corner() {
        let mut shape = BoxShape::with_margin(Vec3::new(1.0, 2.0, 3.0), 0.0);
        shape.set_local_scaling(Vec3::splat(2.0));
        let support = shape.local_support_point_without_margin(Vec3::new(-0.1, 5.0, -2.0));
        assert_eq!(support, Vec3::new(-2.0, 4.0, -6.0));
    }

    #[test]
    fn face_planes_agree_with_analytic_queries() {
        let shape = BoxShape::with_margin(Vec3::new(1.0, 0.5, 2.0), 0.0);
        let points = [
            Vec3::ZERO,
            Vec3::new(0.99, 0.49, 1.99),
            Vec3::new(1.01, 0.0, 0.0),
            Vec3::new(0.0, -0.6, 0.0),
            Vec3::new(-0.5, 0.25, -2.5),
        ];
        for point in points {
            assert_eq!(
                shape.test_point_inside(point),
                FacePlaneQueries.test_point_inside(point, &shape)
            );
        }

        let rays = [
            Ray::new(Vec3::new(-4.0, 0.1, 0.2), Vec3::X),
            Ray::new(Vec3::new(0.3, 3.0, -0.4), Vec3::new(0.0, -2.0, 0.1)),
            Ray::new(Vec3::new(0.0, 0.0, 9.0), Vec3::new(0.05, 0.0, -1.0)),
            Ray::new(Vec3::new(-4.0, 2.0, 0.0), Vec3::X),
            Ray::with_maximum_t(Vec3::new(-4.0, 0.0, 0.0), Vec3::X, 2.0),
        ];
        for ray in &rays {
            let analytic = shape.raycast(ray);
            let planes = FacePlaneQueries.raycast(ray, &shape);
            match (analytic, planes) {
                (Some(a), Some(b)) => {
                    assert_relative_eq!(a.t, b.t, epsilon = 1e-5);
                    assert!(a.normal.abs_diff_eq(b.normal, 1e-5));
                }
                (None, None) => {}
                other => panic!("Queries disagree for {:?}: {:?}", ray, other),
            }
        }
    }
}
