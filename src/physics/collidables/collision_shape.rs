use glam::Vec3;

use crate::error::Result;
use crate::physics::collision_detection::polyhedron_queries::IPolyhedronQueries;
use crate::utilities::{BoundingBox, Matrix3x3};

use super::box_shape::BoxShape;
use super::capsule::CapsuleShape;
use super::convex_mesh::ConvexMeshShape;
use super::ray::{Ray, RayHit};
use super::shape::{IConvexPolyhedron, IConvexShape, IShape};
use super::sphere::SphereShape;

/// Every convex shape a proxy can carry.
#[derive(Debug, Clone)]
pub enum CollisionShape {
    Sphere(SphereShape),
    Capsule(CapsuleShape),
    Box(BoxShape),
    ConvexMesh(ConvexMeshShape),
}

impl CollisionShape {
    /// Gets the type id of the contained shape.
    #[inline]
    pub fn type_id(&self) -> i32 {
        match self {
            CollisionShape::Sphere(_) => SphereShape::type_id(),
            CollisionShape::Capsule(_) => CapsuleShape::type_id(),
            CollisionShape::Box(_) => BoxShape::type_id(),
            CollisionShape::ConvexMesh(_) => ConvexMeshShape::type_id(),
        }
    }

    #[inline]
    pub fn as_convex(&self) -> &dyn IConvexShape {
        match self {
            CollisionShape::Sphere(shape) => shape,
            CollisionShape::Capsule(shape) => shape,
            CollisionShape::Box(shape) => shape,
            CollisionShape::ConvexMesh(shape) => shape,
        }
    }

    #[inline]
    pub fn as_convex_mut(&mut self) -> &mut dyn IConvexShape {
        match self {
            CollisionShape::Sphere(shape) => shape,
            CollisionShape::Capsule(shape) => shape,
            CollisionShape::Box(shape) => shape,
            CollisionShape::ConvexMesh(shape) => shape,
        }
    }

    /// Gets the polyhedral view of the shape, if it has one.
    #[inline]
    pub fn as_polyhedron(&self) -> Option<&dyn IConvexPolyhedron> {
        match self {
            CollisionShape::Box(shape) => Some(shape),
            CollisionShape::ConvexMesh(shape) => Some(shape),
            CollisionShape::Sphere(_) | CollisionShape::Capsule(_) => None,
        }
    }

    /// Tests whether a local space point lies inside the shape.
    ///
    /// Convex meshes go through `queries`; the other shapes are answered analytically.
    pub fn test_point_inside(&self, local_point: Vec3, queries: &dyn IPolyhedronQueries) -> bool {
        match self {
            CollisionShape::Sphere(shape) => shape.test_point_inside(local_point),
            CollisionShape::Capsule(shape) => shape.test_point_inside(local_point),
            CollisionShape::Box(shape) => shape.test_point_inside(local_point),
            CollisionShape::ConvexMesh(shape) => shape.test_point_inside(local_point, queries),
        }
    }

    /// Casts a local space ray against the shape.
    pub fn raycast(&self, ray: &Ray, queries: &dyn IPolyhedronQueries) -> Option<RayHit> {
        match self {
            CollisionShape::Sphere(shape) => shape.raycast(ray),
            CollisionShape::Capsule(shape) => shape.raycast(ray),
            CollisionShape::Box(shape) => shape.raycast(ray),
            CollisionShape::ConvexMesh(shape) => shape.raycast(ray, queries),
        }
    }
}

impl IConvexShape for CollisionShape {
    #[inline]
    fn local_bounds(&self) -> BoundingBox {
        self.as_convex().local_bounds()
    }

    #[inline]
    fn compute_local_inertia_tensor(&self, mass: f32) -> Result<Matrix3x3> {
        self.as_convex().compute_local_inertia_tensor(mass)
    }

    #[inline]
    fn local_support_point_without_margin(&self, direction: Vec3) -> Vec3 {
        self.as_convex().local_support_point_without_margin(direction)
    }

    #[inline]
    fn margin(&self) -> f32 {
        self.as_convex().margin()
    }

    #[inline]
    fn local_scaling(&self) -> Vec3 {
        self.as_convex().local_scaling()
    }

    #[inline]
    fn set_local_scaling(&mut self, scaling: Vec3) {
        self.as_convex_mut().set_local_scaling(scaling)
    }

    #[inline]
    fn size_in_bytes(&self) -> usize {
        self.as_convex().size_in_bytes()
    }
}

impl From<SphereShape> for CollisionShape {
    fn from(shape: SphereShape) -> Self {
        CollisionShape::Sphere(shape)
    }
}

impl From<CapsuleShape> for CollisionShape {
    fn from(shape: CapsuleShape) -> Self {
        CollisionShape::Capsule(shape)
    }
}

impl From<BoxShape> for CollisionShape {
    fn from(shape: BoxShape) -> Self {
        CollisionShape::Box(shape)
    }
}

impl From<ConvexMeshShape> for CollisionShape {
    fn from(shape: ConvexMeshShape) -> Self {
        CollisionShape::ConvexMesh(shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::collidables::polyhedron_mesh::PolyhedronMesh;
    use crate::physics::collision_detection::polyhedron_queries::FacePlaneQueries;
    use glam::Quat;
    use std::f32::consts::FRAC_PI_4;
    use std::sync::Arc;

    fn all_shapes() -> Vec<CollisionShape> {
        let mesh = Arc::new(PolyhedronMesh::cuboid(Vec3::new(1.0, 0.5, 0.25)).unwrap());
        vec![
            SphereShape::new(1.0).into(),
            CapsuleShape::new(0.5, 2.0).into(),
            BoxShape::new(Vec3::ONE).into(),
            ConvexMeshShape::with_margin(mesh, 0.04).into(),
        ]
    }

    #[test]
    fn type_ids_are_distinct() {
        let ids: Vec<i32> = all_shapes().iter().map(CollisionShape::type_id).collect();
        assert_eq!(ids, vec![0, 1, 2, 5]);
    }

    #[test]
    fn only_boxes_and_meshes_are_polyhedra() {
        let polyhedra: Vec<bool> = all_shapes().iter().map(|s| s.as_polyhedron().is_some()).collect();
        assert_eq!(polyhedra, vec![false, false, true, true]);
    }

    #[test]
    fn scaling_goes_through_the_enum() {
        for mut shape in all_shapes() {
            let before = shape.local_bounds();
            shape.set_local_scaling(Vec3::splat(2.0));
            assert_eq!(shape.local_scaling(), Vec3::splat(2.0));
            assert!(shape.local_bounds().max.x > before.max.x);
        }
    }

    #[test]
    fn rotated_bounds_contain_rotated_support_points() {
        let orientation = Quat::from_rotation_z(FRAC_PI_4) * Quat::from_rotation_x(0.3);
        for shape in all_shapes() {
            let (mut min, mut max) = (Vec3::ZERO, Vec3::ZERO);
            shape.compute_bounds(orientation, &mut min, &mut max);
            for direction in [Vec3::X, Vec3::NEG_Y, Vec3::new(1.0, 1.0, -1.0)] {
                let point = orientation * shape.local_support_point_with_margin(direction);
                assert!(point.cmpge(min - Vec3::splat(1e-5)).all());
                assert!(point.cmple(max + Vec3::splat(1e-5)).all());
            }
        }
    }

    #[test]
    fn identity_bounds_match_local_bounds_for_box() {
        let shape: CollisionShape = BoxShape::with_margin(Vec3::new(1.0, 2.0, 3.0), 0.0).into();
        let (mut min, mut max) = (Vec3::ZERO, Vec3::ZERO);
        shape.compute_bounds(Quat::IDENTITY, &mut min, &mut max);
        assert_eq!(BoundingBox::new(min, max), shape.local_bounds());
    }

    #[test]
    fn queries_dispatch_per_variant() {
        let queries = FacePlaneQueries;
        for shape in all_shapes() {
            assert!(shape.test_point_inside(Vec3::ZERO, &queries));
            assert!(!shape.test_point_inside(Vec3::splat(5.0), &queries));
            let hit = shape
                .raycast(&Ray::new(Vec3::new(-10.0, 0.0, 0.0), Vec3::X), &queries)
                .unwrap();
            assert!(hit.t > 8.0 && hit.t < 10.0);
        }
    }
}
