use glam::Vec3;

use crate::physics::collidables::ray::{Ray, RayHit};
use crate::physics::collidables::shape::IConvexPolyhedron;

/// Containment and ray queries a narrow phase provides for polyhedral shapes.
///
/// Shapes never reach back into a world for these; the caller hands in whichever
/// implementation its pipeline uses.
pub trait IPolyhedronQueries {
    /// Tests whether a point in the shape's local space lies inside the shape.
    fn test_point_inside(&self, local_point: Vec3, shape: &dyn IConvexPolyhedron) -> bool;

    /// Casts a ray given in the shape's local space against the shape.
    fn raycast(&self, ray: &Ray, shape: &dyn IConvexPolyhedron) -> Option<RayHit>;
}

/// Answers polyhedron queries directly from the face planes.
///
/// The margin is not part of the tested volume.
#[derive(Debug, Clone, Copy, Default)]
pub struct FacePlaneQueries;

impl FacePlaneQueries {
    /// Gets the outward normal and plane offset of a face.
    #[inline(always)]
    fn face_plane(shape: &dyn IConvexPolyhedron, face_index: usize) -> (Vec3, f32) {
        let normal = shape.face_normal(face_index);
        let face = shape.face(face_index);
        let on_plane = shape.vertex_position(face.face_vertices[0] as usize);
        (normal, normal.dot(on_plane))
    }
}

impl IPolyhedronQueries for FacePlaneQueries {
    fn test_point_inside(&self, local_point: Vec3, shape: &dyn IConvexPolyhedron) -> bool {
        (0..shape.face_count()).all(|face_index| {
            let (normal, offset) = Self::face_plane(shape, face_index);
            normal.dot(local_point) <= offset
        })
    }

    fn raycast(&self, ray: &Ray, shape: &dyn IConvexPolyhedron) -> Option<RayHit> {
        let mut latest_entry_t = f32::MIN;
        let mut latest_entry_normal = Vec3::ZERO;
        let mut earliest_exit_t = ray.maximum_t;
        for face_index in 0..shape.face_count() {
            let (normal, offset) = Self::face_plane(shape, face_index);
            let numerator = offset - normal.dot(ray.origin);
            let denominator = normal.dot(ray.direction);
            if denominator.abs() < 1e-15 {
                // Parallel to the plane; missing it entirely if the origin is outside.
                if numerator < 0.0 {
                    return None;
                }
                continue;
            }
            let t = numerator / denominator;
            if denominator < 0.0 {
                if t > latest_entry_t {
                    latest_entry_t = t;
                    latest_entry_normal = normal;
                }
            } else if t < earliest_exit_t {
                earliest_exit_t = t;
            }
            if latest_entry_t > earliest_exit_t {
                return None;
            }
        }
        if earliest_exit_t < 0.0 {
            return None;
        }
        Some(RayHit {
            t: latest_entry_t.max(0.0),
            normal: latest_entry_normal,
        })
    }
}
