use glam::{Quat, Vec3};

use crate::error::{CollisionError, Result, TopologyElement};
use crate::utilities::{BoundingBox, Matrix3x3};

use super::half_edge_structure::{Edge, Face, Vertex};

/// Defines a type usable as a shape by collidables.
pub trait IShape {
    /// Unique type id for this shape type.
    fn type_id() -> i32
    where
        Self: Sized;
}

/// Defines functions available on all convex shapes.
/// Convex shapes have no hollowed out regions; any line passing through a convex shape
/// will never enter and exit more than once.
///
/// Every query is answered in the shape's local space with the local scaling applied.
pub trait IConvexShape {
    /// Gets the axis aligned bounds of the shape in local space, margin included.
    fn local_bounds(&self) -> BoundingBox;

    /// Computes the local inertia tensor for a body of the given mass.
    fn compute_local_inertia_tensor(&self, mass: f32) -> Result<Matrix3x3>;

    /// Gets the point of the shape core that lies furthest along `direction`.
    fn local_support_point_without_margin(&self, direction: Vec3) -> Vec3;

    /// Gets the distance the surface extends beyond the shape core.
    fn margin(&self) -> f32;

    fn local_scaling(&self) -> Vec3;

    /// Changes the local scaling. Anything cached from the shape geometry is recomputed.
    fn set_local_scaling(&mut self, scaling: Vec3);

    /// Gets the number of bytes used by the shape itself, shared resources excluded.
    fn size_in_bytes(&self) -> usize;

    /// Gets the support point of the shape including its margin.
    ///
    /// A zero direction pushes the core support point down the local -Y axis.
    #[inline]
    fn local_support_point_with_margin(&self, direction: Vec3) -> Vec3 {
        let support_point = self.local_support_point_without_margin(direction);
        let unit_direction = if direction.length_squared() > f32::EPSILON * f32::EPSILON {
            direction.normalize()
        } else {
            Vec3::NEG_Y
        };
        support_point + unit_direction * self.margin()
    }

    /// Computes the bounding box of a shape given an orientation.
    ///
    /// The box is exact for the margin-expanded shape: each face of the box touches the shape
    /// at the support point along that world axis.
    fn compute_bounds(&self, orientation: Quat, min: &mut Vec3, max: &mut Vec3) {
        let inverse = orientation.conjugate();
        for axis in 0..3 {
            let mut world_axis = Vec3::ZERO;
            world_axis[axis] = 1.0;
            let positive = orientation
                * self.local_support_point_with_margin(inverse * world_axis);
            let negative = orientation
                * self.local_support_point_with_margin(inverse * -world_axis);
            max[axis] = positive[axis];
            min[axis] = negative[axis];
        }
    }
}

/// Convex shape with explicit polyhedral topology.
///
/// Vertex positions and face normals are reported in scaled local space. The plain accessors
/// panic on an index at or beyond the matching count; the `try_` variants return an error.
pub trait IConvexPolyhedron: IConvexShape {
    fn face_count(&self) -> usize;

    fn face(&self, face_index: usize) -> &Face;

    fn vertex_count(&self) -> usize;

    fn vertex(&self, vertex_index: usize) -> &Vertex;

    fn half_edge_count(&self) -> usize;

    fn half_edge(&self, edge_index: usize) -> &Edge;

    fn vertex_position(&self, vertex_index: usize) -> Vec3;

    /// Gets the unit outward normal of a face.
    fn face_normal(&self, face_index: usize) -> Vec3;

    fn centroid(&self) -> Vec3;

    fn try_face(&self, face_index: usize) -> Result<&Face> {
        check_index(TopologyElement::Face, face_index, self.face_count())?;
        Ok(self.face(face_index))
    }

    fn try_vertex(&self, vertex_index: usize) -> Result<&Vertex> {
        check_index(TopologyElement::Vertex, vertex_index, self.vertex_count())?;
        Ok(self.vertex(vertex_index))
    }

    fn try_half_edge(&self, edge_index: usize) -> Result<&Edge> {
        check_index(TopologyElement::HalfEdge, edge_index, self.half_edge_count())?;
        Ok(self.half_edge(edge_index))
    }

    fn try_vertex_position(&self, vertex_index: usize) -> Result<Vec3> {
        check_index(TopologyElement::Vertex, vertex_index, self.vertex_count())?;
        Ok(self.vertex_position(vertex_index))
    }

    fn try_face_normal(&self, face_index: usize) -> Result<Vec3> {
        check_index(TopologyElement::Face, face_index, self.face_count())?;
        Ok(self.face_normal(face_index))
    }
}

#[inline(always)]
fn check_index(kind: TopologyElement, index: usize, count: usize) -> Result<()> {
    if index < count {
        Ok(())
    } else {
        Err(CollisionError::IndexOutOfRange { kind, index, count })
    }
}

/// Approximates an inertia tensor by the solid box spanned by `bounds`.
///
/// With half extents (x, y, z) the tensor is diag(m/3 (y² + z²), m/3 (x² + z²), m/3 (x² + y²)),
/// which is exact for boxes and an overestimate for every other shape that fits the bounds.
pub fn bounding_box_inertia(bounds: &BoundingBox, mass: f32) -> Result<Matrix3x3> {
    let half_extent = bounds.half_extent();
    if !(half_extent.min_element() > 0.0) {
        return Err(CollisionError::DegenerateBounds {
            extent: half_extent.to_array(),
        });
    }
    let factor = mass / 3.0;
    let squared = half_extent * half_extent;
    Ok(Matrix3x3::from_diagonal(Vec3::new(
        factor * (squared.y + squared.z),
        factor * (squared.x + squared.z),
        factor * (squared.x + squared.y),
    )))
}
