use glam::Vec3;

use crate::error::{CollisionError, Result};
use crate::utilities::{BoundingBox, Matrix3x3};

use super::ray::{Ray, RayHit};
use super::shape::{IConvexShape, IShape};

/// Collision shape representing a sphere.
///
/// The core of a sphere is its center point; the whole radius is margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereShape {
    radius: f32,
    scaling: Vec3,
}

impl SphereShape {
    /// Type id of sphere shapes.
    pub const ID: i32 = 0;

    /// Creates a sphere shape.
    #[inline(always)]
    pub fn new(radius: f32) -> Self {
        Self {
            radius,
            scaling: Vec3::ONE,
        }
    }

    /// Gets the radius with the local scaling applied. Only the X scaling affects a sphere.
    #[inline(always)]
    pub fn radius(&self) -> f32 {
        self.radius * self.scaling.x
    }

    #[inline(always)]
    pub fn test_point_inside(&self, local_point: Vec3) -> bool {
        let radius = self.radius();
        local_point.length_squared() <= radius * radius
    }

    pub fn raycast(&self, ray: &Ray) -> Option<RayHit> {
        let radius = self.radius();
        let d_length = ray.direction.length();
        if d_length == 0.0 {
            return None;
        }
        // Normalize the direction. Sqrts aren't *that* bad, and it both simplifies things
        // and helps avoid numerical problems.
        let inverse_d_length = 1.0 / d_length;
        let d = ray.direction * inverse_d_length;

        // Move the origin up to the earliest possible impact time.
        let mut o = ray.origin;
        let t_offset = (-o.dot(d) - radius).max(0.0);
        o += d * t_offset;
        let b = o.dot(d);
        let c = o.dot(o) - radius * radius;

        if b > 0.0 && c > 0.0 {
            // Ray is outside and pointing away, no hit.
            return None;
        }

        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }
        let t = (-b - discriminant.sqrt()).max(-t_offset);
        let normal = (o + d * t) / radius;
        let t = (t + t_offset) * inverse_d_length;
        if t > ray.maximum_t {
            return None;
        }
        Some(RayHit { t, normal })
    }
}

impl IShape for SphereShape {
    #[inline(always)]
    fn type_id() -> i32 {
        Self::ID
    }
}

impl IConvexShape for SphereShape {
    fn local_bounds(&self) -> BoundingBox {
        let radius = Vec3::splat(self.radius());
        BoundingBox::new(-radius, radius)
    }

    fn compute_local_inertia_tensor(&self, mass: f32) -> Result<Matrix3x3> {
        let radius = self.radius();
        if !(radius > 0.0) {
            return Err(CollisionError::DegenerateBounds {
                extent: [radius; 3],
            });
        }
        Ok(Matrix3x3::from_diagonal(Vec3::splat(0.4 * mass * radius * radius)))
    }

    #[inline(always)]
    fn local_support_point_without_margin(&self, _direction: Vec3) -> Vec3 {
        Vec3::ZERO
    }

    #[inline(always)]
    fn margin(&self) -> f32 {
        self.radius()
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
