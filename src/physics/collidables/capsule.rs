use glam::Vec3;

use crate::error::{CollisionError, Result};
use crate::utilities::{BoundingBox, Matrix3x3};

use super::ray::{Ray, RayHit};
use super::shape::{IConvexShape, IShape};

/// Collision shape representing a sphere-expanded line segment.
///
/// The segment is the core of the shape and runs along the local Y axis; the radius is margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapsuleShape {
    radius: f32,
    half_height: f32,
    scaling: Vec3,
}

impl CapsuleShape {
    /// Type id of capsule shapes.
    pub const ID: i32 = 1;

    /// Creates a capsule shape. `height` is the length of the internal segment.
    #[inline(always)]
    pub fn new(radius: f32, height: f32) -> Self {
        Self {
            radius,
            half_height: height * 0.5,
            scaling: Vec3::ONE,
        }
    }

    /// Gets the radius with the X scaling applied.
    #[inline(always)]
    pub fn radius(&self) -> f32 {
        self.radius * self.scaling.x
    }

    /// Gets half the segment length with the Y scaling applied.
    #[inline(always)]
    pub fn half_height(&self) -> f32 {
        self.half_height * self.scaling.y
    }

    pub fn test_point_inside(&self, local_point: Vec3) -> bool {
        let half_height = self.half_height();
        let radius = self.radius();
        let closest = Vec3::new(0.0, local_point.y.clamp(-half_height, half_height), 0.0);
        (local_point - closest).length_squared() <= radius * radius
    }

    pub fn raycast(&self, ray: &Ray) -> Option<RayHit> {
        let radius = self.radius();
        let half_height = self.half_height();
        let d_length = ray.direction.length();
        if d_length == 0.0 {
            return None;
        }
        let inverse_d_length = 1.0 / d_length;
        let d = ray.direction * inverse_d_length;

        // Move the origin up to the earliest possible impact time.
        let mut o = ray.origin;
        let t_offset = (-o.dot(d) - (half_height + radius)).max(0.0);
        o += d * t_offset;

        // Test the infinite cylinder first.
        let oh = Vec3::new(o.x, 0.0, o.z);
        let dh = Vec3::new(d.x, 0.0, d.z);
        let a = dh.dot(dh);
        let b = oh.dot(dh);
        let radius_squared = radius * radius;
        let c = oh.dot(oh) - radius_squared;
        if b > 0.0 && c > 0.0 {
            return None;
        }

        let sphere_y = if a > 1e-8 {
            let discriminant = b * b - a * c;
            if discriminant < 0.0 {
                return None;
            }
            let t = ((-b - discriminant.sqrt()) / a).max(-t_offset);
            let cylinder_hit = o + d * t;
            if cylinder_hit.y < -half_height {
                -half_height
            } else if cylinder_hit.y > half_height {
                half_height
            } else {
                // Hit is on the cylindrical portion.
                let normal = Vec3::new(cylinder_hit.x, 0.0, cylinder_hit.z) / radius;
                return Self::bounded_hit(ray, (t + t_offset) * inverse_d_length, normal);
            }
        } else {
            // Ray is parallel to the axis; the nearest cap center is the only candidate.
            o.y.clamp(-half_height, half_height)
        };

        let os = o - Vec3::new(0.0, sphere_y, 0.0);
        let cap_b = os.dot(d);
        let cap_c = os.dot(os) - radius_squared;
        if cap_b > 0.0 && cap_c > 0.0 {
            return None;
        }
        let cap_discriminant = cap_b * cap_b - cap_c;
        if cap_discriminant < 0.0 {
            return None;
        }
        let t = (-cap_b - cap_discriminant.sqrt()).max(-t_offset);
        let normal = (os + d * t) / radius;
        Self::bounded_hit(ray, (t + t_offset) * inverse_d_length, normal)
    }

    #[inline(always)]
    fn bounded_hit(ray: &Ray, t: f32, normal: Vec3) -> Option<RayHit> {
        if t > ray.maximum_t {
            None
        } else {
            Some(RayHit { t, normal })
        }
    }
}

impl IShape for CapsuleShape {
    #[inline(always)]
    fn type_id() -> i32 {
        Self::ID
    }
}

impl IConvexShape for CapsuleShape {
    fn local_bounds(&self) -> BoundingBox {
        let radius = self.radius();
        let extent = Vec3::new(radius, self.half_height() + radius, radius);
        BoundingBox::new(-extent, extent)
    }

    /// Combines a cylinder with two hemispherical caps, weighted by their share of the volume.
    fn compute_local_inertia_tensor(&self, mass: f32) -> Result<Matrix3x3> {
        let radius = self.radius();
        let height = 2.0 * self.half_height();
        if !(radius > 0.0) || height < 0.0 {
            return Err(CollisionError::DegenerateBounds {
                extent: [radius, self.half_height() + radius, radius],
            });
        }
        let radius_square = radius * radius;
        let height_square = height * height;
        let radius_square_double = radius_square + radius_square;
        let factor1 = 2.0 * radius / (4.0 * radius + 3.0 * height);
        let factor2 = 3.0 * height / (4.0 * radius + 3.0 * height);
        let sum1 = 0.4 * radius_square_double;
        let sum2 = 0.75 * height * radius + 0.5 * height_square;
        let sum3 = 0.25 * radius_square + height_square / 12.0;
        let ixx_and_zz = factor1 * mass * (sum1 + sum2) + factor2 * mass * sum3;
        let iyy = factor1 * mass * sum1 + factor2 * mass * 0.25 * radius_square_double;
        Ok(Matrix3x3::from_diagonal(Vec3::new(ixx_and_zz, iyy, ixx_and_zz)))
    }

    #[inline(always)]
    fn local_support_point_without_margin(&self, direction: Vec3) -> Vec3 {
        if direction.y > 0.0 {
            Vec3::new(0.0, self.half_height(), 0.0)
        } else {
            Vec3::new(0.0, -self.half_height(), 0.0)
        }
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::collidables::sphere::SphereShape;
    use approx::assert_relative_eq;

    #[test]
    fn degenerate_capsule_has_sphere_inertia() {
        let capsule = CapsuleShape::new(1.5, 0.0).compute_local_inertia_tensor(2.0).unwrap();
        let sphere = SphereShape::new(1.5).compute_local_inertia_tensor(2.0).unwrap();
        assert!(capsule.abs_diff_eq(&sphere, 1e-5));
    }

    #[test]
    fn long_capsule_resists_tumbling_more_than_spinning() {
        let inertia = CapsuleShape::new(0.5, 4.0).compute_local_inertia_tensor(1.0).unwrap();
        assert!(inertia.get(0, 0) > inertia.get(1, 1));
        assert_eq!(inertia.get(0, 0), inertia.get(2, 2));
    }

    #[test]
    fn support_and_bounds_follow_scaling() {
        let mut capsule = CapsuleShape::new(1.0, 2.0);
        capsule.set_local_scaling(Vec3::new(2.0, 3.0, 1.0));
        let support = capsule.local_support_point_with_margin(Vec3::Y);
        assert_relative_eq!(support.y, 5.0);
        let bounds = capsule.local_bounds();
        assert_eq!(bounds.max, Vec3::new(2.0, 5.0, 2.0));
        assert_eq!(bounds.min, Vec3::new(-2.0, -5.0, -2.0));
    }

    #[test]
    fn containment_covers_segment_and_caps() {
        let capsule = CapsuleShape::new(1.0, 2.0);
        assert!(capsule.test_point_inside(Vec3::new(0.9, 0.9, 0.0)));
        assert!(capsule.test_point_inside(Vec3::new(0.0, 1.9, 0.0)));
        assert!(!capsule.test_point_inside(Vec3::new(0.9, 1.9, 0.0)));
        assert!(!capsule.test_point_inside(Vec3::new(1.1, 0.0, 0.0)));
    }

    #[test]
    fn rays_hit_cylinder_and_caps() {
        let capsule = CapsuleShape::new(1.0, 2.0);

        let side = capsule.raycast(&Ray::new(Vec3::new(-5.0, 0.5, 0.0), Vec3::X)).unwrap();
        assert_relative_eq!(side.t, 4.0, epsilon = 1e-5);
        assert!(side.normal.abs_diff_eq(Vec3::NEG_X, 1e-5));

        let top = capsule.raycast(&Ray::new(Vec3::new(0.0, 10.0, 0.0), Vec3::NEG_Y)).unwrap();
        assert_relative_eq!(top.t, 8.0, epsilon = 1e-5);
        assert!(top.normal.abs_diff_eq(Vec3::Y, 1e-5));

        let bottom = capsule.raycast(&Ray::new(Vec3::new(0.0, -10.0, 0.0), Vec3::Y)).unwrap();
        assert_relative_eq!(bottom.t, 8.0, epsilon = 1e-5);

        assert!(capsule.raycast(&Ray::new(Vec3::new(0.0, 10.0, 0.0), Vec3::Y)).is_none());
        assert!(capsule.raycast(&Ray::new(Vec3::new(-5.0, 3.0, 0.0), Vec3::X)).is_none());

        let inside = capsule.raycast(&Ray::new(Vec3::new(0.0, 0.5, 0.0), Vec3::Y)).unwrap();
        assert_eq!(inside.t, 0.0);
    }
}
