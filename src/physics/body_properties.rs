use glam::{Quat, Vec3};

use crate::error::Result;
use crate::physics::collidables::shape::IConvexShape;
use crate::utilities::Matrix3x3;

/// Represents a rigid transformation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidPose {
    /// Orientation of the pose.
    pub orientation: Quat,
    /// Position of the pose.
    pub position: Vec3,
}

impl Default for RigidPose {
    #[inline(always)]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl RigidPose {
    /// Returns a pose with a position at (0,0,0) and identity orientation.
    pub const IDENTITY: Self = Self {
        orientation: Quat::IDENTITY,
        position: Vec3::ZERO,
    };

    /// Creates a rigid pose with the given position and orientation.
    #[inline(always)]
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Creates a rigid pose with the given position and identity orientation.
    #[inline(always)]
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            orientation: Quat::IDENTITY,
        }
    }

    /// Transforms a vector by the rigid pose: orientation * v + position.
    #[inline(always)]
    pub fn transform(v: Vec3, pose: &RigidPose, result: &mut Vec3) {
        *result = pose.orientation * v + pose.position;
    }

    /// Transforms a vector by the inverse of a rigid pose: orientation^-1 * (v - position).
    #[inline(always)]
    pub fn transform_by_inverse(v: Vec3, pose: &RigidPose, result: &mut Vec3) {
        *result = pose.orientation.conjugate() * (v - pose.position);
    }

    /// Inverts the rigid transformation of the pose.
    #[inline(always)]
    pub fn invert(pose: &RigidPose, inverse: &mut RigidPose) {
        inverse.orientation = pose.orientation.conjugate();
        inverse.position = inverse.orientation * -pose.position;
    }

    /// Concatenates one rigid transform with another. The resulting transform is equivalent
    /// to performing transform a followed by transform b.
    #[inline(always)]
    pub fn multiply_without_overlap(a: &RigidPose, b: &RigidPose, result: &mut RigidPose) {
        result.orientation = b.orientation * a.orientation;
        result.position = b.orientation * a.position + b.position;
    }
}

/// Stores the inertia for a body.
///
/// This representation stores the inverse mass and inverse local inertia tensor, which is what
/// a solver consumes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BodyInertia {
    /// Inverse of the body's inertia tensor in local space.
    pub inverse_inertia_tensor: Matrix3x3,
    /// Inverse of the body's mass.
    pub inverse_mass: f32,
}

impl BodyInertia {
    /// Computes the inverse inertia of a shape with the given mass.
    ///
    /// Fails if the shape's bounds are degenerate or its inertia tensor cannot be inverted.
    pub fn from_shape(shape: &dyn IConvexShape, mass: f32) -> Result<Self> {
        let inertia = shape.compute_local_inertia_tensor(mass)?;
        Ok(Self {
            inverse_inertia_tensor: inertia.try_inverse()?,
            inverse_mass: 1.0 / mass,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn transform_round_trips_through_inverse() {
        let pose = RigidPose::new(Vec3::new(1.0, -2.0, 3.0), Quat::from_rotation_y(FRAC_PI_2));
        let point = Vec3::new(0.5, 0.25, -4.0);
        let mut world = Vec3::ZERO;
        RigidPose::transform(point, &pose, &mut world);
        let mut local = Vec3::ZERO;
        RigidPose::transform_by_inverse(world, &pose, &mut local);
        assert_relative_eq!(local.x, point.x, epsilon = 1e-5);
        assert_relative_eq!(local.y, point.y, epsilon = 1e-5);
        assert_relative_eq!(local.z, point.z, epsilon = 1e-5);
    }

    #[test]
    fn multiply_applies_a_then_b() {
        let a = RigidPose::from_position(Vec3::X);
        let b = RigidPose::new(Vec3::Y, Quat::from_rotation_z(FRAC_PI_2));
        let mut combined = RigidPose::IDENTITY;
        RigidPose::multiply_without_overlap(&a, &b, &mut combined);

        let mut expected = Vec3::ZERO;
        let mut intermediate = Vec3::ZERO;
        RigidPose::transform(Vec3::Z, &a, &mut intermediate);
        RigidPose::transform(intermediate, &b, &mut expected);
        let mut actual = Vec3::ZERO;
        RigidPose::transform(Vec3::Z, &combined, &mut actual);
        assert!(actual.abs_diff_eq(expected, 1e-5));

        let mut inverse = RigidPose::IDENTITY;
        RigidPose::invert(&combined, &mut inverse);
        let mut back = Vec3::ZERO;
        RigidPose::transform(actual, &inverse, &mut back);
        assert!(back.abs_diff_eq(Vec3::Z, 1e-5));
    }
}
