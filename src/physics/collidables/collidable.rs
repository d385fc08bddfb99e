use glam::Vec3;

use crate::physics::body_properties::RigidPose;
use crate::physics::handles::BodyHandle;
use crate::utilities::BoundingBox;

use super::collision_shape::CollisionShape;
use super::shape::IConvexShape;

/// Body that owns one or more collision proxies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionBody {
    handle: BodyHandle,
    /// World transform of the body.
    pub pose: RigidPose,
}

impl CollisionBody {
    #[inline(always)]
    pub fn new(handle: BodyHandle, pose: RigidPose) -> Self {
        Self { handle, pose }
    }

    #[inline(always)]
    pub fn handle(&self) -> BodyHandle {
        self.handle
    }
}

/// Attaches a shape to a body at a fixed offset.
///
/// The proxy borrows both; shapes can be shared between proxies.
#[derive(Debug, Clone, Copy)]
pub struct ProxyShape<'a> {
    body: &'a CollisionBody,
    shape: &'a CollisionShape,
    /// Pose of the shape relative to its body.
    pub local_pose: RigidPose,
}

impl<'a> ProxyShape<'a> {
    #[inline(always)]
    pub fn new(body: &'a CollisionBody, shape: &'a CollisionShape, local_pose: RigidPose) -> Self {
        Self {
            body,
            shape,
            local_pose,
        }
    }

    #[inline(always)]
    pub fn body(&self) -> &'a CollisionBody {
        self.body
    }

    #[inline(always)]
    pub fn shape(&self) -> &'a CollisionShape {
        self.shape
    }

    /// Gets the world transform of the shape.
    #[inline]
    pub fn world_pose(&self) -> RigidPose {
        let mut pose = RigidPose::IDENTITY;
        RigidPose::multiply_without_overlap(&self.local_pose, &self.body.pose, &mut pose);
        pose
    }

    /// Computes the world space bounding box of the shape, margin included.
    pub fn world_bounds(&self) -> BoundingBox {
        let pose = self.world_pose();
        let (mut min, mut max) = (Vec3::ZERO, Vec3::ZERO);
        self.shape.compute_bounds(pose.orientation, &mut min, &mut max);
        BoundingBox::new(min + pose.position, max + pose.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::collidables::sphere::SphereShape;
    use glam::Quat;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn world_pose_chains_local_then_body() {
        let body = CollisionBody::new(
            BodyHandle(7),
            RigidPose::new(Vec3::new(10.0, 0.0, 0.0), Quat::from_rotation_z(FRAC_PI_2)),
        );
        let shape = CollisionShape::from(SphereShape::new(1.0));
        let proxy = ProxyShape::new(&body, &shape, RigidPose::from_position(Vec3::X));
        let pose = proxy.world_pose();
        assert!(pose.position.abs_diff_eq(Vec3::new(10.0, 1.0, 0.0), 1e-5));
        assert_eq!(proxy.body().handle(), BodyHandle(7));

        let bounds = proxy.world_bounds();
        assert!(bounds.min.abs_diff_eq(Vec3::new(9.0, 0.0, -1.0), 1e-5));
        assert!(bounds.max.abs_diff_eq(Vec3::new(11.0, 2.0, 1.0), 1e-5));
    }
}
