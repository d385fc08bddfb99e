use glam::Vec3;
use std::fmt;

use crate::error::{CollisionError, Result};

/// Information about a single contact between two shapes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ContactPoint {
    /// Contact normal in world space. Points from shape 1 to shape 2.
    pub normal: Vec3,
    /// Penetration depth between the two shapes at this contact. Negative values represent separation.
    pub penetration_depth: f32,
    /// Contact point on the first shape, in that shape's local space.
    pub local_point_on_shape1: Vec3,
    /// Contact point on the second shape, in that shape's local space.
    pub local_point_on_shape2: Vec3,
    /// Id of the features involved in the collision that generated this contact.
    pub feature_id: i32,
}

impl ContactPoint {
    #[inline(always)]
    pub fn new(
        normal: Vec3,
        penetration_depth: f32,
        local_point_on_shape1: Vec3,
        local_point_on_shape2: Vec3,
    ) -> Self {
        Self {
            normal,
            penetration_depth,
            local_point_on_shape1,
            local_point_on_shape2,
            feature_id: 0,
        }
    }
}

/// Set of contacts found between the same two shapes.
///
/// Manifolds are owned by the [`ContactManifoldSet`](super::contact_manifold_set::ContactManifoldSet)
/// of a pair, which chains them together.
#[derive(Debug)]
pub struct ContactManifold {
    contacts: [ContactPoint; Self::MAXIMUM_CONTACT_COUNT],
    count: usize,
    pub(crate) next: Option<Box<ContactManifold>>,
}

impl Default for ContactManifold {
    fn default() -> Self {
        Self::new()
    }
}

impl ContactManifold {
    /// The maximum number of contacts that can exist within a manifold.
    pub const MAXIMUM_CONTACT_COUNT: usize = 4;

    pub fn new() -> Self {
        Self {
            contacts: [ContactPoint::default(); Self::MAXIMUM_CONTACT_COUNT],
            count: 0,
            next: None,
        }
    }

    /// Creates a manifold holding the given contacts.
    pub fn from_contacts(contacts: &[ContactPoint]) -> Result<Self> {
        let mut manifold = Self::new();
        for contact in contacts {
            manifold.add_contact_point(*contact)?;
        }
        Ok(manifold)
    }

    #[inline(always)]
    pub fn contact_point_count(&self) -> usize {
        self.count
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Gets the contact at the given index. Panics if `index >= contact_point_count()`.
    #[inline(always)]
    pub fn contact_point(&self, index: usize) -> &ContactPoint {
        assert!(
            index < self.count,
            "Contact index must be within the contact count."
        );
        &self.contacts[index]
    }

    #[inline(always)]
    pub fn contact_points(&self) -> &[ContactPoint] {
        &self.contacts[..self.count]
    }

    #[inline(always)]
    pub fn contact_points_mut(&mut self) -> &mut [ContactPoint] {
        &mut self.contacts[..self.count]
    }

    /// Adds a contact to the manifold.
    pub fn add_contact_point(&mut self, contact: ContactPoint) -> Result<()> {
        if self.count == Self::MAXIMUM_CONTACT_COUNT {
            return Err(CollisionError::ManifoldFull {
                capacity: Self::MAXIMUM_CONTACT_COUNT,
            });
        }
        self.contacts[self.count] = contact;
        self.count += 1;
        Ok(())
    }

    /// Quickly removes a contact at the given index by swapping with the last.
    pub fn fast_remove_at(&mut self, index: usize) {
        assert!(
            index < self.count,
            "Contact index must be within the contact count."
        );
        self.count -= 1;
        if index < self.count {
            self.contacts[index] = self.contacts[self.count];
        }
    }

    /// Gets the contact with the largest penetration depth.
    pub fn deepest_contact(&self) -> Option<&ContactPoint> {
        self.contact_points()
            .iter()
            .max_by(|a, b| a.penetration_depth.total_cmp(&b.penetration_depth))
    }

    /// Gets the following manifold of the owning set, if any.
    #[inline(always)]
    pub fn next(&self) -> Option<&ContactManifold> {
        self.next.as_deref()
    }
}

impl fmt::Display for ContactManifold {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ContactManifold({} contacts", self.count)?;
        if let Some(deepest) = self.deepest_contact() {
            write!(f, ", deepest {}", deepest.penetration_depth)?;
        }
        write!(f, ")")
    }
}
