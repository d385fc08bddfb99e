use std::ptr::NonNull;

use crate::error::{CollisionError, Result};

use super::contact_manifold::ContactManifold;

/// Chain of the contact manifolds found for one overlapping pair, in detection order.
///
/// The set never retains a manifold without contacts. Manifolds can only be changed in place
/// through [`update_manifolds`](Self::update_manifolds), which drops the ones left empty.
#[derive(Debug, Default)]
pub struct ContactManifoldSet {
    head: Option<Box<ContactManifold>>,
    /// Last node of the chain, owned through `head`.
    tail: Option<NonNull<ContactManifold>>,
    count: usize,
}

// Safety: `tail` only ever aliases a node owned by this set and is never handed out; the set is
// otherwise plain owned data.
unsafe impl Send for ContactManifoldSet {}
unsafe impl Sync for ContactManifoldSet {}

impl ContactManifoldSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a manifold after every manifold already in the set.
    pub fn add_manifold(&mut self, manifold: ContactManifold) -> Result<()> {
        if manifold.is_empty() {
            return Err(CollisionError::EmptyManifold);
        }
        self.push_node(Box::new(manifold));
        Ok(())
    }

    fn push_node(&mut self, mut node: Box<ContactManifold>) {
        node.next = None;
        let link = match self.tail {
            // Safety: the tail node is owned by the chain and nothing else borrows it while
            // `self` is borrowed mutably.
            Some(tail) => unsafe { &mut (*tail.as_ptr()).next },
            None => &mut self.head,
        };
        let node = link.insert(node);
        self.tail = Some(NonNull::from(&mut **node));
        self.count += 1;
    }

    /// Gets the first manifold of the chain.
    #[inline(always)]
    pub fn head(&self) -> Option<&ContactManifold> {
        self.head.as_deref()
    }

    #[inline(always)]
    pub fn manifold_count(&self) -> usize {
        self.count
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Gets the total number of contacts across every manifold.
    pub fn total_contact_point_count(&self) -> usize {
        self.manifolds().map(ContactManifold::contact_point_count).sum()
    }

    /// Enumerates the manifolds from first to last detected.
    pub fn manifolds(&self) -> Manifolds<'_> {
        Manifolds {
            next: self.head.as_deref(),
        }
    }

    /// Runs `update` on every manifold in detection order, then drops the manifolds it left
    /// without contacts. The order of the rest is kept.
    pub fn update_manifolds<F>(&mut self, mut update: F)
    where
        F: FnMut(&mut ContactManifold),
    {
        let mut remaining = self.head.take();
        self.tail = None;
        self.count = 0;
        while let Some(mut node) = remaining {
            remaining = node.next.take();
            update(&mut *node);
            if !node.is_empty() {
                self.push_node(node);
            }
        }
    }

    pub fn clear(&mut self) {
        let mut remaining = self.head.take();
        while let Some(mut node) = remaining {
            remaining = node.next.take();
        }
        self.tail = None;
        self.count = 0;
    }
}

impl Drop for ContactManifoldSet {
    fn drop(&mut self) {
        // Unlink one node at a time so long chains never recurse.
        self.clear();
    }
}

/// Iterator over the manifolds of a set.
pub struct Manifolds<'a> {
    next: Option<&'a ContactManifold>,
}

impl<'a> Iterator for Manifolds<'a> {
    type Item = &'a ContactManifold;

    fn next(&mut self) -> Option<Self::Item> {
        self.next.map(|manifold| {
            self.next = manifold.next.as_deref();
            manifold
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::collision_detection::contact_manifold::ContactPoint;
    use glam::Vec3;

    fn manifold_with(depths: &[f32]) -> ContactManifold {
        let contacts: Vec<ContactPoint> = depths
            .iter()
            .map(|&depth| ContactPoint::new(Vec3::Y, depth, Vec3::ZERO, Vec3::ZERO))
            .collect();
        ContactManifold::from_contacts(&contacts).unwrap()
    }

    fn first_depths(set: &ContactManifoldSet) -> Vec<f32> {
        set.manifolds()
            .map(|m| m.contact_point(0).penetration_depth)
            .collect()
    }

    #[test]
    fn manifolds_keep_detection_order() {
        let mut set = ContactManifoldSet::new();
        set.add_manifold(manifold_with(&[1.0])).unwrap();
        set.add_manifold(manifold_with(&[2.0, 2.5])).unwrap();
        set.add_manifold(manifold_with(&[3.0])).unwrap();
        assert_eq!(first_depths(&set), vec![1.0, 2.0, 3.0]);
        assert_eq!(set.manifold_count(), 3);
        assert_eq!(set.total_contact_point_count(), 4);
        assert_eq!(set.head().unwrap().next().unwrap().contact_point_count(), 2);
    }

    #[test]
    fn empty_manifolds_are_rejected() {
        let mut set = ContactManifoldSet::new();
        assert_eq!(
            set.add_manifold(ContactManifold::new()),
            Err(CollisionError::EmptyManifold)
        );
        assert!(set.is_empty());
        assert_eq!(set.manifold_count(), 0);
    }

    #[test]
    fn emptied_manifolds_are_dropped_by_updates() {
        let mut set = ContactManifoldSet::new();
        for depth in [1.0, 2.0, 3.0, 4.0] {
            set.add_manifold(manifold_with(&[depth])).unwrap();
        }
        set.update_manifolds(|manifold| {
            if manifold.contact_point(0).penetration_depth % 2.0 == 0.0 {
                manifold.fast_remove_at(0);
            }
        });
        assert_eq!(first_depths(&set), vec![1.0, 3.0]);
        assert_eq!(set.manifold_count(), 2);

        // Appends after an update land behind the survivors.
        set.add_manifold(manifold_with(&[5.0])).unwrap();
        assert_eq!(first_depths(&set), vec![1.0, 3.0, 5.0]);
    }

    #[test]
    fn emptying_every_manifold_leaves_an_empty_set() {
        let mut set = ContactManifoldSet::new();
        set.add_manifold(manifold_with(&[0.5, 0.25])).unwrap();
        set.update_manifolds(|manifold| {
            while !manifold.is_empty() {
                manifold.fast_remove_at(0);
            }
        });
        assert_eq!(set.manifold_count(), 0);
        assert!(set.is_empty());
        assert!(set.head().is_none());
        set.add_manifold(manifold_with(&[0.75])).unwrap();
        assert_eq!(first_depths(&set), vec![0.75]);
    }

    #[test]
    fn updates_can_edit_contacts_in_place() {
        let mut set = ContactManifoldSet::new();
        set.add_manifold(manifold_with(&[0.1, 0.2])).unwrap();
        set.update_manifolds(|manifold| {
            for contact in manifold.contact_points_mut() {
                contact.penetration_depth *= 10.0;
            }
        });
        assert_eq!(set.total_contact_point_count(), 2);
        assert_eq!(set.head().unwrap().deepest_contact().unwrap().penetration_depth, 2.0);
    }

    #[test]
    fn long_chains_build_and_drop_without_recursing() {
        let mut set = ContactManifoldSet::new();
        for i in 0..100_000 {
            set.add_manifold(manifold_with(&[i as f32])).unwrap();
        }
        assert_eq!(set.manifold_count(), 100_000);
        assert_eq!(set.manifolds().count(), 100_000);
        assert_eq!(set.manifolds().last().unwrap().contact_point(0).penetration_depth, 99_999.0);
        set.clear();
        assert!(set.is_empty());
    }
}
