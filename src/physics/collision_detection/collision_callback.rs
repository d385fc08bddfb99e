use std::alloc::Layout;
use std::marker::PhantomData;
use std::ptr::{self, NonNull};

use crate::error::Result;
use crate::physics::collidables::collidable::{CollisionBody, ProxyShape};
use crate::utilities::memory::IUnmanagedMemoryPool;

use super::contact_manifold::ContactManifold;
use super::overlapping_pair::OverlappingPair;

/// Node of the transient manifold list handed to collision callbacks.
///
/// Elements live in blocks taken from a memory pool and only reference the manifolds, which
/// stay owned by the pair.
#[derive(Debug)]
pub struct ContactManifoldListElement<'a> {
    contact_manifold: &'a ContactManifold,
    next: Option<NonNull<ContactManifoldListElement<'a>>>,
}

impl<'a> ContactManifoldListElement<'a> {
    #[inline(always)]
    fn new(
        contact_manifold: &'a ContactManifold,
        next: Option<NonNull<ContactManifoldListElement<'a>>>,
    ) -> Self {
        Self {
            contact_manifold,
            next,
        }
    }

    #[inline(always)]
    pub fn contact_manifold(&self) -> &ContactManifold {
        self.contact_manifold
    }

    /// Gets the following element of the list.
    #[inline(always)]
    pub fn next(&self) -> Option<&ContactManifoldListElement<'a>> {
        // Safety: elements are only reachable through the info that owns the whole list, and
        // the list is released as a unit.
        self.next.map(|element| unsafe { &*element.as_ptr() })
    }
}

/// Contact information about one overlapping pair, built for the duration of a callback.
///
/// Construction takes one pool block per manifold of the pair; dropping the info hands every
/// block back. The list runs in reverse detection order, since each manifold is pushed on the
/// front as the pair's set is walked.
pub struct CollisionCallbackInfo<'a, 'p> {
    contact_manifold_elements: Option<NonNull<ContactManifoldListElement<'a>>>,
    pub body1: &'a CollisionBody,
    pub body2: &'a CollisionBody,
    pub proxy_shape1: &'a ProxyShape<'a>,
    pub proxy_shape2: &'a ProxyShape<'a>,
    memory_allocator: &'p mut dyn IUnmanagedMemoryPool,
}

impl<'a, 'p> CollisionCallbackInfo<'a, 'p> {
    #[inline(always)]
    fn element_layout() -> Layout {
        Layout::new::<ContactManifoldListElement<'a>>()
    }

    /// Builds the manifold list of a pair.
    ///
    /// If the pool runs out partway, every block taken so far goes back before the error is
    /// returned.
    pub fn new(
        pair: &'a OverlappingPair<'a>,
        memory_allocator: &'p mut dyn IUnmanagedMemoryPool,
    ) -> Result<Self> {
        let mut info = Self {
            contact_manifold_elements: None,
            body1: pair.shape1().body(),
            body2: pair.shape2().body(),
            proxy_shape1: pair.shape1(),
            proxy_shape2: pair.shape2(),
            memory_allocator,
        };

        let layout = Self::element_layout();
        for contact_manifold in pair.contact_manifold_set().manifolds() {
            debug_assert!(contact_manifold.contact_point_count() > 0);
            // On failure `info` drops here and releases the elements already built.
            let block = info.memory_allocator.allocate(layout)?;
            let element = block.cast::<ContactManifoldListElement<'a>>();
            // Safety: the block is fresh, sized and aligned for an element.
            unsafe {
                element.as_ptr().write(ContactManifoldListElement::new(
                    contact_manifold,
                    info.contact_manifold_elements,
                ));
            }
            info.contact_manifold_elements = Some(element);
        }

        log::trace!(
            "Collected {} contact manifolds between {} and {}",
            info.manifold_count(),
            info.body1.handle(),
            info.body2.handle()
        );
        Ok(info)
    }

    /// Gets the first element of the manifold list, if any.
    #[inline(always)]
    pub fn contact_manifold_elements(&self) -> Option<&ContactManifoldListElement<'a>> {
        // Safety: the list stays allocated until `self` drops.
        self.contact_manifold_elements
            .map(|element| unsafe { &*element.as_ptr() })
    }

    /// Enumerates the manifolds of the pair, most recently detected first.
    pub fn manifolds(&self) -> ContactManifolds<'_, 'a> {
        ContactManifolds {
            next: self.contact_manifold_elements,
            _list: PhantomData,
        }
    }

    pub fn manifold_count(&self) -> usize {
        self.manifolds().count()
    }

    /// Gets the total number of contacts across every manifold.
    pub fn contact_point_count(&self) -> usize {
        self.manifolds()
            .map(ContactManifold::contact_point_count)
            .sum()
    }
}

impl<'a, 'p> Drop for CollisionCallbackInfo<'a, 'p> {
    fn drop(&mut self) {
        let layout = Self::element_layout();
        let mut element = self.contact_manifold_elements.take();
        while let Some(current) = element {
            // Safety: every element was written into a block from this allocator with this
            // layout, and the taken head guarantees each one is visited exactly once.
            unsafe {
                element = (*current.as_ptr()).next;
                ptr::drop_in_place(current.as_ptr());
                self.memory_allocator.release(current.cast::<u8>(), layout);
            }
        }
    }
}

/// Iterator over the manifolds referenced by a callback info.
pub struct ContactManifolds<'i, 'a> {
    next: Option<NonNull<ContactManifoldListElement<'a>>>,
    _list: PhantomData<&'i ContactManifoldListElement<'a>>,
}

impl<'i, 'a> Iterator for ContactManifolds<'i, 'a> {
    type Item = &'i ContactManifold;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.next?;
        // Safety: the iterator borrows the info, which keeps the list alive.
        let element = unsafe { &*element.as_ptr() };
        self.next = element.next;
        Some(element.contact_manifold)
    }
}

/// Receives contact reports for overlapping pairs.
pub trait ICollisionCallback {
    /// Called once per reported pair. The info and everything it references are released as
    /// soon as this returns.
    fn notify_contact(&mut self, info: &CollisionCallbackInfo<'_, '_>);
}

impl<F> ICollisionCallback for F
where
    F: FnMut(&CollisionCallbackInfo<'_, '_>),
{
    #[inline(always)]
    fn notify_contact(&mut self, info: &CollisionCallbackInfo<'_, '_>) {
        (*self)(info)
    }
}

/// Builds the callback info of a pair, hands it to the callback and releases it.
pub fn report_contacts(
    pair: &OverlappingPair<'_>,
    memory_allocator: &mut dyn IUnmanagedMemoryPool,
    callback: &mut dyn ICollisionCallback,
) -> Result<()> {
    let info = CollisionCallbackInfo::new(pair, memory_allocator)?;
    callback.notify_contact(&info);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CollisionError;
    use crate::physics::body_properties::RigidPose;
    use crate::physics::collidables::collision_shape::CollisionShape;
    use crate::physics::collidables::sphere::SphereShape;
    use crate::physics::collision_detection::contact_manifold::ContactPoint;
    use crate::physics::handles::BodyHandle;
    use crate::utilities::memory::BufferPool;
    use glam::Vec3;

    /// Pool wrapper recording every block going in and out.
    struct RecordingPool {
        inner: BufferPool,
        allocated: Vec<usize>,
        released: Vec<usize>,
        fail_after: Option<usize>,
    }

    impl RecordingPool {
        fn new() -> Self {
            Self {
                inner: BufferPool::new(1024, 4),
                allocated: Vec::new(),
                released: Vec::new(),
                fail_after: None,
            }
        }

        fn failing_after(count: usize) -> Self {
            Self {
                fail_after: Some(count),
                ..Self::new()
            }
        }
    }

    impl IUnmanagedMemoryPool for RecordingPool {
        fn allocate(&mut self, layout: Layout) -> Result<NonNull<u8>> {
            if self.fail_after == Some(self.allocated.len()) {
                return Err(CollisionError::AllocationFailed {
                    size: layout.size(),
                    align: layout.align(),
                });
            }
            let block = self.inner.allocate(layout)?;
            self.allocated.push(block.as_ptr() as usize);
            Ok(block)
        }

        unsafe fn release(&mut self, block: NonNull<u8>, layout: Layout) {
            self.released.push(block.as_ptr() as usize);
            self.inner.release(block, layout);
        }

        fn allocation_count(&self) -> u64 {
            self.inner.allocation_count()
        }

        fn release_count(&self) -> u64 {
            self.inner.release_count()
        }
    }

    fn manifold_with_depth(depth: f32, contact_count: usize) -> ContactManifold {
        let contacts = vec![ContactPoint::new(Vec3::Y, depth, Vec3::ZERO, Vec3::ZERO); contact_count];
        ContactManifold::from_contacts(&contacts).unwrap()
    }

    struct Scene {
        bodies: [CollisionBody; 2],
        shape: CollisionShape,
    }

    impl Scene {
        fn new() -> Self {
            Self {
                bodies: [
                    CollisionBody::new(BodyHandle(1), RigidPose::IDENTITY),
                    CollisionBody::new(BodyHandle(2), RigidPose::from_position(Vec3::X)),
                ],
                shape: SphereShape::new(1.0).into(),
            }
        }

        fn proxies(&self) -> [ProxyShape<'_>; 2] {
            [
                ProxyShape::new(&self.bodies[0], &self.shape, RigidPose::IDENTITY),
                ProxyShape::new(&self.bodies[1], &self.shape, RigidPose::IDENTITY),
            ]
        }
    }

    #[test]
    fn empty_pair_never_touches_the_pool() {
        let scene = Scene::new();
        let proxies = scene.proxies();
        let pair = OverlappingPair::new(&proxies[0], &proxies[1]);
        let mut pool = RecordingPool::new();
        {
            let info = CollisionCallbackInfo::new(&pair, &mut pool).unwrap();
            assert!(info.contact_manifold_elements().is_none());
            assert_eq!(info.manifold_count(), 0);
            assert_eq!(info.body1.handle(), BodyHandle(1));
            assert_eq!(info.body2.handle(), BodyHandle(2));
        }
        assert!(pool.allocated.is_empty());
        assert!(pool.released.is_empty());
    }

    #[test]
    fn list_reverses_detection_order() {
        let scene = Scene::new();
        let proxies = scene.proxies();
        let mut pair = OverlappingPair::new(&proxies[0], &proxies[1]);
        for depth in [0.1, 0.2, 0.3] {
            pair.add_contact_manifold(manifold_with_depth(depth, 1)).unwrap();
        }
        let mut pool = RecordingPool::new();
        {
            let info = CollisionCallbackInfo::new(&pair, &mut pool).unwrap();
            let depths: Vec<f32> = info
                .manifolds()
                .map(|m| m.contact_point(0).penetration_depth)
                .collect();
            assert_eq!(depths, vec![0.3, 0.2, 0.1]);

            let head = info.contact_manifold_elements().unwrap();
            let second = head.next().unwrap();
            assert!(ptr::eq(
                second.contact_manifold(),
                pair.contact_manifold_set().head().unwrap().next().unwrap()
            ));
            assert!(second.next().unwrap().next().is_none());
        }
        assert_eq!(pool.allocated.len(), 3);
        let mut allocated = pool.allocated.clone();
        let mut released = pool.released.clone();
        allocated.sort_unstable();
        released.sort_unstable();
        assert_eq!(allocated, released);
        assert_eq!(pool.outstanding_count(), 0);
    }

    #[test]
    fn report_contacts_releases_after_the_callback() {
        let scene = Scene::new();
        let proxies = scene.proxies();
        let mut pair = OverlappingPair::new(&proxies[0], &proxies[1]);
        pair.add_contact_manifold(manifold_with_depth(0.5, 2)).unwrap();
        pair.add_contact_manifold(manifold_with_depth(0.25, 3)).unwrap();

        let mut pool = BufferPool::new(1024, 4);
        let mut reported = Vec::new();
        let mut callback = |info: &CollisionCallbackInfo<'_, '_>| {
            reported.push((info.manifold_count(), info.contact_point_count()));
        };
        report_contacts(&pair, &mut pool, &mut callback).unwrap();
        assert_eq!(reported, vec![(2, 5)]);
        assert_eq!(pool.allocation_count(), 2);
        assert_eq!(pool.release_count(), 2);
    }

    #[test]
    fn manifolds_emptied_through_the_pair_are_never_reported() {
        let scene = Scene::new();
        let proxies = scene.proxies();
        let mut pair = OverlappingPair::new(&proxies[0], &proxies[1]);
        pair.add_contact_manifold(manifold_with_depth(0.1, 1)).unwrap();
        pair.add_contact_manifold(manifold_with_depth(0.2, 2)).unwrap();
        pair.contact_manifold_set_mut().update_manifolds(|manifold| {
            manifold.fast_remove_at(0);
        });
        assert_eq!(pair.contact_manifold_set().manifold_count(), 1);

        let mut pool = RecordingPool::new();
        {
            let info = CollisionCallbackInfo::new(&pair, &mut pool).unwrap();
            assert_eq!(info.manifold_count(), 1);
            assert!(info.manifolds().all(|m| !m.is_empty()));
            assert_eq!(info.contact_point_count(), 1);
        }
        assert_eq!(pool.allocated.len(), 1);
        assert_eq!(pool.released.len(), 1);
    }

    #[test]
    fn allocation_failure_releases_partial_list() {
        let scene = Scene::new();
        let proxies = scene.proxies();
        let mut pair = OverlappingPair::new(&proxies[0], &proxies[1]);
        for depth in [0.1, 0.2, 0.3, 0.4] {
            pair.add_contact_manifold(manifold_with_depth(depth, 1)).unwrap();
        }
        let mut pool = RecordingPool::failing_after(2);
        let result = CollisionCallbackInfo::new(&pair, &mut pool);
        assert!(matches!(result, Err(CollisionError::AllocationFailed { .. })));
        drop(result);
        assert_eq!(pool.allocated.len(), 2);
        assert_eq!(pool.released.len(), 2);
        assert_eq!(pool.outstanding_count(), 0);
    }
}
