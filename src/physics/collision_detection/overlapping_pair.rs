use crate::error::Result;
use crate::physics::collidables::collidable::ProxyShape;

use super::contact_manifold::ContactManifold;
use super::contact_manifold_set::ContactManifoldSet;

/// Two proxy shapes whose bounds overlap, plus the contact manifolds found between them.
pub struct OverlappingPair<'a> {
    shape1: &'a ProxyShape<'a>,
    shape2: &'a ProxyShape<'a>,
    contact_manifold_set: ContactManifoldSet,
}

impl<'a> OverlappingPair<'a> {
    pub fn new(shape1: &'a ProxyShape<'a>, shape2: &'a ProxyShape<'a>) -> Self {
        Self {
            shape1,
            shape2,
            contact_manifold_set: ContactManifoldSet::new(),
        }
    }

    #[inline(always)]
    pub fn shape1(&self) -> &'a ProxyShape<'a> {
        self.shape1
    }

    #[inline(always)]
    pub fn shape2(&self) -> &'a ProxyShape<'a> {
        self.shape2
    }

    #[inline(always)]
    pub fn contact_manifold_set(&self) -> &ContactManifoldSet {
        &self.contact_manifold_set
    }

    #[inline(always)]
    pub fn contact_manifold_set_mut(&mut self) -> &mut ContactManifoldSet {
        &mut self.contact_manifold_set
    }

    /// Records a manifold found by the narrow phase. Manifolds without contacts are rejected.
    pub fn add_contact_manifold(&mut self, manifold: ContactManifold) -> Result<()> {
        self.contact_manifold_set.add_manifold(manifold)
    }

    /// Forgets every manifold, typically before the next narrow phase run.
    pub fn clear_contact_manifolds(&mut self) {
        self.contact_manifold_set.clear();
    }
}
