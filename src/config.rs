//! Collision core configuration

use serde::{Deserialize, Serialize};

/// Default collision margin applied around convex meshes and boxes.
pub const OBJECT_MARGIN: f32 = 0.04;

/// Tunables shared by shapes, matrix routines and memory pools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionConfig {
    /// Margin added around convex meshes and boxes.
    pub object_margin: f32,

    /// Whether new convex mesh shapes walk edge adjacency for support queries.
    pub use_edge_information: bool,

    /// Relative tolerance under which a 3x3 matrix counts as singular.
    /// Compared against |det| / (|row x| * |row y| * |row z|).
    pub singular_determinant_tolerance: f32,

    /// Minimum size in bytes of a block allocated by a buffer pool.
    /// Must be a power of two.
    pub minimum_block_allocation_size: usize,

    /// Expected number of simultaneously outstanding allocations per size class.
    pub expected_pooled_resource_count: usize,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            object_margin: OBJECT_MARGIN,
            use_edge_information: false,
            singular_determinant_tolerance: 1e-6,
            minimum_block_allocation_size: 16384,
            expected_pooled_resource_count: 16,
        }
    }
}

impl CollisionConfig {
    /// Set the object margin
    pub fn with_object_margin(mut self, margin: f32) -> Self {
        self.object_margin = margin;
        self
    }

    /// Enable or disable hill climbing support queries for new mesh shapes
    pub fn with_edge_information(mut self, used: bool) -> Self {
        self.use_edge_information = used;
        self
    }

    /// Set the pool block size
    pub fn with_minimum_block_allocation_size(mut self, size: usize) -> Self {
        self.minimum_block_allocation_size = size;
        self
    }
}
