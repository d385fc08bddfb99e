use crossbeam_utils::CachePadded;

use crate::config::CollisionConfig;
use crate::utilities::memory::buffer_pool::BufferPool;

/// Collection of pools used by worker threads.
///
/// Each worker gets its own pool so that parallel narrow phase work never shares an
/// unsynchronized allocator. Pools are cache padded to keep workers off each other's lines.
pub struct WorkerBufferPools {
    pools: Vec<CachePadded<BufferPool>>,
    default_block_capacity: usize,
    expected_pooled_resource_count: usize,
}

impl WorkerBufferPools {
    /// Creates a new set of worker pools.
    ///
    /// # Arguments
    ///
    /// * `initial_worker_count` - Initial number of workers to allocate space for.
    /// * `default_block_capacity` - Default block capacity in thread pools.
    pub fn new(initial_worker_count: usize, default_block_capacity: usize) -> Self {
        Self::with_expected_count(
            initial_worker_count,
            default_block_capacity,
            CollisionConfig::default().expected_pooled_resource_count,
        )
    }

    /// Creates one pool per worker sized by the configuration.
    pub fn from_config(worker_count: usize, config: &CollisionConfig) -> Self {
        Self::with_expected_count(
            worker_count,
            config.minimum_block_allocation_size,
            config.expected_pooled_resource_count,
        )
    }

    fn with_expected_count(
        worker_count: usize,
        default_block_capacity: usize,
        expected_pooled_resource_count: usize,
    ) -> Self {
        let pools = (0..worker_count)
            .map(|_| {
                CachePadded::new(BufferPool::new(
                    default_block_capacity,
                    expected_pooled_resource_count,
                ))
            })
            .collect();
        Self {
            pools,
            default_block_capacity,
            expected_pooled_resource_count,
        }
    }

    /// Gets the number of worker pools.
    #[inline]
    pub fn worker_count(&self) -> usize {
        self.pools.len()
    }

    /// Gets the pool associated with this worker.
    #[inline]
    pub fn get_pool(&mut self, worker_index: usize) -> &mut BufferPool {
        &mut self.pools[worker_index]
    }

    /// Gets every worker pool at once as disjoint mutable borrows, one per worker,
    /// ready to be moved into scoped worker threads.
    pub fn pools_mut(&mut self) -> impl Iterator<Item = &mut BufferPool> {
        self.pools.iter_mut().map(|pool| &mut **pool)
    }

    /// Makes sure at least `worker_count` pools exist.
    pub fn ensure_worker_count(&mut self, worker_count: usize) {
        while self.pools.len() < worker_count {
            self.pools.push(CachePadded::new(BufferPool::new(
                self.default_block_capacity,
                self.expected_pooled_resource_count,
            )));
        }
    }

    /// Gets the default block capacity for any newly created worker pools.
    pub fn default_block_capacity(&self) -> usize {
        self.default_block_capacity
    }

    /// Gets the total number of bytes allocated from the system by all worker pools.
    pub fn total_allocated_byte_count(&self) -> u64 {
        self.pools
            .iter()
            .map(|p| p.total_allocated_byte_count())
            .sum()
    }

    /// Clears all allocations from worker pools. Pools can still be used after being cleared.
    ///
    /// # Safety
    /// No outstanding block of any worker pool may be used afterwards.
    pub unsafe fn clear(&mut self) {
        for pool in &mut self.pools {
            pool.clear();
        }
    }
}
