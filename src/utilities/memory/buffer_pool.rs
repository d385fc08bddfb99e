use std::alloc::{self, Layout};
#[cfg(debug_assertions)]
use std::collections::HashSet;
use std::ptr::NonNull;

use crate::config::CollisionConfig;
use crate::error::{CollisionError, Result};
use crate::utilities::memory::managed_id_pool::ManagedIdPool;
use crate::utilities::memory::unmanaged_mempool::IUnmanagedMemoryPool;

/// The highest size class exponent. The largest suballocation is 2^MAXIMUM_SPAN_SIZE_POWER bytes.
pub const MAXIMUM_SPAN_SIZE_POWER: usize = 30;

/// Serves suballocations of exactly 2^power bytes carved out of larger blocks.
struct PowerPool {
    blocks: Vec<NonNull<u8>>,
    slots: ManagedIdPool,
    #[cfg(debug_assertions)]
    outstanding_ids: HashSet<usize>,
    suballocations_per_block_shift: usize,
    suballocations_per_block_mask: usize,
    power: usize,
    suballocation_size: usize,
    block_size: usize,
}

impl PowerPool {
    const BLOCK_ALIGNMENT: usize = 128;

    fn new(power: usize, minimum_block_size: usize, expected_pooled_count: usize) -> Self {
        let suballocation_size = 1 << power;
        let block_size = suballocation_size.max(minimum_block_size);
        let suballocations_per_block = block_size / suballocation_size;
        let suballocations_per_block_shift = suballocations_per_block.trailing_zeros() as usize;
        let suballocations_per_block_mask = (1 << suballocations_per_block_shift) - 1;

        Self {
            blocks: Vec::new(),
            slots: ManagedIdPool::new(expected_pooled_count),
            #[cfg(debug_assertions)]
            outstanding_ids: HashSet::new(),
            suballocations_per_block_shift,
            suballocations_per_block_mask,
            power,
            suballocation_size,
            block_size,
        }
    }

    #[inline(always)]
    fn block_layout(&self) -> Result<Layout> {
        Layout::from_size_align(self.block_size, Self::BLOCK_ALIGNMENT).map_err(|_| {
            CollisionError::AllocationFailed {
                size: self.block_size,
                align: Self::BLOCK_ALIGNMENT,
            }
        })
    }

    fn allocate_block(&mut self) -> Result<()> {
        let layout = self.block_layout()?;
        // Safety: block_size is never zero.
        let ptr = unsafe { alloc::alloc(layout) };
        let block = NonNull::new(ptr).ok_or(CollisionError::AllocationFailed {
            size: self.block_size,
            align: Self::BLOCK_ALIGNMENT,
        })?;
        self.blocks.push(block);
        log::debug!(
            "Allocated block {} of {} bytes for {}-byte suballocations",
            self.blocks.len() - 1,
            self.block_size,
            self.suballocation_size
        );
        Ok(())
    }

    fn take(&mut self) -> Result<NonNull<u8>> {
        let slot = self.slots.take();
        let block_index = slot >> self.suballocations_per_block_shift;
        // Slots are handed out densely, so at most one new block is ever needed.
        if block_index >= self.blocks.len() {
            if let Err(error) = self.allocate_block() {
                self.slots.return_id(slot);
                return Err(error);
            }
        }
        debug_assert!(block_index < self.blocks.len());
        #[cfg(debug_assertions)]
        {
            let inserted = self.outstanding_ids.insert(slot);
            debug_assert!(inserted, "A slot taken from the pool must not already be outstanding.");
        }
        let index_in_block = slot & self.suballocations_per_block_mask;
        // Safety: the offset stays within the block.
        let ptr = unsafe {
            self.blocks[block_index]
                .as_ptr()
                .add(index_in_block * self.suballocation_size)
        };
        // Safety: derived from a non-null block pointer.
        Ok(unsafe { NonNull::new_unchecked(ptr) })
    }

    /// Finds the slot a pointer was handed out from.
    fn slot_for_pointer(&self, ptr: NonNull<u8>) -> Option<usize> {
        let address = ptr.as_ptr() as usize;
        self.blocks
            .iter()
            .enumerate()
            .find_map(|(block_index, block)| {
                let start = block.as_ptr() as usize;
                if address < start || address >= start + self.block_size {
                    return None;
                }
                let offset = address - start;
                if offset % self.suballocation_size != 0 {
                    return None;
                }
                Some(
                    (block_index << self.suballocations_per_block_shift)
                        + offset / self.suballocation_size,
                )
            })
    }

    fn return_block(&mut self, ptr: NonNull<u8>) {
        let slot = match self.slot_for_pointer(ptr) {
            Some(slot) => slot,
            None => panic!(
                "Released block {:p} was not taken from the 2^{} byte pool.",
                ptr.as_ptr(),
                self.power
            ),
        };
        #[cfg(debug_assertions)]
        {
            assert!(
                self.outstanding_ids.remove(&slot),
                "Block {:p} was released more than once.",
                ptr.as_ptr()
            );
        }
        self.slots.return_id(slot);
    }

    fn allocated_byte_count(&self) -> u64 {
        self.blocks.len() as u64 * self.block_size as u64
    }

    fn clear(&mut self) {
        #[cfg(debug_assertions)]
        self.outstanding_ids.clear();
        if let Ok(layout) = self.block_layout() {
            for block in self.blocks.drain(..) {
                // Safety: every block was allocated with this layout.
                unsafe { alloc::dealloc(block.as_ptr(), layout) };
            }
        }
        self.slots.clear();
    }
}

/// Unmanaged memory pool that serves power-of-two sized blocks.
///
/// Memory is never moved; a block keeps its address until it is released. The pool is not
/// synchronized. Concurrent workers should each own a pool, see
/// [`WorkerBufferPools`](super::worker_buffer_pools::WorkerBufferPools).
pub struct BufferPool {
    pools: Vec<PowerPool>,
    allocation_count: u64,
    release_count: u64,
}

// Safety: the pool exclusively owns every block it allocated; moving it to another thread
// moves that ownership with it.
unsafe impl Send for BufferPool {}

impl BufferPool {
    /// Creates a new buffer pool.
    ///
    /// # Arguments
    ///
    /// * `minimum_block_allocation_size` - Minimum size of individual block allocations. Must be a power of 2.
    /// * `expected_pooled_resource_count` - Expected number of outstanding allocations per size class.
    pub fn new(minimum_block_allocation_size: usize, expected_pooled_resource_count: usize) -> Self {
        debug_assert!(
            minimum_block_allocation_size.is_power_of_two(),
            "Block allocation size must be a power of 2."
        );
        let pools = (0..=MAXIMUM_SPAN_SIZE_POWER)
            .map(|power| {
                PowerPool::new(
                    power,
                    minimum_block_allocation_size,
                    expected_pooled_resource_count,
                )
            })
            .collect();
        Self {
            pools,
            allocation_count: 0,
            release_count: 0,
        }
    }

    /// Creates a pool sized by the configuration.
    pub fn from_config(config: &CollisionConfig) -> Self {
        Self::new(
            config.minimum_block_allocation_size,
            config.expected_pooled_resource_count,
        )
    }

    /// Computes the size class serving a layout.
    #[inline]
    fn power_for(layout: Layout) -> Result<usize> {
        let failure = CollisionError::AllocationFailed {
            size: layout.size(),
            align: layout.align(),
        };
        if layout.align() > PowerPool::BLOCK_ALIGNMENT {
            return Err(failure);
        }
        // Suballocations are aligned to their own size up to the block alignment.
        let size = layout.size().max(layout.align()).max(1);
        let power = size
            .checked_next_power_of_two()
            .ok_or(failure.clone())?
            .trailing_zeros() as usize;
        if power > MAXIMUM_SPAN_SIZE_POWER {
            return Err(failure);
        }
        Ok(power)
    }

    /// Gets the total number of bytes allocated from the system by this pool, in use or not.
    pub fn total_allocated_byte_count(&self) -> u64 {
        self.pools.iter().map(PowerPool::allocated_byte_count).sum()
    }

    /// Returns every block to the system.
    ///
    /// # Safety
    /// Any outstanding block is invalidated silently; nothing may use one afterwards.
    pub unsafe fn clear(&mut self) {
        for pool in &mut self.pools {
            pool.clear();
        }
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::from_config(&CollisionConfig::default())
    }
}

impl IUnmanagedMemoryPool for BufferPool {
    #[inline]
    fn allocate(&mut self, layout: Layout) -> Result<NonNull<u8>> {
        let power = Self::power_for(layout)?;
        let block = self.pools[power].take()?;
        self.allocation_count += 1;
        Ok(block)
    }

    #[inline]
    unsafe fn release(&mut self, block: NonNull<u8>, layout: Layout) {
        let power = match Self::power_for(layout) {
            Ok(power) => power,
            Err(_) => panic!("Released layout {:?} could never have been allocated.", layout),
        };
        self.pools[power].return_block(block);
        self.release_count += 1;
    }

    #[inline]
    fn allocation_count(&self) -> u64 {
        self.allocation_count
    }

    #[inline]
    fn release_count(&self) -> u64 {
        self.release_count
    }
}

impl Drop for BufferPool {
    fn drop(&mut self) {
        let outstanding = self.outstanding_count();
        if outstanding > 0 {
            log::warn!("Buffer pool dropped with {} outstanding blocks", outstanding);
        }
        // Safety: the pool is going away; outstanding blocks were leaked by their owners.
        unsafe { self.clear() };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_allocations_and_releases() {
        let mut pool = BufferPool::new(256, 4);
        let layout = Layout::new::<[u64; 3]>();
        let a = pool.allocate(layout).unwrap();
        let b = pool.allocate(layout).unwrap();
        assert_ne!(a, b);
        assert_eq!(pool.allocation_count(), 2);
        assert_eq!(pool.outstanding_count(), 2);
        unsafe {
            pool.release(a, layout);
            pool.release(b, layout);
        }
        assert_eq!(pool.release_count(), 2);
        assert_eq!(pool.outstanding_count(), 0);
    }

    #[test]
    fn released_blocks_are_reused() {
        let mut pool = BufferPool::new(256, 4);
        let layout = Layout::new::<u32>();
        let first = pool.allocate(layout).unwrap();
        unsafe { pool.release(first, layout) };
        let second = pool.allocate(layout).unwrap();
        assert_eq!(first, second);
        unsafe { pool.release(second, layout) };
    }

    #[test]
    fn grows_by_whole_blocks() {
        let mut pool = BufferPool::new(64, 4);
        let layout = Layout::from_size_align(32, 8).unwrap();
        let blocks: Vec<_> = (0..5).map(|_| pool.allocate(layout).unwrap()).collect();
        assert_eq!(pool.total_allocated_byte_count(), 3 * 64);
        for block in &blocks {
            assert_eq!(block.as_ptr() as usize % 32, 0);
        }
        for block in blocks {
            unsafe { pool.release(block, layout) };
        }
        assert_eq!(pool.outstanding_count(), 0);
    }

    #[test]
    fn blocks_respect_alignment() {
        #[repr(align(64))]
        struct Aligned {
            _value: u8,
        }
        let mut pool = BufferPool::new(1024, 4);
        let layout = Layout::new::<Aligned>();
        let blocks: Vec<_> = (0..4).map(|_| pool.allocate(layout).unwrap()).collect();
        for block in blocks {
            assert_eq!(block.as_ptr() as usize % 64, 0);
            unsafe { pool.release(block, layout) };
        }
    }

    #[test]
    fn rejects_oversized_alignment() {
        let mut pool = BufferPool::new(1024, 4);
        let layout = Layout::from_size_align(8, 256).unwrap();
        assert_eq!(
            pool.allocate(layout),
            Err(CollisionError::AllocationFailed { size: 8, align: 256 })
        );
        assert_eq!(pool.allocation_count(), 0);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "released more than once")]
    fn double_release_is_caught() {
        let mut pool = BufferPool::new(256, 4);
        let layout = Layout::new::<u64>();
        let block = pool.allocate(layout).unwrap();
        unsafe {
            pool.release(block, layout);
            pool.release(block, layout);
        }
    }
}
