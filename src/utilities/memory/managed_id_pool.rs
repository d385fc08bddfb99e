//! Manages a pool of identifier values.
//!
//! Grabbing an id from the pool picks a number that has been picked and returned before,
//! or if none of those are available, the minimum value greater than any existing id.

/// Stack-based id pool with O(1) take and return. Returned ids are recycled first.
#[derive(Debug)]
pub struct ManagedIdPool {
    /// The next id to hand out if no recycled ids are available.
    next_index: usize,
    /// Stack of available (recycled) ids.
    available_ids: Vec<usize>,
}

impl ManagedIdPool {
    /// Creates a new pool with room for `initial_capacity` recycled ids.
    #[inline(always)]
    pub fn new(initial_capacity: usize) -> Self {
        ManagedIdPool {
            next_index: 0,
            available_ids: Vec::with_capacity(initial_capacity),
        }
    }

    /// Takes an id from the pool.
    ///
    /// Returns a recycled id if available, otherwise allocates a new one.
    #[inline(always)]
    pub fn take(&mut self) -> usize {
        match self.available_ids.pop() {
            Some(id) => id,
            None => {
                let id = self.next_index;
                self.next_index += 1;
                id
            }
        }
    }

    /// Returns an id to the pool for recycling.
    #[inline(always)]
    pub fn return_id(&mut self, id: usize) {
        debug_assert!(id < self.next_index, "Id was never handed out by this pool.");
        self.available_ids.push(id);
    }

    /// Resets the pool, forgetting all claimed and recycled ids.
    #[inline(always)]
    pub fn clear(&mut self) {
        self.next_index = 0;
        self.available_ids.clear();
    }

    /// Gets the number of ids ever claimed, i.e. one past the highest possibly claimed id.
    #[inline(always)]
    pub fn claimed_id_count(&self) -> usize {
        self.next_index
    }

    /// Gets the number of previously returned ids waiting in the pool.
    #[inline(always)]
    pub fn available_id_count(&self) -> usize {
        self.available_ids.len()
    }
}
