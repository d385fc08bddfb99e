//! Trait for types that are capable of rapidly serving requests for allocation and
//! deallocation of unmanaged memory.

use std::alloc::Layout;
use std::ptr::NonNull;

use crate::error::Result;

/// Defines a type that hands out raw, unconstructed memory blocks and takes them back for reuse.
///
/// Pools never run constructors or destructors. Callers write values into the blocks they take
/// and drop them in place before handing the blocks back. Implementations are not synchronized;
/// give each concurrent worker its own pool.
pub trait IUnmanagedMemoryPool {
    /// Takes a block large enough and aligned enough for `layout`.
    fn allocate(&mut self, layout: Layout) -> Result<NonNull<u8>>;

    /// Returns a block to the pool.
    ///
    /// # Safety
    /// `block` must have been returned by `allocate` on this same pool with the same `layout`,
    /// must not have been released already, and must not be used afterwards.
    unsafe fn release(&mut self, block: NonNull<u8>, layout: Layout);

    /// Gets the number of blocks handed out since creation.
    fn allocation_count(&self) -> u64;

    /// Gets the number of blocks returned since creation.
    fn release_count(&self) -> u64;

    /// Gets the number of blocks currently handed out.
    #[inline]
    fn outstanding_count(&self) -> u64 {
        self.allocation_count() - self.release_count()
    }
}
