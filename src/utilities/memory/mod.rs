//! Memory management utilities for collision processing.
//!
//! Pools here hand out raw blocks without constructing anything in them, and take the
//! blocks back once their contents have been dropped in place.

pub mod buffer_pool;
pub mod managed_id_pool;
pub mod unmanaged_mempool;
pub mod worker_buffer_pools;

pub use buffer_pool::BufferPool;
pub use managed_id_pool::ManagedIdPool;
pub use unmanaged_mempool::IUnmanagedMemoryPool;
pub use worker_buffer_pools::WorkerBufferPools;
