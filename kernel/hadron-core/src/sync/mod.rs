//! Synchronization primitives for the kernel.
//!
//! [`SpinLock`] is const-constructable, so it can guard `static` driver state
//! before any allocator or scheduler is available.

mod spinlock;

pub use spinlock::{SpinLock, SpinLockGuard};
