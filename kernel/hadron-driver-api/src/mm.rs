//! Address-space contract used by drivers to map device registers.

use hadron_core::addr::PhysAddr;

use crate::error::DriverError;
use crate::resource::MmioRegion;

bitflags::bitflags! {
    /// Attributes of a physical mapping.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MapFlags: u32 {
        /// Map readable.
        const PERM_READ       = 1 << 0;
        /// Map writable.
        const PERM_WRITE      = 1 << 1;
        /// Strongly-ordered, uncached device memory (MMIO).
        const UNCACHED_DEVICE = 1 << 3;
    }
}

impl MapFlags {
    /// Flags for a device register window: uncached, read/write, no execute.
    pub const DEVICE_RW: Self = Self::UNCACHED_DEVICE
        .union(Self::PERM_READ)
        .union(Self::PERM_WRITE);
}

impl core::fmt::Display for MapFlags {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        bitflags::parser::to_writer(self, f)
    }
}

/// A virtual address space that can map physical ranges.
///
/// Implemented by the kernel's VMM. Calls may block the caller per the VMM's
/// own contract; they are never made from interrupt context.
pub trait AddressSpace: Send + Sync {
    /// Maps `size` bytes of physical memory at `phys` and returns the region.
    ///
    /// `size` must be a multiple of the page size and `phys` page-aligned;
    /// `name` labels the mapping for diagnostics.
    fn alloc_physical(
        &self,
        name: &'static str,
        phys: PhysAddr,
        size: usize,
        flags: MapFlags,
    ) -> Result<MmioRegion, DriverError>;

    /// Unmaps a region previously returned by [`alloc_physical`](Self::alloc_physical).
    fn free_region(&self, region: &MmioRegion) -> Result<(), DriverError>;
}
