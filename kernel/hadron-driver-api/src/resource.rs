//! Hardware resource types representing exclusive claims on MMIO windows.

use hadron_core::addr::{PhysAddr, VirtAddr};

/// A physical MMIO range mapped into a kernel address space.
///
/// Returned by [`AddressSpace::alloc_physical`](crate::mm::AddressSpace::alloc_physical)
/// and handed back to [`AddressSpace::free_region`](crate::mm::AddressSpace::free_region)
/// to tear the mapping down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MmioRegion {
    phys_base: PhysAddr,
    virt_base: VirtAddr,
    size: usize,
}

impl MmioRegion {
    /// Creates a new MMIO region descriptor.
    ///
    /// # Safety
    ///
    /// The caller must ensure that `virt_base` maps `phys_base` for `size`
    /// bytes and that the mapping stays valid while the region is in use.
    #[must_use]
    pub const unsafe fn new(phys_base: PhysAddr, virt_base: VirtAddr, size: usize) -> Self {
        Self {
            phys_base,
            virt_base,
            size,
        }
    }

    /// Returns the physical base address.
    #[must_use]
    pub const fn phys_base(&self) -> PhysAddr {
        self.phys_base
    }

    /// Returns the virtual base address.
    #[must_use]
    pub const fn virt_base(&self) -> VirtAddr {
        self.virt_base
    }

    /// Returns the size of the region in bytes.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region() -> MmioRegion {
        // SAFETY: test-only, never dereferenced.
        unsafe {
            MmioRegion::new(
                PhysAddr::new(0xFED0_8000),
                VirtAddr::new_truncate(0x4000_0000),
                4096,
            )
        }
    }

    #[test]
    fn mmio_region_basics() {
        let region = region();
        assert_eq!(region.phys_base(), PhysAddr::new(0xFED0_8000));
        assert_eq!(region.virt_base().as_usize(), 0x4000_0000);
        assert_eq!(region.size(), 4096);
    }
}
