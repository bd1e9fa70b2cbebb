//! Typed virtual and physical address wrappers.
//!
//! [`VirtAddr`] and [`PhysAddr`] keep the two address spaces apart at the type
//! level. Device drivers mostly meet them at the mapping boundary: a BAR gives
//! a bus address that must fit the physical address width, and the address
//! space hands back a virtual window.

use core::fmt;

/// Physical address space mask: bits 0..51.
const PHYS_ADDR_MASK: u64 = 0x000F_FFFF_FFFF_FFFF;

/// A 64-bit physical address (at most 52 significant bits).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct PhysAddr(u64);

impl PhysAddr {
    /// Creates a new `PhysAddr`.
    ///
    /// Panics in debug mode if bits above 52 are set; release builds mask them.
    #[inline]
    pub const fn new(addr: u64) -> Self {
        debug_assert!(
            addr & !PHYS_ADDR_MASK == 0,
            "PhysAddr::new: address exceeds 52-bit physical address space"
        );
        Self(addr & PHYS_ADDR_MASK)
    }

    /// Creates a new `PhysAddr`, returning `None` if the address does not fit
    /// in the physical address width.
    #[inline]
    pub const fn try_new(addr: u64) -> Option<Self> {
        if addr & !PHYS_ADDR_MASK == 0 {
            Some(Self(addr))
        } else {
            None
        }
    }

    /// Returns `true` if the address is aligned to `align` (a power of two).
    #[inline]
    pub const fn is_aligned(self, align: u64) -> bool {
        debug_assert!(align.is_power_of_two(), "alignment must be a power of two");
        self.0 & (align - 1) == 0
    }
}

/// A virtual address inside some address space.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct VirtAddr(u64);

impl VirtAddr {
    /// Creates a new `VirtAddr`, sign-extending from bit 47 to canonical form.
    #[inline]
    pub const fn new_truncate(addr: u64) -> Self {
        Self(((addr << 16) as i64 >> 16) as u64)
    }

    /// Returns the address as a `usize` (pointer width).
    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// Rounds `size` up to a multiple of `align` (a power of two).
///
/// Returns `None` if the rounded value does not fit in a `u64`.
#[inline]
pub const fn align_up_checked(size: u64, align: u64) -> Option<u64> {
    debug_assert!(align.is_power_of_two(), "alignment must be a power of two");
    match size.checked_add(align - 1) {
        Some(bumped) => Some(bumped & !(align - 1)),
        None => None,
    }
}

impl fmt::Debug for PhysAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PhysAddr({:#x})", self.0)
    }
}

impl fmt::Display for PhysAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl fmt::LowerHex for PhysAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl fmt::Debug for VirtAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VirtAddr({:#x})", self.0)
    }
}

impl fmt::Display for VirtAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl fmt::LowerHex for VirtAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}
