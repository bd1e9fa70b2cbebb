//! Kernel service contracts for drivers.
//!
//! Drivers use [`KernelServices`] to reach kernel infrastructure without
//! depending on the kernel crate directly.

use crate::mm::AddressSpace;

/// Trait providing kernel services to drivers.
///
/// Implemented by the kernel and passed to drivers at startup.
pub trait KernelServices: Send + Sync {
    /// Returns the kernel's own address space, used for device mappings.
    fn kernel_address_space(&self) -> &'static dyn AddressSpace;
}
