//! Linker-section-based PCIe driver registration.
//!
//! Driver crates use [`pci_driver_entry!`] to place a static
//! [`PciDriverEntry`] into the `.hadron_pci_drivers` linker section. The bus
//! framework iterates that section during enumeration, offers each device to
//! every entry's `probe`, and drives the accepted ones through
//! `startup` → `shutdown` → `release`. There is no runtime registry.

use crate::bus::{DriverClaim, PcieDevice};
use crate::driver::DriverInfo;
use crate::error::DriverError;
use crate::pci::{PciDeviceId, PciDeviceInfo};
use crate::services::KernelServices;

/// Lifecycle callbacks of a PCIe driver.
///
/// The framework serializes calls for one device: `probe`, then `startup`,
/// then eventually `shutdown` and `release`.
#[derive(Clone, Copy)]
pub struct PciDriverOps {
    /// Offers a device; returns a claim if the driver takes it.
    pub probe: fn(&PciDeviceInfo) -> Option<DriverClaim>,
    /// Brings a claimed device up. On error the driver has already undone
    /// everything it did.
    pub startup: fn(&dyn PcieDevice, &'static dyn KernelServices) -> Result<(), DriverError>,
    /// Quiesces a device. Best-effort and infallible.
    pub shutdown: fn(&dyn PcieDevice),
    /// Gives up the claim taken in `probe`.
    pub release: fn(DriverClaim) -> Result<(), DriverError>,
}

/// PCI driver entry placed in the `.hadron_pci_drivers` linker section.
#[repr(C)]
pub struct PciDriverEntry {
    /// Driver metadata (name and description are used for logging).
    pub info: DriverInfo,
    /// Device IDs this driver supports.
    pub id_table: &'static [PciDeviceId],
    /// Lifecycle callbacks.
    pub ops: PciDriverOps,
}

impl PciDriverEntry {
    /// Returns `true` if the entry's ID table lists the device.
    ///
    /// The framework uses this to skip obviously foreign drivers; `probe`
    /// still has the final say.
    #[must_use]
    pub fn matches(&self, info: &PciDeviceInfo) -> bool {
        PciDeviceId::table_matches(self.id_table, info)
    }
}

// SAFETY: The entry only holds 'static data and function pointers, all of which
// are safe to share across threads.
unsafe impl Sync for PciDriverEntry {}

/// Register a PCI driver entry in the `.hadron_pci_drivers` linker section.
///
/// The section attribute is only applied on kernel targets; host builds keep
/// a plain static so the entry can be inspected in tests.
///
/// # Example
///
/// ```ignore
/// hadron_driver_api::pci_driver_entry!(MY_DRIVER, PciDriverEntry {
///     info: MY_INFO,
///     id_table: &[PciDeviceId::new(0x1234, 0x5678)],
///     ops: PciDriverOps { probe, startup, shutdown, release },
/// });
/// ```
#[macro_export]
macro_rules! pci_driver_entry {
    ($(#[$attr:meta])* $vis:vis $name:ident, $entry:expr) => {
        $(#[$attr])*
        #[used]
        #[cfg_attr(target_os = "none", unsafe(link_section = ".hadron_pci_drivers"))]
        $vis static $name: $crate::registration::PciDriverEntry = $entry;
    };
}
