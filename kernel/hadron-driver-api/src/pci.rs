//! PCI bus types for device identification and driver matching.

/// PCI bus/device/function address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PciAddress {
    /// Bus number (0-255).
    pub bus: u8,
    /// Device number (0-31).
    pub device: u8,
    /// Function number (0-7).
    pub function: u8,
}

impl core::fmt::Display for PciAddress {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:02x}:{:02x}.{}", self.bus, self.device, self.function)
    }
}

/// PCI vendor/device pair a driver is willing to bind to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PciDeviceId {
    /// Vendor ID.
    pub vendor: u16,
    /// Device ID.
    pub device: u16,
}

impl PciDeviceId {
    /// Creates an ID entry matching a specific vendor/device pair.
    #[must_use]
    pub const fn new(vendor: u16, device: u16) -> Self {
        Self { vendor, device }
    }

    /// Returns `true` if this ID entry matches the given device.
    #[must_use]
    pub fn matches(&self, info: &PciDeviceInfo) -> bool {
        self.vendor == info.vendor_id && self.device == info.device_id
    }

    /// Returns `true` if any entry of `table` matches the given device.
    #[must_use]
    pub fn table_matches(table: &[Self], info: &PciDeviceInfo) -> bool {
        table.iter().any(|id| id.matches(info))
    }
}

/// Decoded PCI Base Address Register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PciBar {
    /// Memory-mapped BAR.
    Memory {
        /// Bus address assigned by firmware or the bus driver (0 = unassigned).
        base: u64,
        /// Size in bytes.
        size: u64,
        /// Whether the region is prefetchable.
        prefetchable: bool,
        /// Whether this is a 64-bit BAR (consumes two BAR slots).
        is_64bit: bool,
    },
    /// I/O port BAR.
    Io {
        /// Base I/O port address.
        base: u32,
        /// Size in bytes.
        size: u32,
    },
    /// BAR slot is unused or consumed by the upper half of a 64-bit BAR.
    Unused,
}

impl PciBar {
    /// Returns `(bus_addr, size)` for a memory BAR with an assigned address.
    #[must_use]
    pub const fn memory_window(&self) -> Option<(u64, u64)> {
        match *self {
            Self::Memory { base, size, .. } if base != 0 => Some((base, size)),
            _ => None,
        }
    }
}

/// Identification of a discovered PCI function, as seen during enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PciDeviceInfo {
    /// Bus/device/function address.
    pub address: PciAddress,
    /// Vendor ID.
    pub vendor_id: u16,
    /// Device ID.
    pub device_id: u16,
}

impl PciDeviceInfo {
    /// Creates info for a function at `address` with the given IDs.
    #[must_use]
    pub const fn new(address: PciAddress, vendor_id: u16, device_id: u16) -> Self {
        Self {
            address,
            vendor_id,
            device_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_device_info(vendor: u16, device: u16) -> PciDeviceInfo {
        PciDeviceInfo::new(
            PciAddress {
                bus: 0,
                device: 0x1f,
                function: 6,
            },
            vendor,
            device,
        )
    }

    #[test]
    fn exact_vendor_device_match() {
        let id = PciDeviceId::new(0x8086, 0x9ca4);
        assert!(id.matches(&make_device_info(0x8086, 0x9ca4)));
    }

    #[test]
    fn vendor_mismatch() {
        let id = PciDeviceId::new(0x8086, 0x9ca4);
        assert!(!id.matches(&make_device_info(0x1022, 0x9ca4)));
    }

    #[test]
    fn device_mismatch() {
        let id = PciDeviceId::new(0x8086, 0x9ca4);
        assert!(!id.matches(&make_device_info(0x8086, 0x2918)));
    }

    #[test]
    fn table_matches_any_entry() {
        let table = [PciDeviceId::new(0x8086, 0x3a32), PciDeviceId::new(0x8086, 0x9ca4)];
        assert!(PciDeviceId::table_matches(&table, &make_device_info(0x8086, 0x3a32)));
        assert!(PciDeviceId::table_matches(&table, &make_device_info(0x8086, 0x9ca4)));
        assert!(!PciDeviceId::table_matches(&table, &make_device_info(0x8086, 0x3a33)));
        assert!(!PciDeviceId::table_matches(&[], &make_device_info(0x8086, 0x3a32)));
    }

    #[test]
    fn memory_window_requires_assigned_address() {
        let bar = PciBar::Memory {
            base: 0xFED0_8000,
            size: 0x1000,
            prefetchable: false,
            is_64bit: true,
        };
        assert_eq!(bar.memory_window(), Some((0xFED0_8000, 0x1000)));

        let unassigned = PciBar::Memory {
            base: 0,
            size: 0x1000,
            prefetchable: false,
            is_64bit: false,
        };
        assert_eq!(unassigned.memory_window(), None);
        assert_eq!(PciBar::Io { base: 0x400, size: 0x20 }.memory_window(), None);
        assert_eq!(PciBar::Unused.memory_window(), None);
    }

    #[test]
    fn address_display() {
        let info = make_device_info(0x8086, 0x9ca4);
        assert_eq!(format!("{}", info.address), "00:1f.6");
    }
}
