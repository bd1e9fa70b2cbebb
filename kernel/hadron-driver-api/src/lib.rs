//! Driver subsystem API traits and types for Hadron OS.
//!
//! This crate defines the contract between PCIe function drivers and the
//! kernel:
//!
//! - **Identification** -- [`PciDeviceInfo`], [`PciDeviceId`] and [`PciBar`].
//! - **Bus framework** -- [`PcieDevice`] for IRQ mode, handlers, unmasking and
//!   MMIO decode, plus the [`DriverClaim`] token that ties lifecycle calls to
//!   a probe.
//! - **Memory** -- [`AddressSpace`] and [`MmioRegion`] for register mappings.
//! - **Registration** -- [`PciDriverEntry`] and the `pci_driver_entry!` macro.

#![cfg_attr(not(test), no_std)]

pub mod bus;
pub mod driver;
pub mod error;
pub mod mm;
pub mod pci;
pub mod registration;
pub mod resource;
pub mod services;

// Re-export all public types at the crate root for ergonomic imports.
pub use bus::{DriverClaim, IrqHandlerResult, IrqMode, PcieDevice, PcieIrqHandler};
pub use driver::{DriverInfo, DriverType};
pub use error::DriverError;
pub use mm::{AddressSpace, MapFlags};
pub use pci::{PciAddress, PciBar, PciDeviceId, PciDeviceInfo};
pub use registration::{PciDriverEntry, PciDriverOps};
pub use resource::MmioRegion;
pub use services::KernelServices;
