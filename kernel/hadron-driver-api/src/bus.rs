//! PCIe bus framework contract.
//!
//! The bus driver owns enumeration, BAR assignment and interrupt routing. A
//! function driver only sees its own device through [`PcieDevice`], and only
//! between a successful probe and the matching release.

use core::num::NonZeroU64;

use hadron_core::kwarn;

use crate::error::DriverError;
use crate::pci::{PciBar, PciDeviceInfo};

/// Interrupt delivery mode of a PCIe function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrqMode {
    /// No interrupts; all vectors masked and handlers dropped.
    Disabled,
    /// Legacy INTx line, shared, exactly one vector.
    Legacy,
}

/// What the interrupt dispatcher should do after a handler returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrqHandlerResult {
    /// The handler did nothing; leave the vector as it is.
    NoAction,
}

/// Interrupt handler for a PCIe vector.
///
/// Runs in interrupt context: must not block, allocate, or take locks held by
/// lifecycle code.
pub type PcieIrqHandler = fn(&PciDeviceInfo, u32) -> IrqHandlerResult;

/// Opaque token proving a driver claimed a device.
///
/// Minted by the driver in `probe`, stored by the bus framework alongside the
/// device, and handed back on every later lifecycle call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverClaim(NonZeroU64);

impl DriverClaim {
    /// Creates a claim carrying the driver-chosen `cookie`.
    #[must_use]
    pub const fn new(cookie: NonZeroU64) -> Self {
        Self(cookie)
    }

    /// Returns the driver-chosen cookie.
    #[must_use]
    pub const fn cookie(self) -> NonZeroU64 {
        self.0
    }
}

/// A claimed PCIe function, as exposed by the bus framework.
pub trait PcieDevice {
    /// Identification of the function.
    fn info(&self) -> &PciDeviceInfo;

    /// The claim the framework recorded when the driver accepted the device.
    fn claim(&self) -> Option<DriverClaim>;

    /// Returns the decoded BAR at `index`, or `None` past the last BAR slot.
    fn bar(&self, index: usize) -> Option<PciBar>;

    /// Switches the function to `mode` with `vectors` requested vectors.
    fn set_irq_mode(&self, mode: IrqMode, vectors: u32) -> Result<(), DriverError>;

    /// Disables interrupts and drops any registered handlers.
    ///
    /// Safe to call when no interrupt mode was ever configured. A failure is
    /// logged and otherwise ignored.
    fn set_irq_mode_disabled(&self) {
        if let Err(err) = self.set_irq_mode(IrqMode::Disabled, 0) {
            kwarn!(
                "pcie: {}: failed to disable interrupts: {err}",
                self.info().address
            );
        }
    }

    /// Registers `handler` for vector `irq_id`. The vector starts masked.
    fn register_irq_handler(&self, irq_id: u32, handler: PcieIrqHandler) -> Result<(), DriverError>;

    /// Unmasks vector `irq_id`.
    fn unmask_irq(&self, irq_id: u32) -> Result<(), DriverError>;

    /// Enables or disables MMIO decoding (the Memory Space bit in COMMAND).
    fn enable_mmio(&self, enabled: bool);
}
