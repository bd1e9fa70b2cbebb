//! Intel PCH thermal sensor driver.
//!
//! Binds to the thermal sensor function of 5- and 9-series Platform
//! Controller Hubs (`8086:3a32`, `8086:9ca4`). Startup maps the sensor's
//! register window (BAR 0), turns the sensor on, caps the catastrophic trip
//! threshold and arms the hardware power-off on a catastrophic trip. The
//! legacy interrupt is registered and unmasked but only logged.
//!
//! Only one device is driven at a time. The registered entry points share a
//! single [`PchThermal`] behind a [`SpinLock`]; tests build their own
//! instances.

pub mod regs;

#[cfg(test)]
mod fake;

use core::num::NonZeroU64;
use core::ops::{Deref, DerefMut};

use hadron_core::addr::{PhysAddr, align_up_checked};
use hadron_core::config::PAGE_SIZE;
use hadron_core::sync::SpinLock;
use hadron_core::{kdebug, kerr, kinfo, ktrace, kwarn};
use hadron_driver_api::{
    AddressSpace, DriverClaim, DriverError, DriverInfo, DriverType, IrqHandlerResult, IrqMode,
    KernelServices, MapFlags, MmioRegion, PciDeviceId, PciDeviceInfo, PciDriverEntry,
    PciDriverOps, PcieDevice,
};

use self::regs::{PchThermalRegs, Tsc, Tsel, decode_temp, encode_temp, saturate_temp};

// ---------------------------------------------------------------------------
// PCI ID table
// ---------------------------------------------------------------------------

const INTEL_VID: u16 = 0x8086;

/// Supported PCH thermal sensor functions.
static ID_TABLE: [PciDeviceId; 2] = [
    PciDeviceId::new(INTEL_VID, 0x3a32),
    PciDeviceId::new(INTEL_VID, 0x9ca4),
];

/// Driver metadata.
pub const DRIVER_INFO: DriverInfo = DriverInfo {
    name: "intel-pch-thermal",
    driver_type: DriverType::Thermal,
    description: "Intel PCH Thermal Sensors",
};

/// BAR holding the register window (TBAR).
const REGS_BAR: usize = 0;
/// The only interrupt vector the sensor raises.
const IRQ_ID: u32 = 0;
/// Label of the register mapping in the kernel address space.
const MAPPING_NAME: &str = "pch_therm";

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tunables applied at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PchThermalConfig {
    /// Highest catastrophic trip threshold left in place, in °C. A firmware
    /// threshold at or above this is lowered to it. Saturated to the range
    /// the `ctt` register can encode (-50..=205 °C).
    ///
    /// The PCH should stay clear of 120 °C; the sensor may read ~2 °C low
    /// because of its placement and is only ±5 °C accurate between 90 °C
    /// and 120 °C.
    pub ctt_clamp_celsius: i16,
}

impl PchThermalConfig {
    /// Configuration used by the registered driver.
    pub const DEFAULT: Self = Self {
        ctt_clamp_celsius: 113,
    };
}

impl Default for PchThermalConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// ---------------------------------------------------------------------------
// Driver state
// ---------------------------------------------------------------------------

/// Registers of a started device and the mapping that backs them.
struct Mapping {
    region: MmioRegion,
    regs: PchThermalRegs,
}

/// Driver context for one PCH thermal sensor.
pub struct PchThermal {
    config: PchThermalConfig,
    device_claimed: bool,
    /// Bumped on every successful probe and minted into the claim.
    generation: u64,
    aspace: Option<&'static dyn AddressSpace>,
    mapping: Option<Mapping>,
}

impl PchThermal {
    /// Creates an idle context with the default configuration.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_config(PchThermalConfig::DEFAULT)
    }

    /// Creates an idle context with `config`.
    ///
    /// A clamp outside the encodable range is saturated to its nearest end,
    /// so the clamp can only ever lower a threshold.
    #[must_use]
    pub const fn with_config(config: PchThermalConfig) -> Self {
        Self {
            config: PchThermalConfig {
                ctt_clamp_celsius: saturate_temp(config.ctt_clamp_celsius),
            },
            device_claimed: false,
            generation: 0,
            aspace: None,
            mapping: None,
        }
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> PchThermalConfig {
        self.config
    }

    /// Returns `true` between a successful [`probe`](Self::probe) and the
    /// matching [`release`](Self::release).
    #[must_use]
    pub const fn is_claimed(&self) -> bool {
        self.device_claimed
    }

    /// Returns `true` while the register window is mapped.
    #[must_use]
    pub const fn is_started(&self) -> bool {
        self.mapping.is_some()
    }

    /// Returns `true` while an address space is recorded for the mapping.
    #[must_use]
    pub const fn has_address_space(&self) -> bool {
        self.aspace.is_some()
    }

    /// Current sensor reading in °C, or `None` when not started.
    #[must_use]
    pub fn temperature(&self) -> Option<i16> {
        self.mapping.as_ref().map(|m| decode_temp(m.regs.temp()))
    }

    /// Catastrophic trip threshold in °C, or `None` when not started.
    #[must_use]
    pub fn critical_threshold(&self) -> Option<i16> {
        self.mapping.as_ref().map(|m| decode_temp(m.regs.ctt()))
    }

    fn owns(&self, claim: DriverClaim) -> bool {
        self.device_claimed && claim.cookie().get() == self.generation
    }

    fn check_claim(&self, device: &dyn PcieDevice) -> Result<(), DriverError> {
        match device.claim() {
            Some(claim) if self.owns(claim) => Ok(()),
            _ => {
                kerr!(
                    "pch-thermal: {} is not claimed by this driver",
                    device.info().address
                );
                Err(DriverError::InvalidState)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Offers a device to the driver.
    ///
    /// Claims it if no device is claimed yet and the IDs are supported. Does
    /// not touch the hardware.
    pub fn probe(&mut self, info: &PciDeviceInfo) -> Option<DriverClaim> {
        if self.device_claimed || !PciDeviceId::table_matches(&ID_TABLE, info) {
            return None;
        }

        let cookie = NonZeroU64::MIN.saturating_add(self.generation);
        self.generation = cookie.get();
        self.device_claimed = true;
        kdebug!(
            "pch-thermal: claimed {} ({:04x}:{:04x})",
            info.address,
            info.vendor_id,
            info.device_id
        );
        Some(DriverClaim::new(cookie))
    }

    /// Brings up the claimed `device`.
    ///
    /// # Errors
    ///
    /// - [`DriverError::InvalidState`] if the device is already started or
    ///   its claim does not belong to this context. Nothing is touched.
    /// - [`DriverError::InvalidResource`] if BAR 0 is not an assigned memory
    ///   BAR.
    /// - [`DriverError::InvalidArgs`] if the BAR does not fit the physical
    ///   address width or its page-rounded size does not fit `usize`.
    /// - Any error from the bus framework or the address space, unchanged.
    ///
    /// On error the context is back to its pre-startup state, with
    /// interrupts disabled and nothing mapped.
    pub fn startup(
        &mut self,
        device: &dyn PcieDevice,
        kernel: &'static dyn KernelServices,
    ) -> Result<(), DriverError> {
        if self.mapping.is_some() {
            kerr!(
                "pch-thermal: startup of {} while already running",
                device.info().address
            );
            return Err(DriverError::InvalidState);
        }
        self.check_claim(device)?;

        let mut guard = StartupGuard::new(self, device);
        let aspace = kernel.kernel_address_space();
        guard.aspace = Some(aspace);

        let (bus_addr, bar_size) = device
            .bar(REGS_BAR)
            .and_then(|bar| bar.memory_window())
            .filter(|&(_, size)| size != 0)
            .ok_or_else(|| {
                kerr!("pch-thermal: BAR{REGS_BAR} is not an assigned memory BAR");
                DriverError::InvalidResource
            })?;

        device
            .set_irq_mode(IrqMode::Legacy, 1)
            .inspect_err(|err| kerr!("pch-thermal: failed to select legacy IRQ mode: {err}"))?;
        device
            .register_irq_handler(IRQ_ID, irq_handler)
            .inspect_err(|err| kerr!("pch-thermal: failed to register IRQ handler: {err}"))?;

        let (phys, size) = mapping_window(bus_addr, bar_size).inspect_err(|_| {
            kerr!("pch-thermal: BAR{REGS_BAR} {bus_addr:#x}+{bar_size:#x} is out of range");
        })?;
        let region = aspace
            .alloc_physical(MAPPING_NAME, phys, size, MapFlags::DEVICE_RW)
            .inspect_err(|err| kerr!("pch-thermal: failed to map registers at {phys}: {err}"))?;

        device.enable_mmio(true);

        // SAFETY: `region` maps BAR 0 uncached and spans at least one page,
        // which covers the whole block. `cleanup` drops this view before it
        // frees the region.
        let regs = unsafe { PchThermalRegs::new(region.virt_base()) };
        guard.mapping = Some(Mapping { region, regs });
        guard.configure_sensor();

        device
            .unmask_irq(IRQ_ID)
            .inspect_err(|err| kerr!("pch-thermal: failed to unmask IRQ: {err}"))?;

        guard.disarm();
        kinfo!(
            "pch-thermal: sensor enabled on {} (TBAR {phys}, {size:#x} bytes)",
            device.info().address
        );
        Ok(())
    }

    /// Quiesces `device`: interrupts off, sensor off, registers unmapped.
    ///
    /// Idempotent. A device this context does not own is left alone.
    pub fn shutdown(&mut self, device: &dyn PcieDevice) {
        if self.check_claim(device).is_err() {
            return;
        }
        self.cleanup(device);
        kinfo!("pch-thermal: {} shut down", device.info().address);
    }

    /// Gives up the claim returned by [`probe`](Self::probe).
    ///
    /// # Errors
    ///
    /// - [`DriverError::InvalidState`] if `claim` is not the current claim.
    /// - [`DriverError::Busy`] if the device has not been shut down.
    pub fn release(&mut self, claim: DriverClaim) -> Result<(), DriverError> {
        if !self.owns(claim) {
            kerr!("pch-thermal: release with a stale or foreign claim");
            return Err(DriverError::InvalidState);
        }
        if self.mapping.is_some() {
            kerr!("pch-thermal: release while registers are still mapped");
            return Err(DriverError::Busy);
        }
        self.device_claimed = false;
        kdebug!("pch-thermal: released");
        Ok(())
    }

    /// Enables the sensor, caps the trip threshold and arms power-off.
    fn configure_sensor(&self) {
        let Some(mapping) = &self.mapping else {
            return;
        };
        let regs = &mapping.regs;

        let tsel = regs.tsel();
        if tsel.contains(Tsel::PLDB) {
            kwarn!("pch-thermal: TSEL is locked, sensor enable may be ignored");
        }
        regs.set_tsel(tsel | Tsel::ETS);

        let clamp = self.config.ctt_clamp_celsius;
        let ctt = decode_temp(regs.ctt());
        if ctt >= clamp {
            regs.set_ctt(encode_temp(clamp));
            kinfo!("pch-thermal: catastrophic trip lowered from {ctt} C to {clamp} C");
        }

        let tsc = regs.tsc();
        if tsc.contains(Tsc::PLD) {
            kwarn!("pch-thermal: TSC is locked, power-off enable may be ignored");
        }
        regs.set_tsc(tsc | Tsc::CPDE);
    }

    /// Undoes whatever startup got done. Safe to run in any state.
    fn cleanup(&mut self, device: &dyn PcieDevice) {
        device.set_irq_mode_disabled();

        if let Some(Mapping { region, regs }) = self.mapping.take() {
            regs.set_tsel(regs.tsel().difference(Tsel::ETS));
            if let Some(aspace) = self.aspace {
                if let Err(err) = aspace.free_region(&region) {
                    kwarn!(
                        "pch-thermal: failed to unmap registers at {}: {err}",
                        region.phys_base()
                    );
                }
            }
        }

        self.aspace = None;
    }
}

impl Default for PchThermal {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs [`PchThermal::cleanup`] unless startup reached the end.
struct StartupGuard<'a> {
    driver: &'a mut PchThermal,
    device: &'a dyn PcieDevice,
    armed: bool,
}

impl<'a> StartupGuard<'a> {
    fn new(driver: &'a mut PchThermal, device: &'a dyn PcieDevice) -> Self {
        Self {
            driver,
            device,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Deref for StartupGuard<'_> {
    type Target = PchThermal;

    fn deref(&self) -> &PchThermal {
        self.driver
    }
}

impl DerefMut for StartupGuard<'_> {
    fn deref_mut(&mut self) -> &mut PchThermal {
        self.driver
    }
}

impl Drop for StartupGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.driver.cleanup(self.device);
        }
    }
}

/// Returns the physical base and page-rounded size of the register mapping.
fn mapping_window(bus_addr: u64, bar_size: u64) -> Result<(PhysAddr, usize), DriverError> {
    let phys = PhysAddr::try_new(bus_addr).ok_or(DriverError::InvalidArgs)?;
    let size = align_up_checked(bar_size, PAGE_SIZE)
        .and_then(|size| usize::try_from(size).ok())
        .ok_or(DriverError::InvalidArgs)?;
    Ok((phys, size))
}

/// Legacy interrupt handler. The sensor's status bits are left untouched.
fn irq_handler(info: &PciDeviceInfo, irq_id: u32) -> IrqHandlerResult {
    ktrace!("pch-thermal: thermal interrupt on {} (vector {irq_id})", info.address);
    IrqHandlerResult::NoAction
}

// ---------------------------------------------------------------------------
// Driver registration
// ---------------------------------------------------------------------------

static DRIVER: SpinLock<PchThermal> = SpinLock::new(PchThermal::new());

fn driver_probe(info: &PciDeviceInfo) -> Option<DriverClaim> {
    DRIVER.lock().probe(info)
}

fn driver_startup(
    device: &dyn PcieDevice,
    kernel: &'static dyn KernelServices,
) -> Result<(), DriverError> {
    DRIVER.lock().startup(device, kernel)
}

fn driver_shutdown(device: &dyn PcieDevice) {
    DRIVER.lock().shutdown(device);
}

fn driver_release(claim: DriverClaim) -> Result<(), DriverError> {
    DRIVER.lock().release(claim)
}

hadron_driver_api::pci_driver_entry!(
    /// Registration of the PCH thermal sensor driver.
    pub PCH_THERMAL_DRIVER,
    PciDriverEntry {
        info: DRIVER_INFO,
        id_table: &ID_TABLE,
        ops: PciDriverOps {
            probe: driver_probe,
            startup: driver_startup,
            shutdown: driver_shutdown,
            release: driver_release,
        },
    }
);
