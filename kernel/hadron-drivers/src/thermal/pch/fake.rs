//! In-memory stand-ins for the PCIe bus framework and the kernel address
//! space, used by the driver's host tests.
//!
//! [`FakeAspace`] backs every mapping with one page of heap memory that plays
//! the part of the sensor's register window, so tests can seed register
//! values before startup and inspect what the driver wrote afterwards.

use core::cell::{Cell, UnsafeCell};
use std::sync::Mutex;

use hadron_core::addr::{PhysAddr, VirtAddr};
use hadron_core::config::PAGE_SIZE;
use hadron_driver_api::{
    AddressSpace, DriverClaim, DriverError, IrqHandlerResult, IrqMode, KernelServices, MapFlags,
    MmioRegion, PciAddress, PciBar, PciDeviceInfo, PcieDevice, PcieIrqHandler,
};

/// Bus address firmware assigned to the sensor's BAR 0.
pub const TBAR: u64 = 0xfed0_8000;

#[allow(clippy::cast_possible_truncation)]
const WINDOW_SIZE: usize = PAGE_SIZE as usize;

// ---------------------------------------------------------------------------
// Address space
// ---------------------------------------------------------------------------

#[repr(C, align(4096))]
struct Window(UnsafeCell<[u8; WINDOW_SIZE]>);

// SAFETY: each test owns its fake and drives it from a single thread.
unsafe impl Sync for Window {}

#[derive(Default)]
struct MapState {
    live: Option<(PhysAddr, usize)>,
    maps: usize,
    frees: usize,
    last_name: Option<&'static str>,
    last_flags: Option<MapFlags>,
    fail_alloc: Option<DriverError>,
    fail_free: Option<DriverError>,
}

/// Address space that maps at most one region onto a heap page.
pub struct FakeAspace {
    window: Window,
    state: Mutex<MapState>,
}

impl FakeAspace {
    /// Creates a fake that lives for the rest of the test binary.
    pub fn leak() -> &'static Self {
        Box::leak(Box::new(Self {
            window: Window(UnsafeCell::new([0; WINDOW_SIZE])),
            state: Mutex::new(MapState::default()),
        }))
    }

    fn base(&self) -> *mut u8 {
        self.window.0.get().cast()
    }

    pub fn peek_u8(&self, offset: usize) -> u8 {
        assert!(offset < WINDOW_SIZE);
        // SAFETY: in bounds of the window.
        unsafe { self.base().add(offset).read_volatile() }
    }

    pub fn peek_u16(&self, offset: usize) -> u16 {
        assert!(offset + 2 <= WINDOW_SIZE && offset % 2 == 0);
        // SAFETY: in bounds and aligned (the window is page-aligned).
        unsafe { self.base().add(offset).cast::<u16>().read_volatile() }
    }

    pub fn poke_u8(&self, offset: usize, value: u8) {
        assert!(offset < WINDOW_SIZE);
        // SAFETY: in bounds of the window.
        unsafe { self.base().add(offset).write_volatile(value) }
    }

    pub fn poke_u16(&self, offset: usize, value: u16) {
        assert!(offset + 2 <= WINDOW_SIZE && offset % 2 == 0);
        // SAFETY: in bounds and aligned (the window is page-aligned).
        unsafe { self.base().add(offset).cast::<u16>().write_volatile(value) }
    }

    /// Makes the next `alloc_physical` calls fail with `err`.
    pub fn fail_alloc_with(&self, err: DriverError) {
        self.state.lock().unwrap().fail_alloc = Some(err);
    }

    /// Makes the next `free_region` calls fail with `err`.
    pub fn fail_free_with(&self, err: DriverError) {
        self.state.lock().unwrap().fail_free = Some(err);
    }

    pub fn live_mapping(&self) -> Option<(PhysAddr, usize)> {
        self.state.lock().unwrap().live
    }

    pub fn map_count(&self) -> usize {
        self.state.lock().unwrap().maps
    }

    pub fn free_count(&self) -> usize {
        self.state.lock().unwrap().frees
    }

    pub fn last_name(&self) -> Option<&'static str> {
        self.state.lock().unwrap().last_name
    }

    pub fn last_flags(&self) -> Option<MapFlags> {
        self.state.lock().unwrap().last_flags
    }
}

impl AddressSpace for FakeAspace {
    fn alloc_physical(
        &self,
        name: &'static str,
        phys: PhysAddr,
        size: usize,
        flags: MapFlags,
    ) -> Result<MmioRegion, DriverError> {
        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.fail_alloc {
            return Err(err);
        }
        if state.live.is_some() {
            return Err(DriverError::Busy);
        }
        if size == 0 || size > WINDOW_SIZE || !phys.is_aligned(PAGE_SIZE) {
            return Err(DriverError::InvalidArgs);
        }

        state.live = Some((phys, size));
        state.maps += 1;
        state.last_name = Some(name);
        state.last_flags = Some(flags);

        let virt = VirtAddr::new_truncate(self.base() as u64);
        // SAFETY: the window is a live page that the fake never frees.
        Ok(unsafe { MmioRegion::new(phys, virt, size) })
    }

    fn free_region(&self, region: &MmioRegion) -> Result<(), DriverError> {
        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.fail_free {
            return Err(err);
        }
        if state.live != Some((region.phys_base(), region.size())) {
            return Err(DriverError::InvalidArgs);
        }
        state.live = None;
        state.frees += 1;
        Ok(())
    }
}

/// Kernel services handing out a [`FakeAspace`].
pub struct FakeKernel {
    aspace: &'static FakeAspace,
}

impl FakeKernel {
    pub fn leak(aspace: &'static FakeAspace) -> &'static Self {
        Box::leak(Box::new(Self { aspace }))
    }
}

impl KernelServices for FakeKernel {
    fn kernel_address_space(&self) -> &'static dyn AddressSpace {
        self.aspace
    }
}

// ---------------------------------------------------------------------------
// PCIe function
// ---------------------------------------------------------------------------

/// A PCIe function that records what the driver asked of the bus.
pub struct FakeDevice {
    info: PciDeviceInfo,
    bar0: PciBar,
    claim: Cell<Option<DriverClaim>>,
    irq_mode: Cell<IrqMode>,
    irq_vectors: Cell<u32>,
    handler: Cell<Option<PcieIrqHandler>>,
    unmasked: Cell<bool>,
    mmio: Cell<bool>,
    disables: Cell<u32>,
    fail_irq_mode: Cell<Option<DriverError>>,
    fail_disable: Cell<Option<DriverError>>,
    fail_register: Cell<Option<DriverError>>,
    fail_unmask: Cell<Option<DriverError>>,
}

impl FakeDevice {
    /// An Intel function at 00:1f.6 with a 4 KiB register BAR at [`TBAR`].
    pub fn new(device_id: u16) -> Self {
        Self::with_ids(0x8086, device_id)
    }

    pub fn with_ids(vendor_id: u16, device_id: u16) -> Self {
        let address = PciAddress {
            bus: 0,
            device: 0x1f,
            function: 6,
        };
        Self {
            info: PciDeviceInfo::new(address, vendor_id, device_id),
            bar0: PciBar::Memory {
                base: TBAR,
                size: 0x1000,
                prefetchable: false,
                is_64bit: true,
            },
            claim: Cell::new(None),
            irq_mode: Cell::new(IrqMode::Disabled),
            irq_vectors: Cell::new(0),
            handler: Cell::new(None),
            unmasked: Cell::new(false),
            mmio: Cell::new(false),
            disables: Cell::new(0),
            fail_irq_mode: Cell::new(None),
            fail_disable: Cell::new(None),
            fail_register: Cell::new(None),
            fail_unmask: Cell::new(None),
        }
    }

    #[must_use]
    pub fn with_bar(mut self, bar: PciBar) -> Self {
        self.bar0 = bar;
        self
    }

    /// Records the claim the way the framework does after a successful probe.
    pub fn attach(&self, claim: Option<DriverClaim>) {
        self.claim.set(claim);
    }

    pub fn fail_irq_mode_with(&self, err: DriverError) {
        self.fail_irq_mode.set(Some(err));
    }

    /// Makes switching interrupts off fail; the current mode stays active.
    pub fn fail_disable_with(&self, err: DriverError) {
        self.fail_disable.set(Some(err));
    }

    pub fn fail_register_with(&self, err: DriverError) {
        self.fail_register.set(Some(err));
    }

    pub fn fail_unmask_with(&self, err: DriverError) {
        self.fail_unmask.set(Some(err));
    }

    pub fn irq_mode(&self) -> (IrqMode, u32) {
        (self.irq_mode.get(), self.irq_vectors.get())
    }

    pub fn has_handler(&self) -> bool {
        self.handler.get().is_some()
    }

    pub fn is_unmasked(&self) -> bool {
        self.unmasked.get()
    }

    pub fn mmio_enabled(&self) -> bool {
        self.mmio.get()
    }

    /// Number of times interrupts were switched off.
    pub fn disable_count(&self) -> u32 {
        self.disables.get()
    }

    /// Delivers vector `irq_id` if it is unmasked.
    pub fn fire(&self, irq_id: u32) -> Option<IrqHandlerResult> {
        if !self.unmasked.get() {
            return None;
        }
        self.handler.get().map(|handler| handler(&self.info, irq_id))
    }
}

impl PcieDevice for FakeDevice {
    fn info(&self) -> &PciDeviceInfo {
        &self.info
    }

    fn claim(&self) -> Option<DriverClaim> {
        self.claim.get()
    }

    fn bar(&self, index: usize) -> Option<PciBar> {
        match index {
            0 => Some(self.bar0),
            1..=5 => Some(PciBar::Unused),
            _ => None,
        }
    }

    fn set_irq_mode(&self, mode: IrqMode, vectors: u32) -> Result<(), DriverError> {
        if mode == IrqMode::Disabled {
            self.disables.set(self.disables.get() + 1);
            if let Some(err) = self.fail_disable.get() {
                return Err(err);
            }
            self.handler.set(None);
            self.unmasked.set(false);
            self.irq_mode.set(IrqMode::Disabled);
            self.irq_vectors.set(0);
            return Ok(());
        }
        if let Some(err) = self.fail_irq_mode.get() {
            return Err(err);
        }
        self.irq_mode.set(mode);
        self.irq_vectors.set(vectors);
        Ok(())
    }

    fn register_irq_handler(&self, irq_id: u32, handler: PcieIrqHandler) -> Result<(), DriverError> {
        if let Some(err) = self.fail_register.get() {
            return Err(err);
        }
        if self.irq_mode.get() == IrqMode::Disabled || irq_id >= self.irq_vectors.get() {
            return Err(DriverError::InvalidArgs);
        }
        self.handler.set(Some(handler));
        Ok(())
    }

    fn unmask_irq(&self, irq_id: u32) -> Result<(), DriverError> {
        if let Some(err) = self.fail_unmask.get() {
            return Err(err);
        }
        if !self.has_handler() || irq_id >= self.irq_vectors.get() {
            return Err(DriverError::InvalidState);
        }
        self.unmasked.set(true);
        Ok(())
    }

    fn enable_mmio(&self, enabled: bool) {
        self.mmio.set(enabled);
    }
}
