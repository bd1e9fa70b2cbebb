//! Driver metadata types.

/// The type of hardware a driver manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverType {
    /// Thermal sensor or thermal management device.
    Thermal,
}

/// Static metadata describing a driver.
#[derive(Debug, Clone, Copy)]
pub struct DriverInfo {
    /// Short name of the driver (e.g. "intel-pch-thermal").
    pub name: &'static str,
    /// The type of hardware this driver manages.
    pub driver_type: DriverType,
    /// Human-readable description.
    pub description: &'static str,
}
