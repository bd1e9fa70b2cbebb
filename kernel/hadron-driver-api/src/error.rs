//! Driver error types.

use core::fmt;

/// Errors that can occur during driver operations.
///
/// Also serves as the status code the PCIe bus framework and the address
/// space manager report back to drivers; drivers propagate those unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverError {
    /// The requested operation is not supported by this driver or bus.
    Unsupported,
    /// An I/O error occurred during a hardware operation.
    IoError,
    /// The driver is not in a valid state for this operation.
    InvalidState,
    /// An argument was out of range (e.g. an address wider than the platform).
    InvalidArgs,
    /// A device resource (BAR, interrupt pin) is missing or unassigned.
    InvalidResource,
    /// The kernel ran out of a resource (vectors, address space).
    NoResources,
    /// The resource is still in use.
    Busy,
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported => f.write_str("operation not supported"),
            Self::IoError => f.write_str("I/O error"),
            Self::InvalidState => f.write_str("invalid driver state"),
            Self::InvalidArgs => f.write_str("invalid arguments"),
            Self::InvalidResource => f.write_str("invalid or unassigned device resource"),
            Self::NoResources => f.write_str("out of resources"),
            Self::Busy => f.write_str("resource busy"),
        }
    }
}
