//! Thermal sensor drivers.

pub mod pch;
