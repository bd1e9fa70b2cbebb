//! Typed MMIO register blocks.
//!
//! Drivers describe a device's register window once with [`register_block!`]
//! and get a struct whose accessors perform volatile loads and stores at the
//! declared offsets. The generated constructor takes a `VirtAddr` from
//! `hadron_core::addr`, normally the `virt_base()` of a mapped region.

#![cfg_attr(not(test), no_std)]

pub use hadron_mmio_macros::register_block;
