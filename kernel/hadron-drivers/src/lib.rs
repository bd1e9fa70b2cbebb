//! Hardware drivers for Hadron OS.

#![cfg_attr(not(test), no_std)]

// ── Subsystem modules ───────────────────────────────────────────────────

pub mod thermal;

/// Anchor symbol referenced by the linker script's `EXTERN()` directive
/// to force inclusion of this crate's driver registration entries.
#[cfg(target_os = "none")]
#[used]
#[unsafe(no_mangle)]
pub static __HADRON_DRIVERS_ANCHOR: u8 = 0;
