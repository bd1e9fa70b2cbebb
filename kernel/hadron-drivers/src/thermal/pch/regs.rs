//! Intel PCH thermal sensor register definitions.
//!
//! The sensor exposes a small MMIO window behind BAR 0 (TBAR). Temperatures
//! are stored in 9-bit half-degree units offset by -50 °C; [`decode_temp`]
//! and [`encode_temp`] convert between that encoding and whole degrees.

use bitflags::bitflags;
use hadron_core::addr::VirtAddr;
use hadron_mmio::register_block;

// ---------------------------------------------------------------------------
// Register block
// ---------------------------------------------------------------------------

register_block! {
    /// Intel PCH thermal sensor MMIO register block.
    pub PchThermalRegs {
        /// Temperature reading, bits 8:0 encoded.
        [0x00; u16; ro] temp,
        /// Thermal Sensor Control.
        [0x04; u8; rw] tsc => Tsc,
        /// Thermal Sensor Status.
        [0x06; u8; ro] tss,
        /// Thermal Sensor Enable and Lock.
        [0x08; u8; rw] tsel => Tsel,
        /// Catastrophic Trip Threshold, bits 8:0 encoded.
        [0x10; u16; rw] ctt,
    }
}

/// Bytes spanned by [`PchThermalRegs`].
pub const REGS_WINDOW: u64 = 0x12;

// ---------------------------------------------------------------------------
// Control register bitflags
// ---------------------------------------------------------------------------

bitflags! {
    /// Thermal Sensor Control (TSC) register flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Tsc: u8 {
        /// Catastrophic Power-Down Enable: power off when CTT is crossed.
        const CPDE = 1 << 0;
        /// Policy lock-down; further writes are ignored until reset.
        const PLD  = 1 << 7;
    }
}

bitflags! {
    /// Thermal Sensor Enable and Lock (TSEL) register flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Tsel: u8 {
        /// Enable Thermal Sensor.
        const ETS  = 1 << 0;
        /// Policy lock-down bit.
        const PLDB = 1 << 7;
    }
}

// ---------------------------------------------------------------------------
// Temperature encoding
// ---------------------------------------------------------------------------

/// Bits of `temp` and `ctt` that carry the encoded temperature.
pub const TEMP_MASK: u16 = 0x1ff;

/// Lowest temperature the encoding can represent.
pub const TEMP_MIN_CELSIUS: i16 = -50;
/// Highest temperature the encoding can represent.
pub const TEMP_MAX_CELSIUS: i16 = 205;

/// Converts a raw `temp`/`ctt` value to whole degrees Celsius.
///
/// Bits above [`TEMP_MASK`] are ignored.
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub const fn decode_temp(raw: u16) -> i16 {
    ((raw & TEMP_MASK) / 2) as i16 + TEMP_MIN_CELSIUS
}

/// Limits `celsius` to [`TEMP_MIN_CELSIUS`]..=[`TEMP_MAX_CELSIUS`].
#[must_use]
pub const fn saturate_temp(celsius: i16) -> i16 {
    if celsius < TEMP_MIN_CELSIUS {
        TEMP_MIN_CELSIUS
    } else if celsius > TEMP_MAX_CELSIUS {
        TEMP_MAX_CELSIUS
    } else {
        celsius
    }
}

/// Converts whole degrees Celsius to the register encoding.
///
/// Values outside the representable range saturate to its ends.
#[must_use]
#[allow(clippy::cast_sign_loss)]
pub const fn encode_temp(celsius: i16) -> u16 {
    ((saturate_temp(celsius) - TEMP_MIN_CELSIUS) * 2) as u16
}
