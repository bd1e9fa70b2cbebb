//! Compile-time configuration.
//!
//! Values are fixed when the crate is built. `HADRON_LOG_LEVEL` selects the
//! most verbose level that reaches the log sink; unset or unrecognized values
//! fall back to `debug`.

use crate::log::LogLevel;

/// Maximum kernel log level (compile-time). Messages more verbose than this
/// are discarded before formatting.
pub const MAX_LOG_LEVEL: LogLevel = match option_env!("HADRON_LOG_LEVEL") {
    Some(level) => match LogLevel::from_config(level) {
        Some(level) => level,
        None => LogLevel::Debug,
    },
    None => LogLevel::Debug,
};

/// Page size used for device mappings.
pub const PAGE_SIZE: u64 = 4096;
