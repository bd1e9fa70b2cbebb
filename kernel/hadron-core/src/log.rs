//! Leveled logging for kernel components and drivers.
//!
//! Components log through [`klog!`] and its per-level shorthands (`kerr!`,
//! `kwarn!`, `kinfo!`, `kdebug!`, `ktrace!`). Records are handed to a single
//! sink function registered with [`set_log_fn`]; until the kernel installs
//! one, output is silently discarded. Levels more verbose than
//! [`MAX_LOG_LEVEL`](crate::config::MAX_LOG_LEVEL) are dropped before the
//! sink is called, so disabled `ktrace!` calls in interrupt paths cost one
//! comparison against a constant.

use core::fmt;
use core::sync::atomic::{AtomicPtr, Ordering};

use crate::config::MAX_LOG_LEVEL;

/// Kernel log severity level. Lower is more severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    /// Error: something failed but the system may continue.
    Error = 1,
    /// Warning: unexpected condition, not necessarily an error.
    Warn = 2,
    /// Informational: high-level progress messages.
    Info = 3,
    /// Debug: detailed diagnostic information.
    Debug = 4,
    /// Trace: very verbose, low-level tracing.
    Trace = 5,
}

impl LogLevel {
    /// Returns the human-readable name (fixed-width for aligned output).
    pub const fn name(self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warn => "WARN ",
            Self::Info => "INFO ",
            Self::Debug => "DEBUG",
            Self::Trace => "TRACE",
        }
    }

    /// Parses a configuration string such as `"warn"`.
    ///
    /// Unknown strings yield `None`.
    pub const fn from_config(value: &str) -> Option<Self> {
        match value.as_bytes() {
            b"error" => Some(Self::Error),
            b"warn" => Some(Self::Warn),
            b"info" => Some(Self::Info),
            b"debug" => Some(Self::Debug),
            b"trace" => Some(Self::Trace),
            _ => None,
        }
    }
}

/// Returns `true` if records at `level` reach the sink in this build.
#[inline]
pub const fn enabled(level: LogLevel) -> bool {
    level as u8 <= MAX_LOG_LEVEL as u8
}

/// The signature of the global leveled log function.
pub type LogFn = fn(LogLevel, fmt::Arguments<'_>);

fn null_log(_level: LogLevel, _args: fmt::Arguments<'_>) {}

static LOG_FN: AtomicPtr<()> = AtomicPtr::new(null_log as *mut ());

/// Registers the global leveled log function.
///
/// # Safety
///
/// The provided function must be safe to call from any context, including
/// interrupt handlers. May be called more than once; `Release` ordering makes
/// the new function visible to subsequent loads.
pub unsafe fn set_log_fn(f: LogFn) {
    LOG_FN.store(f as *mut (), Ordering::Release);
}

#[inline]
fn load_log_fn() -> LogFn {
    let ptr = LOG_FN.load(Ordering::Acquire);
    // SAFETY: Only valid `LogFn` pointers (or `null_log`) are stored in LOG_FN.
    unsafe { core::mem::transmute::<*mut (), LogFn>(ptr) }
}

/// Implementation detail for [`klog!`]. Not public API.
#[doc(hidden)]
pub fn _log(level: LogLevel, args: fmt::Arguments<'_>) {
    if enabled(level) {
        load_log_fn()(level, args);
    }
}

/// Logs a message at the given level.
#[macro_export]
macro_rules! klog {
    ($level:expr, $($arg:tt)*) => {
        $crate::log::_log($level, format_args!($($arg)*))
    };
}

/// Logs an error-level message (level 1).
#[macro_export]
macro_rules! kerr {
    ($($arg:tt)*) => { $crate::klog!($crate::log::LogLevel::Error, $($arg)*) };
}

/// Logs a warning-level message (level 2).
#[macro_export]
macro_rules! kwarn {
    ($($arg:tt)*) => { $crate::klog!($crate::log::LogLevel::Warn, $($arg)*) };
}

/// Logs an info-level message (level 3).
#[macro_export]
macro_rules! kinfo {
    ($($arg:tt)*) => { $crate::klog!($crate::log::LogLevel::Info, $($arg)*) };
}

/// Logs a debug-level message (level 4).
#[macro_export]
macro_rules! kdebug {
    ($($arg:tt)*) => { $crate::klog!($crate::log::LogLevel::Debug, $($arg)*) };
}

/// Logs a trace-level message (level 5).
#[macro_export]
macro_rules! ktrace {
    ($($arg:tt)*) => { $crate::klog!($crate::log::LogLevel::Trace, $($arg)*) };
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::AtomicUsize;

    static ERRORS_SEEN: AtomicUsize = AtomicUsize::new(0);

    fn counting_sink(level: LogLevel, _args: fmt::Arguments<'_>) {
        if level == LogLevel::Error {
            ERRORS_SEEN.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn levels_order_by_severity() {
        assert!(LogLevel::Error < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Trace);
        assert_eq!(LogLevel::Warn.name(), "WARN ");
    }

    #[test]
    fn from_config_parses_known_levels() {
        assert_eq!(LogLevel::from_config("trace"), Some(LogLevel::Trace));
        assert_eq!(LogLevel::from_config("error"), Some(LogLevel::Error));
        assert_eq!(LogLevel::from_config("loud"), None);
    }

    #[test]
    fn error_level_always_enabled() {
        assert!(enabled(LogLevel::Error));
    }

    #[test]
    fn records_reach_registered_sink() {
        // SAFETY: counting_sink only touches an atomic.
        unsafe { set_log_fn(counting_sink) };
        let before = ERRORS_SEEN.load(Ordering::Relaxed);
        crate::kerr!("sink test {}", 1);
        assert_eq!(ERRORS_SEEN.load(Ordering::Relaxed), before + 1);
    }
}
