//! Unified Logging Macro for power-watchdog
//!
//! This module provides a unified logging interface that selects between
//! `log::` and `defmt::` based on the active feature flags.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::wd_log;
//!
//! wd_log!(debug, "Frame cmd={} len={}", cmd, len);
//! wd_log!(warn, "Alarm notification received");
//! ```
//!
//! # Feature Flags
//!
//! - `log` - Uses the `log` crate (std hosts)
//! - `defmt` - Uses `defmt::` (embedded targets)
//! - Neither - Log statements compile to nothing
//!
//! Arguments should be primitives so the same format string is valid for
//! both backends.

/// Unified logging macro - selects log:: or defmt:: based on features
#[macro_export]
#[cfg(feature = "log")]
macro_rules! wd_log {
    (info, $($arg:tt)*) => { log::info!($($arg)*) };
    (debug, $($arg:tt)*) => { log::debug!($($arg)*) };
    (warn, $($arg:tt)*) => { log::warn!($($arg)*) };
    (error, $($arg:tt)*) => { log::error!($($arg)*) };
    (trace, $($arg:tt)*) => { log::trace!($($arg)*) };
}

#[macro_export]
#[cfg(all(feature = "defmt", not(feature = "log")))]
macro_rules! wd_log {
    (info, $($arg:tt)*) => { defmt::info!($($arg)*) };
    (debug, $($arg:tt)*) => { defmt::debug!($($arg)*) };
    (warn, $($arg:tt)*) => { defmt::warn!($($arg)*) };
    (error, $($arg:tt)*) => { defmt::error!($($arg)*) };
    (trace, $($arg:tt)*) => { defmt::trace!($($arg)*) };
}

// No backend: arguments are still type-checked but nothing is emitted.
#[macro_export]
#[cfg(not(any(feature = "log", feature = "defmt")))]
macro_rules! wd_log {
    ($level:ident, $($arg:tt)*) => {{
        if false {
            let _ = ::core::format_args!($($arg)*);
        }
    }};
}
