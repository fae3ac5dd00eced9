#![cfg_attr(all(not(test), not(feature = "std")), no_std)]
#![doc = include_str!("../README.md")]

//! # power-watchdog
//!
//! BLE telemetry decoder for Hughes Power Watchdog surge protectors.
//!
//! The device streams framed reports over a GATT notify characteristic.
//! Notifications do not line up with frames: one notification may hold part
//! of a frame or several frames at once. This crate turns that byte stream
//! back into frames and decodes them into per-line electrical readings.
//!
//! ## Features
//!
//! - `no_std`, allocation-free, bounded buffers
//! - Reassembly with resynchronisation after corrupt or truncated input
//! - 30A (single line) and 50A (dual line) detection
//! - Exact fixed-point line totals
//! - Outbound reset-energy command and protocol handshake
//!
//! ## Example
//!
//! ```rust,ignore
//! use power_watchdog::{Session, WatchdogEvent};
//!
//! let mut session = Session::new();
//! // For every notification on CHARACTERISTIC_UUID:
//! for event in session.feed(notification) {
//!     if let WatchdogEvent::Telemetry(record) = event {
//!         println!("{} W", record.total_power);
//!     }
//! }
//! ```

// Macro module (must be declared before use)
#[macro_use]
mod logging;

pub mod configuration;
pub mod error;
pub mod model;
pub mod protocol;
pub mod session;
pub mod telemetry;

// Re-export commonly used types
#[doc(inline)]
pub use configuration::SessionConfig;
#[doc(inline)]
pub use error::{DecodeError, Field, FramingError, WatchdogError};
#[doc(inline)]
pub use model::{DeviceModel, ModelDetector};
#[doc(inline)]
pub use protocol::{
    build_handshake, build_reset_energy_command, classify, Frame, FrameBuilder, FrameHeader,
    FrameKind, ReassemblyBuffer, ResetEnergyCommand,
};
#[doc(inline)]
pub use session::{Diagnostic, Events, Session, WatchdogEvent};
#[doc(inline)]
pub use telemetry::{
    compute_totals, decode, FixedPoint, LineReading, Telemetry, TelemetryRecord, Totals, Variant,
};
