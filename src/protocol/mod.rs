//! Power Watchdog wire protocol.
//!
//! This module contains the frame format, stream reassembly, frame
//! classification and the outbound commands understood by the device.

pub mod classify;
pub mod commands;
pub mod constants;
pub mod frame;
pub mod reassembly;

pub use classify::*;
pub use commands::*;
pub use constants::*;
pub use frame::*;
pub use reassembly::*;
