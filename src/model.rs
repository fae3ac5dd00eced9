//! Device variant detection.
//!
//! The Watchdog never announces whether it is a 30A or 50A unit. The variant
//! is inferred from the telemetry frame shapes it emits and latched toward
//! the richer variant:
//!
//! ```text
//! Unknown ──single──▶ SingleLine ──dual──▶ DualLine
//!    └──────────────────dual──────────────────▲
//! ```
//!
//! A dual-line unit may still send single-line frames; those never move the
//! state back. Only [`ModelDetector::reset`] (a new connection) returns to
//! `Unknown`.

use crate::protocol::classify::FrameKind;
use crate::telemetry::Variant;

/// Latched device variant for one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DeviceModel {
    /// No telemetry seen yet
    #[default]
    Unknown,
    /// 30A, one line
    SingleLine,
    /// 50A, two lines
    DualLine,
}

impl DeviceModel {
    /// Record variant for this model (`Unknown` reports as single line)
    pub const fn variant(self) -> Variant {
        match self {
            Self::DualLine => Variant::DualLine,
            Self::Unknown | Self::SingleLine => Variant::SingleLine,
        }
    }
}

/// Tracks [`DeviceModel`] from observed frame kinds.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelDetector {
    state: DeviceModel,
}

impl ModelDetector {
    /// Create a detector in the `Unknown` state
    pub const fn new() -> Self {
        Self {
            state: DeviceModel::Unknown,
        }
    }

    /// Current state
    #[inline]
    pub const fn state(&self) -> DeviceModel {
        self.state
    }

    /// Update from an observed frame kind and return the new state.
    pub fn observe(&mut self, kind: FrameKind) -> DeviceModel {
        let next = match (self.state, kind) {
            (DeviceModel::Unknown, FrameKind::SingleLineTelemetry) => DeviceModel::SingleLine,
            (DeviceModel::Unknown | DeviceModel::SingleLine, FrameKind::DualLineTelemetry) => {
                DeviceModel::DualLine
            }
            (state, _) => state,
        };
        if next != self.state {
            wd_log!(info, "Device model latched: dual_line={}", next == DeviceModel::DualLine);
        }
        self.state = next;
        next
    }

    /// Forget the latched variant (new connection)
    pub fn reset(&mut self) {
        self.state = DeviceModel::Unknown;
    }
}
