//! Decoded telemetry types.
//!
//! Measurements are kept as [`FixedPoint`] values with a resolution of
//! 1/10 000 of the unit, the finest scale the device uses. Sums of line
//! values are therefore exact, and a host can convert to floating point at
//! the edge with [`FixedPoint::to_f64`].

pub mod decode;
pub mod layout;
pub mod totals;

use core::fmt;
use core::ops::Add;

pub use decode::{decode, Telemetry};
pub use layout::{FieldSpec, LineLayout, LINE_LAYOUT};
pub use totals::{compute_totals, Totals};

/// Signed fixed-point quantity in units of 1/10 000.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FixedPoint(i64);

impl FixedPoint {
    /// Number of raw steps per unit
    pub const SCALE: i64 = 10_000;

    /// Zero
    pub const ZERO: Self = Self(0);

    /// Construct from a count of 1/10 000 units
    #[inline]
    pub const fn from_ten_thousandths(raw: i64) -> Self {
        Self(raw)
    }

    /// Construct from a wire integer that the device scales by `divisor`.
    ///
    /// Returns `None` unless `divisor` is a positive divisor of
    /// [`Self::SCALE`].
    #[inline]
    pub const fn from_scaled(raw: i32, divisor: i32) -> Option<Self> {
        if divisor <= 0 || Self::SCALE % divisor as i64 != 0 {
            return None;
        }
        Some(Self(raw as i64 * (Self::SCALE / divisor as i64)))
    }

    /// Construct from a float, rounding half away from zero
    pub fn from_f64(value: f64) -> Self {
        let scaled = value * Self::SCALE as f64;
        let rounded = if scaled >= 0.0 {
            scaled + 0.5
        } else {
            scaled - 0.5
        };
        Self(rounded as i64)
    }

    /// Raw count of 1/10 000 units
    #[inline]
    pub const fn ten_thousandths(self) -> i64 {
        self.0
    }

    /// Value as `f64`
    #[inline]
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / Self::SCALE as f64
    }

    /// Value as `f32`
    #[inline]
    pub fn to_f32(self) -> f32 {
        self.to_f64() as f32
    }
}

impl Add for FixedPoint {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl fmt::Display for FixedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let scale = Self::SCALE as u64;
        write!(f, "{sign}{}.{:04}", abs / scale, abs % scale)
    }
}

/// Measurements for one AC line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineReading {
    /// Pedestal-side voltage (V)
    pub input_voltage: FixedPoint,
    /// Protected-side voltage (V)
    pub output_voltage: FixedPoint,
    /// Current (A)
    pub current: FixedPoint,
    /// Active power (W)
    pub power: FixedPoint,
    /// Accumulated energy (kWh)
    pub energy: FixedPoint,
    /// Line frequency (Hz)
    pub frequency: FixedPoint,
    /// Device error code (0 = no error)
    pub error_code: u8,
    /// Raw status byte
    pub status: u8,
    /// Voltage boost engaged
    pub boost: bool,
}

/// Device variant, as reported in a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Variant {
    /// 30A model, one line
    SingleLine,
    /// 50A model, two lines
    DualLine,
}

/// One polling cycle of decoded measurements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TelemetryRecord {
    /// Latched device variant
    pub variant: Variant,
    /// Line 1 readings
    pub line1: LineReading,
    /// Line 2 readings; `Some` exactly when `variant` is `DualLine`
    pub line2: Option<LineReading>,
    /// Sum of power over available lines (W)
    pub total_power: FixedPoint,
    /// Sum of energy over available lines (kWh)
    pub total_energy: FixedPoint,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::string::ToString;

    #[test]
    fn test_from_scaled() {
        assert_eq!(
            FixedPoint::from_scaled(1_201_000, 10_000),
            Some(FixedPoint::from_ten_thousandths(1_201_000))
        );
        // Frequency is scaled by 100 on the wire
        assert_eq!(
            FixedPoint::from_scaled(5990, 100),
            Some(FixedPoint::from_ten_thousandths(599_000))
        );
        assert_eq!(FixedPoint::from_scaled(1, 0), None);
        assert_eq!(FixedPoint::from_scaled(1, -100), None);
        assert_eq!(FixedPoint::from_scaled(1, 3), None);
    }

    #[test]
    fn test_from_f64_rounding() {
        assert_eq!(FixedPoint::from_f64(120.1).ten_thousandths(), 1_201_000);
        assert_eq!(FixedPoint::from_f64(3.402).ten_thousandths(), 34_020);
        assert_eq!(FixedPoint::from_f64(-1.5).ten_thousandths(), -15_000);
    }

    #[test]
    fn test_sum_is_exact() {
        let total = FixedPoint::from_f64(1.0) + FixedPoint::from_f64(0.8);
        assert_eq!(total, FixedPoint::from_f64(1.8));
    }

    #[test]
    fn test_display() {
        assert_eq!(FixedPoint::from_f64(59.9).to_string(), "59.9000");
        assert_eq!(FixedPoint::from_f64(-0.25).to_string(), "-0.2500");
    }
}
