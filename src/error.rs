//! Error types for Power Watchdog stream processing.
//!
//! Every error here is recoverable: the pipeline drops the offending bytes or
//! frame and stays ready for the next chunk. Errors surface to the host as
//! diagnostic events, never as a failed connection.

use core::fmt;

// =============================================================================
// Framing
// =============================================================================

/// Problems found while reassembling frames from transport chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FramingError {
    /// Header declared a payload larger than the configured bound
    Oversized {
        /// Declared payload length
        declared: u16,
    },
    /// Frame tail was not the expected end marker
    BadTail {
        /// Tail value actually found
        found: u16,
    },
    /// Bytes before the next frame identifier were discarded
    Skipped {
        /// Number of bytes discarded
        bytes: usize,
    },
    /// The buffer filled up without yielding a frame and was cleared
    Overflow {
        /// Number of bytes dropped
        dropped: usize,
    },
}

impl FramingError {
    /// Check if this error came from an oversized length field
    pub fn is_oversized(&self) -> bool {
        matches!(self, Self::Oversized { .. })
    }

    /// Check if this error came from a corrupt tail
    pub fn is_bad_tail(&self) -> bool {
        matches!(self, Self::BadTail { .. })
    }
}

impl fmt::Display for FramingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Oversized { declared } => {
                write!(f, "declared payload length {declared} exceeds bound")
            }
            Self::BadTail { found } => write!(f, "bad frame tail 0x{found:04X}"),
            Self::Skipped { bytes } => write!(f, "skipped {bytes} bytes while resyncing"),
            Self::Overflow { dropped } => write!(f, "buffer overflow, dropped {dropped} bytes"),
        }
    }
}

// =============================================================================
// Decoding
// =============================================================================

/// A measured quantity within a line block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Field {
    /// Voltage at the pedestal side
    InputVoltage,
    /// Line current
    Current,
    /// Active power
    Power,
    /// Accumulated energy
    Energy,
    /// Voltage on the protected side
    OutputVoltage,
    /// Line frequency
    Frequency,
}

impl Field {
    /// Short field name
    pub const fn name(self) -> &'static str {
        match self {
            Self::InputVoltage => "input_voltage",
            Self::Current => "current",
            Self::Power => "power",
            Self::Energy => "energy",
            Self::OutputVoltage => "output_voltage",
            Self::Frequency => "frequency",
        }
    }

    /// Unit the decoded value is expressed in
    pub const fn unit(self) -> &'static str {
        match self {
            Self::InputVoltage | Self::OutputVoltage => "V",
            Self::Current => "A",
            Self::Power => "W",
            Self::Energy => "kWh",
            Self::Frequency => "Hz",
        }
    }
}

/// Problems found while decoding a telemetry payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Payload shorter than the layout for its frame kind
    Truncated {
        /// Bytes required
        expected: usize,
        /// Bytes present
        actual: usize,
    },
    /// A decoded value fell outside its plausible physical range
    OutOfRange {
        /// Offending field
        field: Field,
        /// Line the field belongs to (1 or 2)
        line: u8,
        /// Raw wire value
        raw: i32,
    },
    /// The frame is not a telemetry frame
    NotTelemetry,
    /// The line layout cannot decode this field (divisor does not divide the
    /// fixed-point scale)
    InvalidLayout {
        /// Field with the unusable divisor
        field: Field,
    },
}

impl DecodeError {
    /// Check if the payload was too short
    pub fn is_truncated(&self) -> bool {
        matches!(self, Self::Truncated { .. })
    }

    /// Check if a value was implausible
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Self::OutOfRange { .. })
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated { expected, actual } => {
                write!(f, "payload truncated: expected {expected} bytes, got {actual}")
            }
            Self::OutOfRange { field, line, raw } => write!(
                f,
                "L{line} {} out of range (raw {raw}, unit {})",
                field.name(),
                field.unit()
            ),
            Self::NotTelemetry => write!(f, "frame is not a telemetry report"),
            Self::InvalidLayout { field } => {
                write!(f, "layout cannot scale field {}", field.name())
            }
        }
    }
}

// =============================================================================
// Main Error Type
// =============================================================================

/// Power Watchdog processing error.
///
/// Carried by [`Diagnostic::error`](crate::session::Diagnostic::error).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WatchdogError {
    /// Stream framing errors (resync, bad tail, overflow)
    Framing(FramingError),
    /// Payload decoding errors (truncation, implausible values)
    Decode(DecodeError),
}

impl From<FramingError> for WatchdogError {
    fn from(e: FramingError) -> Self {
        Self::Framing(e)
    }
}

impl From<DecodeError> for WatchdogError {
    fn from(e: DecodeError) -> Self {
        Self::Decode(e)
    }
}

impl fmt::Display for WatchdogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Framing(e) => write!(f, "Framing error: {e}"),
            Self::Decode(e) => write!(f, "Decode error: {e}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FramingError {}

#[cfg(feature = "std")]
impl std::error::Error for DecodeError {}

#[cfg(feature = "std")]
impl std::error::Error for WatchdogError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::string::ToString;

    #[test]
    fn test_display_framing() {
        let e = WatchdogError::from(FramingError::BadTail { found: 0xFFFF });
        assert_eq!(e.to_string(), "Framing error: bad frame tail 0xFFFF");
    }

    #[test]
    fn test_display_out_of_range() {
        let e = DecodeError::OutOfRange {
            field: Field::InputVoltage,
            line: 2,
            raw: 9_990_000,
        };
        assert_eq!(
            e.to_string(),
            "L2 input_voltage out of range (raw 9990000, unit V)"
        );
        assert!(e.is_out_of_range());
        assert!(!e.is_truncated());
    }
}
