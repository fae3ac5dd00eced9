//! Telemetry payload decoding.
//!
//! Decoding is separate from classification. A frame whose length matched
//! its kind can still carry implausible values, and those are rejected here
//! with [`DecodeError::OutOfRange`] rather than reaching a sensor.

use crate::error::{DecodeError, Field};
use crate::protocol::classify::FrameKind;
use crate::protocol::frame::Frame;
use crate::telemetry::layout::{LineLayout, LINE_LAYOUT};
use crate::telemetry::{FixedPoint, LineReading};

/// Line readings decoded from one telemetry frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Telemetry {
    /// 30A report
    Single(LineReading),
    /// 50A report (L1, L2)
    Dual(LineReading, LineReading),
}

impl Telemetry {
    /// Line 1 readings
    pub const fn line1(&self) -> &LineReading {
        match self {
            Self::Single(l1) | Self::Dual(l1, _) => l1,
        }
    }

    /// Line 2 readings, if the frame carried them
    pub const fn line2(&self) -> Option<&LineReading> {
        match self {
            Self::Single(_) => None,
            Self::Dual(_, l2) => Some(l2),
        }
    }
}

/// Decode a telemetry frame using the standard line layout.
pub fn decode(frame: &Frame) -> Result<Telemetry, DecodeError> {
    decode_with(frame.kind(), frame.payload(), &LINE_LAYOUT)
}

/// Decode a payload of the given kind against `layout`.
pub fn decode_with(
    kind: FrameKind,
    payload: &[u8],
    layout: &LineLayout,
) -> Result<Telemetry, DecodeError> {
    let lines = kind.line_count();
    if lines == 0 {
        return Err(DecodeError::NotTelemetry);
    }

    let expected = layout.size * lines;
    if payload.len() < expected {
        return Err(DecodeError::Truncated {
            expected,
            actual: payload.len(),
        });
    }

    let l1 = decode_line(&payload[..layout.size], layout, 1)?;
    if lines == 1 {
        return Ok(Telemetry::Single(l1));
    }
    let l2 = decode_line(&payload[layout.size..expected], layout, 2)?;
    Ok(Telemetry::Dual(l1, l2))
}

/// Decode one line block.
pub fn decode_line(block: &[u8], layout: &LineLayout, line: u8) -> Result<LineReading, DecodeError> {
    let truncated = || DecodeError::Truncated {
        expected: layout.size,
        actual: block.len(),
    };
    if block.len() < layout.size {
        return Err(truncated());
    }

    let mut reading = LineReading::default();
    for spec in layout.fields {
        let raw = spec.read(block).ok_or_else(truncated)?;
        if !spec.in_range(raw) {
            wd_log!(debug, "L{} field {} out of range: {}", line, spec.field.name(), raw);
            return Err(DecodeError::OutOfRange {
                field: spec.field,
                line,
                raw,
            });
        }

        let value = FixedPoint::from_scaled(raw, spec.divisor)
            .ok_or(DecodeError::InvalidLayout { field: spec.field })?;
        match spec.field {
            Field::InputVoltage => reading.input_voltage = value,
            Field::OutputVoltage => reading.output_voltage = value,
            Field::Current => reading.current = value,
            Field::Power => reading.power = value,
            Field::Energy => reading.energy = value,
            Field::Frequency => reading.frequency = value,
        }
    }

    let byte = |offset: usize| block.get(offset).copied().ok_or_else(truncated);
    reading.boost = byte(layout.boost_offset)? == 1;
    reading.error_code = byte(layout.error_offset)?;
    reading.status = byte(layout.status_offset)?;
    Ok(reading)
}
