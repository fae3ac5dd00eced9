//! Static layout of a DLData line block.
//!
//! Each DLReport payload holds one (30A) or two (50A) consecutive blocks of
//! [`DL_DATA_SIZE`] bytes:
//!
//! ```text
//! Offset  Len  Field              Divisor
//!  0      4    input voltage      10 000  → V
//!  4      4    current            10 000  → A
//!  8      4    power              10 000  → W
//! 12      4    energy             10 000  → kWh
//! 16      4    (reserved)
//! 20      4    output voltage     10 000  → V
//! 24      1    backlight
//! 25      1    neutral detection
//! 26      1    boost flag         1 = boosting
//! 27      1    temperature
//! 28      4    frequency          100     → Hz
//! 32      1    error code         0-9
//! 33      1    status
//! ```
//!
//! Numeric fields are big-endian two's complement. The decoder walks
//! [`LINE_LAYOUT`] instead of hard-coding offsets, so a new firmware layout is
//! a new table.

use crate::error::Field;
use crate::protocol::constants::DL_DATA_SIZE;

/// Wire description and plausible range for one numeric field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field identity
    pub field: Field,
    /// Byte offset within the line block
    pub offset: usize,
    /// Width in bytes (big-endian signed)
    pub width: usize,
    /// Wire value divided by this gives the unit value
    pub divisor: i32,
    /// Smallest accepted wire value
    pub min_raw: i32,
    /// Largest accepted wire value
    pub max_raw: i32,
}

impl FieldSpec {
    const fn new(field: Field, offset: usize, divisor: i32, min: i32, max: i32) -> Self {
        Self {
            field,
            offset,
            width: 4,
            divisor,
            min_raw: min * divisor,
            max_raw: max * divisor,
        }
    }

    /// Read the raw signed value from a line block.
    ///
    /// Returns `None` if the block is too short.
    #[inline]
    pub fn read(&self, block: &[u8]) -> Option<i32> {
        let bytes = block.get(self.offset..self.offset.checked_add(self.width)?)?;
        let mut acc: i32 = if bytes.first()? & 0x80 != 0 { -1 } else { 0 };
        for &b in bytes {
            acc = (acc << 8) | i32::from(b);
        }
        Some(acc)
    }

    /// Check the raw value against the plausible range
    #[inline]
    pub const fn in_range(&self, raw: i32) -> bool {
        raw >= self.min_raw && raw <= self.max_raw
    }
}

/// Complete layout of a line block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineLayout {
    /// Block size in bytes
    pub size: usize,
    /// Numeric fields
    pub fields: &'static [FieldSpec],
    /// Offset of the boost flag byte
    pub boost_offset: usize,
    /// Offset of the error code byte
    pub error_offset: usize,
    /// Offset of the status byte
    pub status_offset: usize,
}

impl LineLayout {
    /// Find the spec for `field`
    pub fn spec(&self, field: Field) -> Option<&FieldSpec> {
        self.fields.iter().find(|s| s.field == field)
    }
}

const LINE_FIELDS: [FieldSpec; 6] = [
    FieldSpec::new(Field::InputVoltage, 0, 10_000, 0, 300),
    FieldSpec::new(Field::Current, 4, 10_000, -100, 100),
    FieldSpec::new(Field::Power, 8, 10_000, -30_000, 30_000),
    // Energy spans the whole positive i32 range (214 748 kWh)
    FieldSpec {
        field: Field::Energy,
        offset: 12,
        width: 4,
        divisor: 10_000,
        min_raw: 0,
        max_raw: i32::MAX,
    },
    FieldSpec::new(Field::OutputVoltage, 20, 10_000, 0, 300),
    FieldSpec::new(Field::Frequency, 28, 100, 0, 100),
];

/// DLData block layout used by all known firmware
pub const LINE_LAYOUT: LineLayout = LineLayout {
    size: DL_DATA_SIZE,
    fields: &LINE_FIELDS,
    boost_offset: 26,
    error_offset: 32,
    status_offset: 33,
};
