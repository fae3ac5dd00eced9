//! Frame classification.
//!
//! Only the header is inspected: the command code and the declared payload
//! length. Every header maps to a [`FrameKind`]; codes this crate does not
//! understand become [`FrameKind::Unrecognized`] so newer firmware degrades to
//! ignored frames instead of errors.

use crate::protocol::constants::{CMD_ALARM, CMD_DL_REPORT, CMD_ERROR_REPORT, DL_DATA_SIZE};
use crate::protocol::frame::{Frame, FrameHeader};

/// What a frame carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameKind {
    /// DLReport with one line block (30A models)
    SingleLineTelemetry,
    /// DLReport with two line blocks (50A models)
    DualLineTelemetry,
    /// Alarm notification
    Alarm,
    /// Error history record
    ErrorReport,
    /// Anything else, including DLReports of unexpected length
    Unrecognized {
        /// Raw command code
        command: u8,
        /// Declared payload length
        payload_len: u16,
    },
}

impl FrameKind {
    /// Check if this kind carries line measurements
    #[inline]
    pub const fn is_telemetry(self) -> bool {
        matches!(self, Self::SingleLineTelemetry | Self::DualLineTelemetry)
    }

    /// Number of line blocks in a telemetry payload (0 otherwise)
    #[inline]
    pub const fn line_count(self) -> usize {
        match self {
            Self::SingleLineTelemetry => 1,
            Self::DualLineTelemetry => 2,
            _ => 0,
        }
    }
}

/// Classify a frame by its header.
#[inline]
pub const fn classify(header: &FrameHeader) -> FrameKind {
    match header.command {
        CMD_DL_REPORT if header.payload_len as usize == DL_DATA_SIZE => {
            FrameKind::SingleLineTelemetry
        }
        CMD_DL_REPORT if header.payload_len as usize == DL_DATA_SIZE * 2 => {
            FrameKind::DualLineTelemetry
        }
        CMD_ERROR_REPORT => FrameKind::ErrorReport,
        CMD_ALARM => FrameKind::Alarm,
        command => FrameKind::Unrecognized {
            command,
            payload_len: header.payload_len,
        },
    }
}

impl Frame {
    /// Classify this frame by its header
    #[inline]
    pub const fn kind(&self) -> FrameKind {
        classify(self.header())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(command: u8, payload_len: u16) -> FrameHeader {
        FrameHeader {
            version: 1,
            message_id: 0,
            command,
            payload_len,
        }
    }

    #[test]
    fn test_dl_report_by_length() {
        assert_eq!(classify(&header(1, 34)), FrameKind::SingleLineTelemetry);
        assert_eq!(classify(&header(1, 68)), FrameKind::DualLineTelemetry);
        assert_eq!(
            classify(&header(1, 50)),
            FrameKind::Unrecognized {
                command: 1,
                payload_len: 50
            }
        );
    }

    #[test]
    fn test_non_telemetry() {
        assert_eq!(classify(&header(2, 16)), FrameKind::ErrorReport);
        assert_eq!(classify(&header(14, 0)), FrameKind::Alarm);
        let kind = classify(&header(99, 3));
        assert_eq!(
            kind,
            FrameKind::Unrecognized {
                command: 99,
                payload_len: 3
            }
        );
        assert!(!kind.is_telemetry());
        assert_eq!(kind.line_count(), 0);
    }

    #[test]
    fn test_every_code_classifies() {
        for command in 0..=u8::MAX {
            for len in [0u16, 34, 68, 256, u16::MAX] {
                let kind = classify(&header(command, len));
                assert_eq!(kind.is_telemetry(), command == 1 && (len == 34 || len == 68));
            }
        }
    }
}
