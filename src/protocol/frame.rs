//! Power Watchdog frame parsing and encoding.
//!
//! ## Frame Structure
//!
//! Every packet on the data characteristic, in either direction, follows
//! this structure:
//!
//! ```text
//! ┌────────────┬─────┬─────┬─────┬──────────┬───────────┬────────┐
//! │ 24 79 77 40│ ver │ msg │ cmd │ len (BE) │  payload  │ 71 21  │
//! │   4 bytes  │ 1 B │ 1 B │ 1 B │  2 bytes │  len bytes│ 2 bytes│
//! └────────────┴─────┴─────┴─────┴──────────┴───────────┴────────┘
//! ```
//!
//! BLE notifications carry arbitrary fragments of this stream; see
//! [`ReassemblyBuffer`](crate::protocol::reassembly::ReassemblyBuffer) for how
//! fragments become [`Frame`]s.

use heapless::Vec;

use crate::error::FramingError;
use crate::protocol::constants::{
    CommandCode, HEADER_SIZE, MAX_PAYLOAD_LEN, PACKET_IDENTIFIER, PACKET_TAIL, PROTOCOL_VERSION,
    TAIL_SIZE,
};

/// Frame header (9 bytes, identifier included)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameHeader {
    /// Protocol version byte
    pub version: u8,
    /// Message id (echo counter, not interpreted)
    pub message_id: u8,
    /// Raw command code
    pub command: u8,
    /// Declared payload length
    pub payload_len: u16,
}

impl FrameHeader {
    /// Size of the header in bytes
    pub const SIZE: usize = HEADER_SIZE;

    /// Create a header for an outbound frame
    pub const fn new(command: CommandCode, payload_len: u16) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            message_id: 0,
            command: command.to_u8(),
            payload_len,
        }
    }

    /// Parse a header from the start of `data`.
    ///
    /// Returns `None` if `data` is shorter than a header or does not start
    /// with the frame identifier.
    #[inline]
    pub fn parse(data: &[u8]) -> Option<Self> {
        let header = data.get(..Self::SIZE)?;
        if header[..4] != PACKET_IDENTIFIER {
            return None;
        }

        Some(Self {
            version: header[4],
            message_id: header[5],
            command: header[6],
            payload_len: u16::from_be_bytes([header[7], header[8]]),
        })
    }

    /// Encode the header into the first [`Self::SIZE`] bytes of `buf`
    pub fn encode(&self, buf: &mut [u8]) -> Option<usize> {
        let out = buf.get_mut(..Self::SIZE)?;
        out[..4].copy_from_slice(&PACKET_IDENTIFIER);
        out[4] = self.version;
        out[5] = self.message_id;
        out[6] = self.command;
        out[7..9].copy_from_slice(&self.payload_len.to_be_bytes());
        Some(Self::SIZE)
    }

    /// Known command code, if any
    pub const fn command_code(&self) -> Option<CommandCode> {
        CommandCode::from_u8(self.command)
    }

    /// Total on-wire size of the frame this header announces
    pub const fn frame_len(&self) -> usize {
        Self::SIZE + self.payload_len as usize + TAIL_SIZE
    }
}

/// A complete frame with its payload copied out of the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    header: FrameHeader,
    payload: Vec<u8, MAX_PAYLOAD_LEN>,
}

impl Frame {
    /// Build a frame from a header and payload.
    ///
    /// Returns `None` if the payload length disagrees with the header or
    /// exceeds [`MAX_PAYLOAD_LEN`].
    pub fn new(header: FrameHeader, payload: &[u8]) -> Option<Self> {
        if payload.len() != header.payload_len as usize {
            return None;
        }
        let payload = Vec::from_slice(payload).ok()?;
        Some(Self { header, payload })
    }

    /// Parse exactly one complete frame from `data`.
    ///
    /// Trailing bytes beyond the frame are ignored.
    pub fn parse(data: &[u8]) -> Result<Self, FramingError> {
        let header = FrameHeader::parse(data).ok_or(FramingError::Skipped { bytes: data.len() })?;
        if header.payload_len as usize > MAX_PAYLOAD_LEN {
            return Err(FramingError::Oversized {
                declared: header.payload_len,
            });
        }

        let end = header.frame_len();
        let Some(frame) = data.get(..end) else {
            return Err(FramingError::Skipped { bytes: data.len() });
        };

        let tail = u16::from_be_bytes([frame[end - 2], frame[end - 1]]);
        if tail != PACKET_TAIL {
            return Err(FramingError::BadTail { found: tail });
        }

        Self::new(header, &frame[FrameHeader::SIZE..end - TAIL_SIZE]).ok_or(
            FramingError::Oversized {
                declared: header.payload_len,
            },
        )
    }

    /// Frame header
    #[inline]
    pub const fn header(&self) -> &FrameHeader {
        &self.header
    }

    /// Frame payload (between header and tail)
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

/// Builder for outbound frames
#[derive(Debug)]
pub struct FrameBuilder<'a> {
    command: CommandCode,
    payload: &'a [u8],
}

impl<'a> FrameBuilder<'a> {
    /// Create a new frame builder
    pub const fn new(command: CommandCode, payload: &'a [u8]) -> Self {
        Self { command, payload }
    }

    /// Build the frame into `buf`, returning the number of bytes written.
    ///
    /// Returns `None` if `buf` is too small or the payload is too large.
    pub fn build(&self, buf: &mut [u8]) -> Option<usize> {
        if self.payload.len() > MAX_PAYLOAD_LEN {
            return None;
        }
        let total = self.size();
        let out = buf.get_mut(..total)?;

        let header = FrameHeader::new(self.command, self.payload.len() as u16);
        header.encode(out)?;
        out[FrameHeader::SIZE..total - TAIL_SIZE].copy_from_slice(self.payload);
        out[total - TAIL_SIZE..].copy_from_slice(&PACKET_TAIL.to_be_bytes());

        Some(total)
    }

    /// Calculate the total frame size
    pub const fn size(&self) -> usize {
        FrameHeader::SIZE + self.payload.len() + TAIL_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::constants::CMD_DL_REPORT;

    #[test]
    fn test_header_parse() {
        let data = [
            0x24, 0x79, 0x77, 0x40, // identifier
            0x01, // version
            0x00, // message id
            0x01, // DLReport
            0x00, 0x22, // payload length (34)
        ];

        let header = FrameHeader::parse(&data).unwrap();
        assert_eq!(header.version, 1);
        assert_eq!(header.command, CMD_DL_REPORT);
        assert_eq!(header.payload_len, 34);
        assert_eq!(header.command_code(), Some(CommandCode::DlReport));
        assert_eq!(header.frame_len(), 45);
    }

    #[test]
    fn test_header_parse_rejects_short_or_misaligned() {
        assert!(FrameHeader::parse(&[0x24, 0x79, 0x77]).is_none());
        let data = [0x00, 0x24, 0x79, 0x77, 0x40, 0x01, 0x00, 0x01, 0x00, 0x22];
        assert!(FrameHeader::parse(&data).is_none());
    }

    #[test]
    fn test_frame_builder() {
        let body = [0xAA, 0xBB, 0xCC];
        let builder = FrameBuilder::new(CommandCode::ErrorReport, &body);

        let mut buf = [0u8; 32];
        let size = builder.build(&mut buf).unwrap();

        assert_eq!(size, 14); // 9 (header) + 3 (body) + 2 (tail)
        assert_eq!(&buf[..4], &PACKET_IDENTIFIER);
        assert_eq!(buf[6], 2);
        assert_eq!(&buf[7..9], &[0x00, 0x03]);
        assert_eq!(&buf[9..12], &body);
        assert_eq!(&buf[12..14], &[0x71, 0x21]);
    }

    #[test]
    fn test_frame_builder_buffer_too_small() {
        let builder = FrameBuilder::new(CommandCode::Alarm, &[]);
        let mut buf = [0u8; 10];
        assert!(builder.build(&mut buf).is_none());
    }

    #[test]
    fn test_frame_parse() {
        let mut buf = [0u8; 32];
        let size = FrameBuilder::new(CommandCode::Alarm, &[0x01, 0x02])
            .build(&mut buf)
            .unwrap();

        let frame = Frame::parse(&buf[..size]).unwrap();
        assert_eq!(frame.header().command, 14);
        assert_eq!(frame.payload(), &[0x01, 0x02]);
    }

    #[test]
    fn test_frame_parse_bad_tail() {
        let mut buf = [0u8; 32];
        let size = FrameBuilder::new(CommandCode::Alarm, &[])
            .build(&mut buf)
            .unwrap();
        buf[size - 1] = 0xFF;

        assert_eq!(
            Frame::parse(&buf[..size]),
            Err(FramingError::BadTail { found: 0x71FF })
        );
    }

    #[test]
    fn test_frame_new_rejects_length_mismatch() {
        let header = FrameHeader::new(CommandCode::DlReport, 4);
        assert!(Frame::new(header, &[0x00; 3]).is_none());
    }
}
