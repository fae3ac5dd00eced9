//! Reassembly of BLE notification fragments into complete frames.
//!
//! A notification may carry part of a frame, exactly one frame, or several
//! frames back to back. [`ReassemblyBuffer`] accumulates bytes in a fixed
//! capacity buffer and yields each frame once all of its bytes are present.
//!
//! Malformed input is never fatal. Garbage before an identifier is skipped,
//! a header announcing an oversized payload is abandoned without trusting its
//! length, and a frame with a corrupt tail is dropped. Each of these is
//! reported as a [`FramingError`] and extraction continues.
//!
//! ```rust,ignore
//! let mut rx = ReassemblyBuffer::new(SessionConfig::default());
//! for chunk in notifications {
//!     for frame in rx.feed(chunk).filter_map(Result::ok) {
//!         // classify and decode...
//!     }
//! }
//! ```

use heapless::Vec;

use crate::configuration::SessionConfig;
use crate::error::FramingError;
use crate::protocol::constants::{BUFFER_CAPACITY, PACKET_IDENTIFIER, PACKET_TAIL, TAIL_SIZE};
use crate::protocol::frame::{Frame, FrameHeader};

/// Fixed-capacity accumulation area for one in-progress frame.
#[derive(Debug, Clone)]
pub struct ReassemblyBuffer {
    buf: Vec<u8, BUFFER_CAPACITY>,
    config: SessionConfig,
}

impl Default for ReassemblyBuffer {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl ReassemblyBuffer {
    /// Create an empty buffer
    pub const fn new(config: SessionConfig) -> Self {
        Self {
            buf: Vec::new(),
            config,
        }
    }

    /// Append a chunk and iterate over the frames it completes.
    ///
    /// The chunk is copied in as space frees up, so it may be longer than
    /// the buffer. Frames not pulled from the iterator stay buffered for the
    /// next call.
    pub fn feed<'a>(&'a mut self, chunk: &'a [u8]) -> Frames<'a> {
        Frames {
            buffer: self,
            pending: chunk,
        }
    }

    /// Extract the next frame, topping up from `pending` as space allows.
    ///
    /// `pending` is advanced past every byte copied into the buffer. Returns
    /// `None` once `pending` is exhausted and no complete frame remains.
    pub fn next_frame_from(&mut self, pending: &mut &[u8]) -> Option<Result<Frame, FramingError>> {
        loop {
            if let Some(result) = self.next_frame() {
                return Some(result);
            }
            if pending.is_empty() {
                return None;
            }
            if self.buf.is_full() {
                let dropped = self.buf.len();
                self.buf.clear();
                wd_log!(warn, "RX buffer overflow, dropped {} bytes", dropped);
                return Some(Err(FramingError::Overflow { dropped }));
            }
            *pending = self.fill(*pending);
        }
    }

    /// Extract the next frame, if one is complete.
    ///
    /// Returns `None` when more data is needed. A `Some(Err(_))` means bytes
    /// were discarded; call again to continue.
    pub fn next_frame(&mut self) -> Option<Result<Frame, FramingError>> {
        let skipped = self.align();
        if skipped > 0 {
            wd_log!(debug, "Resync skipped {} bytes", skipped);
            return Some(Err(FramingError::Skipped { bytes: skipped }));
        }

        let header = FrameHeader::parse(&self.buf)?;

        if header.payload_len > self.config.max_payload_len() {
            // Drop only the identifier; the length field cannot be trusted.
            wd_log!(debug, "Invalid payload length {}, skipping identifier", header.payload_len);
            self.consume(PACKET_IDENTIFIER.len());
            return Some(Err(FramingError::Oversized {
                declared: header.payload_len,
            }));
        }

        let total = header.frame_len();
        if self.buf.len() < total {
            return None;
        }

        let tail = u16::from_be_bytes([self.buf[total - 2], self.buf[total - 1]]);
        let frame = if tail == PACKET_TAIL {
            Frame::new(header, &self.buf[FrameHeader::SIZE..total - TAIL_SIZE]).ok_or(
                FramingError::Oversized {
                    declared: header.payload_len,
                },
            )
        } else {
            wd_log!(debug, "Bad tail 0x{:04X}, discarding frame", tail);
            Err(FramingError::BadTail { found: tail })
        };

        self.consume(total);
        Some(frame)
    }

    /// Discard everything buffered
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Number of buffered bytes
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if nothing is buffered
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Drop bytes until the buffer starts with an identifier.
    ///
    /// Returns the number of bytes dropped. If no identifier appears within
    /// the scan window the whole buffer is dropped; otherwise a trailing
    /// partial identifier is kept so a header split across chunks survives.
    fn align(&mut self) -> usize {
        let len = self.buf.len();
        let ident = PACKET_IDENTIFIER.len();
        if len == 0 || self.buf.starts_with(&PACKET_IDENTIFIER) {
            return 0;
        }

        let window = len.min(self.config.scan_window().saturating_add(ident - 1));
        if let Some(pos) = self.buf[..window]
            .windows(ident)
            .position(|w| w == PACKET_IDENTIFIER)
        {
            self.consume(pos);
            return pos;
        }

        if len >= self.config.scan_window() {
            self.buf.clear();
            return len;
        }

        let keep = (1..ident.min(len + 1))
            .rev()
            .find(|&n| self.buf[len - n..] == PACKET_IDENTIFIER[..n])
            .unwrap_or(0);
        let drop = len - keep;
        self.consume(drop);
        drop
    }

    /// Copy as much of `chunk` as fits and return the rest.
    fn fill<'c>(&mut self, chunk: &'c [u8]) -> &'c [u8] {
        let n = chunk.len().min(self.buf.capacity() - self.buf.len());
        let (head, rest) = chunk.split_at(n);
        // `head` fits by construction
        let _ = self.buf.extend_from_slice(head);
        rest
    }

    fn consume(&mut self, n: usize) {
        let len = self.buf.len();
        let n = n.min(len);
        self.buf.copy_within(n.., 0);
        self.buf.truncate(len - n);
    }
}

/// Iterator over frames completed by one [`ReassemblyBuffer::feed`] call.
///
/// Dropping it early keeps the unread part of the chunk buffered, as far as
/// it fits.
#[derive(Debug)]
#[must_use = "frames are only extracted when the iterator is consumed"]
pub struct Frames<'a> {
    buffer: &'a mut ReassemblyBuffer,
    pending: &'a [u8],
}

impl Iterator for Frames<'_> {
    type Item = Result<Frame, FramingError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buffer.next_frame_from(&mut self.pending)
    }
}

impl Drop for Frames<'_> {
    fn drop(&mut self) {
        let lost = self.buffer.fill(self.pending).len();
        if lost > 0 {
            wd_log!(warn, "Frames dropped early, lost {} unread bytes", lost);
        }
    }
}
