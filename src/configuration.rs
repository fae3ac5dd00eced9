//! Per-session configuration.
//!
//! Defaults match the device's observed behaviour; hosts normally never
//! change them. Values are clamped to what the fixed-capacity buffer can hold.

use crate::protocol::constants::{BUFFER_CAPACITY, MAX_PAYLOAD_LEN};

/// Tunables for one device session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionConfig {
    max_payload_len: u16,
    scan_window: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionConfig {
    /// Default configuration
    pub const fn new() -> Self {
        Self {
            max_payload_len: MAX_PAYLOAD_LEN as u16,
            scan_window: BUFFER_CAPACITY,
        }
    }

    /// Set the largest payload length a header may declare (clamped to
    /// [`MAX_PAYLOAD_LEN`])
    #[must_use]
    pub const fn with_max_payload_len(mut self, len: u16) -> Self {
        self.max_payload_len = clamp_payload_len(len);
        self
    }

    /// Set how many bytes are searched for a frame identifier before the
    /// buffer is dropped (clamped to `1..=BUFFER_CAPACITY`)
    #[must_use]
    pub const fn with_scan_window(mut self, window: usize) -> Self {
        self.scan_window = clamp_scan_window(window);
        self
    }

    /// Largest accepted declared payload length
    #[inline]
    pub const fn max_payload_len(&self) -> u16 {
        clamp_payload_len(self.max_payload_len)
    }

    /// Identifier scan window in bytes
    #[inline]
    pub const fn scan_window(&self) -> usize {
        clamp_scan_window(self.scan_window)
    }
}

// Getters clamp too: deserialized values never pass through the builders.
const fn clamp_payload_len(len: u16) -> u16 {
    if len as usize > MAX_PAYLOAD_LEN {
        MAX_PAYLOAD_LEN as u16
    } else {
        len
    }
}

const fn clamp_scan_window(window: usize) -> usize {
    if window == 0 {
        1
    } else if window > BUFFER_CAPACITY {
        BUFFER_CAPACITY
    } else {
        window
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FramingError;
    use crate::protocol::reassembly::ReassemblyBuffer;
    use std::vec::Vec;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.max_payload_len(), 256);
        assert_eq!(config.scan_window(), BUFFER_CAPACITY);
    }

    #[test]
    fn test_clamping() {
        let config = SessionConfig::new()
            .with_max_payload_len(u16::MAX)
            .with_scan_window(0);
        assert_eq!(config.max_payload_len(), MAX_PAYLOAD_LEN as u16);
        assert_eq!(config.scan_window(), 1);

        let config = SessionConfig::new().with_scan_window(usize::MAX);
        assert_eq!(config.scan_window(), BUFFER_CAPACITY);
    }

    #[test]
    fn test_unclamped_fields_are_bounded() {
        // As produced by deserialization
        let config = SessionConfig {
            max_payload_len: u16::MAX,
            scan_window: usize::MAX,
        };
        assert_eq!(config.max_payload_len(), MAX_PAYLOAD_LEN as u16);
        assert_eq!(config.scan_window(), BUFFER_CAPACITY);

        let mut rx = ReassemblyBuffer::new(config);
        let out: Vec<_> = rx.feed(&[0x55; 8]).collect();
        assert_eq!(out, [Err(FramingError::Skipped { bytes: 8 })]);
    }
}
