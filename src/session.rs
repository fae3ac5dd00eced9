//! Per-connection decoding session.
//!
//! A [`Session`] owns everything that must not leak between devices or
//! across reconnects: the reassembly buffer, the latched device model and the
//! most recent line 2 reading. The host creates one per connected device,
//! calls [`Session::feed`] for every notification, and
//! [`Session::on_connection_reset`] whenever the link is re-established.
//!
//! ## Example
//!
//! ```rust,ignore
//! use power_watchdog::{Session, WatchdogEvent};
//!
//! let mut session = Session::new();
//! for event in session.feed(notification) {
//!     match event {
//!         WatchdogEvent::Telemetry(record) => publish(record),
//!         WatchdogEvent::Diagnostic(diag) => note(diag),
//!     }
//! }
//! ```

use crate::configuration::SessionConfig;
use crate::error::{DecodeError, FramingError, WatchdogError};
use crate::model::{DeviceModel, ModelDetector};
use crate::protocol::classify::FrameKind;
use crate::protocol::frame::Frame;
use crate::protocol::reassembly::ReassemblyBuffer;
use crate::telemetry::{compute_totals, decode, LineReading, Telemetry, TelemetryRecord};

/// Something worth reporting that is not a telemetry record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Diagnostic {
    /// Bytes were discarded while reassembling
    Framing(FramingError),
    /// A telemetry frame was dropped
    Decode {
        /// Kind the frame was classified as
        kind: FrameKind,
        /// Why it was dropped
        error: DecodeError,
    },
    /// A non-telemetry frame was received and ignored
    Ignored(FrameKind),
}

/// Output of [`Session::feed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WatchdogEvent {
    /// Decoded measurements
    Telemetry(TelemetryRecord),
    /// Dropped data or ignored frame
    Diagnostic(Diagnostic),
}

impl Diagnostic {
    /// The error behind this diagnostic; `None` for ignored frames
    pub const fn error(&self) -> Option<WatchdogError> {
        match *self {
            Self::Framing(e) => Some(WatchdogError::Framing(e)),
            Self::Decode { error, .. } => Some(WatchdogError::Decode(error)),
            Self::Ignored(_) => None,
        }
    }
}

impl WatchdogEvent {
    /// The telemetry record, if this is one
    pub const fn telemetry(&self) -> Option<&TelemetryRecord> {
        match self {
            Self::Telemetry(record) => Some(record),
            Self::Diagnostic(_) => None,
        }
    }

    /// The diagnostic, if this is one
    pub const fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            Self::Telemetry(_) => None,
            Self::Diagnostic(diag) => Some(diag),
        }
    }
}

/// Decoding state for one device connection.
#[derive(Debug, Clone, Default)]
pub struct Session {
    buffer: ReassemblyBuffer,
    detector: ModelDetector,
    last_line2: Option<LineReading>,
}

impl Session {
    /// Create a session with default configuration
    pub const fn new() -> Self {
        Self::with_config(SessionConfig::new())
    }

    /// Create a session with `config`
    pub const fn with_config(config: SessionConfig) -> Self {
        Self {
            buffer: ReassemblyBuffer::new(config),
            detector: ModelDetector::new(),
            last_line2: None,
        }
    }

    /// Feed one notification and iterate over the resulting events.
    ///
    /// Each `next()` processes at most one frame. Dropping the iterator
    /// processes every remaining frame of the chunk and discards the events,
    /// so the model and line state never lag behind the stream.
    pub fn feed<'a>(&'a mut self, chunk: &'a [u8]) -> Events<'a> {
        wd_log!(trace, "RX chunk {} bytes", chunk.len());
        Events {
            session: self,
            pending: chunk,
        }
    }

    /// Forget all per-connection state.
    ///
    /// Frame alignment and device identity do not survive a disconnect.
    pub fn on_connection_reset(&mut self) {
        wd_log!(debug, "Connection reset, clearing session state");
        self.buffer.clear();
        self.detector.reset();
        self.last_line2 = None;
    }

    /// Currently latched device model
    #[inline]
    pub const fn model(&self) -> DeviceModel {
        self.detector.state()
    }

    /// Bytes waiting for the rest of a frame
    #[inline]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    fn process(&mut self, frame: &Frame) -> WatchdogEvent {
        let kind = frame.kind();
        if !kind.is_telemetry() {
            match kind {
                FrameKind::Alarm => wd_log!(warn, "Alarm notification from Power Watchdog"),
                FrameKind::ErrorReport => {
                    wd_log!(debug, "ErrorReport received ({} bytes)", frame.payload().len());
                }
                _ => wd_log!(
                    debug,
                    "Unknown cmd {} ({} bytes)",
                    frame.header().command,
                    frame.payload().len()
                ),
            }
            return WatchdogEvent::Diagnostic(Diagnostic::Ignored(kind));
        }

        let telemetry = match decode(frame) {
            Ok(telemetry) => telemetry,
            Err(error) => return WatchdogEvent::Diagnostic(Diagnostic::Decode { kind, error }),
        };

        let model = self.detector.observe(kind);
        let line1 = *telemetry.line1();
        if let Telemetry::Dual(_, l2) = telemetry {
            self.last_line2 = Some(l2);
        }
        let line2 = match model {
            DeviceModel::DualLine => Some(self.last_line2.unwrap_or_default()),
            DeviceModel::Unknown | DeviceModel::SingleLine => None,
        };

        let totals = compute_totals(model, &line1, line2.as_ref());
        WatchdogEvent::Telemetry(TelemetryRecord {
            variant: model.variant(),
            line1,
            line2,
            total_power: totals.power,
            total_energy: totals.energy,
        })
    }
}

/// Iterator over events produced by one [`Session::feed`] call.
#[derive(Debug)]
#[must_use = "unread events are processed and discarded when dropped"]
pub struct Events<'a> {
    session: &'a mut Session,
    pending: &'a [u8],
}

impl Iterator for Events<'_> {
    type Item = WatchdogEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let event = match self.session.buffer.next_frame_from(&mut self.pending)? {
            Ok(frame) => self.session.process(&frame),
            Err(e) => WatchdogEvent::Diagnostic(Diagnostic::Framing(e)),
        };
        Some(event)
    }
}

impl Drop for Events<'_> {
    fn drop(&mut self) {
        for _event in self.by_ref() {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::constants::{CommandCode, DL_DATA_SIZE};
    use crate::protocol::frame::FrameBuilder;
    use crate::telemetry::{FixedPoint, Variant};
    use std::vec::Vec;

    fn block(power: i32, energy: i32) -> [u8; DL_DATA_SIZE] {
        let mut out = [0u8; DL_DATA_SIZE];
        out[0..4].copy_from_slice(&1_200_000i32.to_be_bytes());
        out[8..12].copy_from_slice(&power.to_be_bytes());
        out[12..16].copy_from_slice(&energy.to_be_bytes());
        out[28..32].copy_from_slice(&6000i32.to_be_bytes());
        out
    }

    fn packet(body: &[u8]) -> Vec<u8> {
        let mut buf = [0u8; 128];
        let n = FrameBuilder::new(CommandCode::DlReport, body)
            .build(&mut buf)
            .unwrap();
        buf[..n].to_vec()
    }

    fn dual(l1: [u8; DL_DATA_SIZE], l2: [u8; DL_DATA_SIZE]) -> Vec<u8> {
        let mut body = l1.to_vec();
        body.extend_from_slice(&l2);
        packet(&body)
    }

    fn records(session: &mut Session, chunk: &[u8]) -> Vec<TelemetryRecord> {
        session
            .feed(chunk)
            .filter_map(|e| e.telemetry().copied())
            .collect()
    }

    #[test]
    fn test_housekeeping_frame_keeps_line2() {
        let mut session = Session::new();
        let first = records(&mut session, &dual(block(7_000_000, 10_000), block(6_500_000, 8_000)));
        assert_eq!(first[0].variant, Variant::DualLine);

        // Single-line shaped frame while latched dual: line 2 is carried over
        let out = records(&mut session, &packet(&block(7_100_000, 10_001)));
        let record = out[0];
        assert_eq!(record.variant, Variant::DualLine);
        assert_eq!(record.line2.unwrap().power, FixedPoint::from_f64(650.0));
        assert_eq!(record.total_power, FixedPoint::from_f64(1360.0));
        assert_eq!(session.model(), DeviceModel::DualLine);
    }

    #[test]
    fn test_decode_error_does_not_latch() {
        let mut session = Session::new();
        let mut bad = block(0, 0);
        bad[0..4].copy_from_slice(&(-1i32).to_be_bytes());

        let events: Vec<_> = session.feed(&dual(bad, block(0, 0))).collect();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            WatchdogEvent::Diagnostic(Diagnostic::Decode {
                kind: FrameKind::DualLineTelemetry,
                error: DecodeError::OutOfRange { .. },
            })
        ));
        assert_eq!(session.model(), DeviceModel::Unknown);
    }

    #[test]
    fn test_reset_clears_buffer_and_line2() {
        let mut session = Session::new();
        records(&mut session, &dual(block(0, 0), block(0, 0)));
        let partial = packet(&block(0, 0));
        assert!(records(&mut session, &partial[..20]).is_empty());
        assert_eq!(session.buffered(), 20);

        session.on_connection_reset();
        assert_eq!(session.buffered(), 0);
        assert_eq!(session.model(), DeviceModel::Unknown);
        assert!(session.last_line2.is_none());
    }

    #[test]
    fn test_dropped_events_still_process_frames() {
        let mut session = Session::new();
        let frame = packet(&block(1_000_000, 0));
        for _ in 0..40 {
            let _ = session.feed(&frame);
        }
        assert_eq!(session.model(), DeviceModel::SingleLine);
        assert_eq!(session.buffered(), 0);

        // Partially read: the rest of the chunk is still processed
        let mut chunk = packet(&block(0, 0));
        chunk.extend(dual(block(0, 0), block(5_000_000, 0)));
        let first = session.feed(&chunk).next();
        assert!(first.is_some_and(|e| e.telemetry().is_some()));
        assert_eq!(session.model(), DeviceModel::DualLine);
        assert_eq!(session.buffered(), 0);
    }

    #[test]
    fn test_diagnostic_error() {
        let framing = Diagnostic::Framing(FramingError::BadTail { found: 0 });
        assert_eq!(
            framing.error(),
            Some(WatchdogError::Framing(FramingError::BadTail { found: 0 }))
        );

        let decode = Diagnostic::Decode {
            kind: FrameKind::SingleLineTelemetry,
            error: DecodeError::NotTelemetry,
        };
        assert!(matches!(decode.error(), Some(WatchdogError::Decode(_))));
        assert_eq!(Diagnostic::Ignored(FrameKind::Alarm).error(), None);
    }

    #[test]
    fn test_sessions_are_independent() {
        let mut a = Session::new();
        let mut b = Session::new();
        records(&mut a, &dual(block(0, 0), block(0, 0)));
        records(&mut b, &packet(&block(0, 0)));
        assert_eq!(a.model(), DeviceModel::DualLine);
        assert_eq!(b.model(), DeviceModel::SingleLine);
    }
}
