//! Power Watchdog protocol constants and command codes.

/// GATT service exposing the Watchdog data characteristic
pub const SERVICE_UUID: &str = "0000ff01-0000-1000-8000-00805f9b34fb";

/// Characteristic used for both notifications and command writes
pub const CHARACTERISTIC_UUID: &str = "0000ff01-0000-1000-8000-00805f9b34fb";

/// Start-of-frame identifier (big-endian `0x24797740`)
pub const PACKET_IDENTIFIER: [u8; 4] = [0x24, 0x79, 0x77, 0x40];

/// End-of-frame marker (big-endian `0x7121`)
pub const PACKET_TAIL: u16 = 0x7121;

/// Header: identifier (4) + version (1) + message id (1) + command (1) + length (2)
pub const HEADER_SIZE: usize = 9;

/// Tail size in bytes
pub const TAIL_SIZE: usize = 2;

/// Protocol version written into outbound frames
pub const PROTOCOL_VERSION: u8 = 0x01;

/// Size of one per-line DLData block
pub const DL_DATA_SIZE: usize = 34;

/// Default upper bound for a declared payload length
pub const MAX_PAYLOAD_LEN: usize = 256;

/// Largest notification a BLE link can deliver (ATT value limit)
pub const MAX_CHUNK_LEN: usize = 512;

/// Capacity of the reassembly buffer.
///
/// Always holds one maximal incomplete frame plus one maximal chunk.
pub const BUFFER_CAPACITY: usize = 1024;

const _: () = assert!(HEADER_SIZE + MAX_PAYLOAD_LEN + TAIL_SIZE + MAX_CHUNK_LEN <= BUFFER_CAPACITY);

/// Handshake the host writes after subscribing. Telemetry starts only after it.
pub const HANDSHAKE_PAYLOAD: &[u8; 19] = b"!%!%,protocol,open,";

// =============================================================================
// Command Codes
// =============================================================================

/// Command code for a DLReport (telemetry) frame
pub const CMD_DL_REPORT: u8 = 1;
/// Command code for an ErrorReport frame
pub const CMD_ERROR_REPORT: u8 = 2;
/// Command code for the reset-energy request
pub const CMD_RESET_ENERGY: u8 = 3;
/// Command code for an Alarm notification
pub const CMD_ALARM: u8 = 14;

/// Known Power Watchdog command codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum CommandCode {
    /// `DLReport` - periodic line measurements
    DlReport = CMD_DL_REPORT,
    /// `ErrorReport` - device error history record
    ErrorReport = CMD_ERROR_REPORT,
    /// `ResetEnergy` - zero the accumulated energy counter (outbound only)
    ResetEnergy = CMD_RESET_ENERGY,
    /// `Alarm` - asynchronous alarm notification
    Alarm = CMD_ALARM,
}

impl CommandCode {
    /// Convert a raw command byte to `CommandCode`
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            CMD_DL_REPORT => Some(Self::DlReport),
            CMD_ERROR_REPORT => Some(Self::ErrorReport),
            CMD_RESET_ENERGY => Some(Self::ResetEnergy),
            CMD_ALARM => Some(Self::Alarm),
            _ => None,
        }
    }

    /// Convert `CommandCode` to its raw byte
    pub const fn to_u8(self) -> u8 {
        self as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_value() {
        assert_eq!(u32::from_be_bytes(PACKET_IDENTIFIER), 0x2479_7740);
    }

    #[test]
    fn test_command_code_roundtrip() {
        for code in [
            CommandCode::DlReport,
            CommandCode::ErrorReport,
            CommandCode::ResetEnergy,
            CommandCode::Alarm,
        ] {
            assert_eq!(CommandCode::from_u8(code.to_u8()), Some(code));
        }
        assert_eq!(CommandCode::from_u8(99), None);
    }

    #[test]
    fn test_handshake_is_ascii() {
        assert_eq!(HANDSHAKE_PAYLOAD.len(), 19);
        assert!(HANDSHAKE_PAYLOAD.is_ascii());
    }
}
