//! Outbound command encoding.
//!
//! Commands use the same frame format as inbound telemetry. The device sends
//! no acknowledgement; a host confirms a reset by watching the energy value in
//! the next telemetry record drop.

use crate::protocol::constants::{
    CommandCode, HANDSHAKE_PAYLOAD, HEADER_SIZE, PACKET_IDENTIFIER, PACKET_TAIL, PROTOCOL_VERSION,
    TAIL_SIZE,
};

/// Payload of the reset-energy request
const RESET_ENERGY_BODY: [u8; 1] = [0x01];

/// Size of the encoded reset-energy frame
pub const RESET_ENERGY_LEN: usize = HEADER_SIZE + RESET_ENERGY_BODY.len() + TAIL_SIZE;

const fn encode_reset_energy() -> [u8; RESET_ENERGY_LEN] {
    let ident = PACKET_IDENTIFIER;
    let len = (RESET_ENERGY_BODY.len() as u16).to_be_bytes();
    let tail = PACKET_TAIL.to_be_bytes();
    [
        ident[0],
        ident[1],
        ident[2],
        ident[3],
        PROTOCOL_VERSION,
        0x00,
        CommandCode::ResetEnergy.to_u8(),
        len[0],
        len[1],
        RESET_ENERGY_BODY[0],
        tail[0],
        tail[1],
    ]
}

/// Zero the device's accumulated energy counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ResetEnergyCommand;

impl ResetEnergyCommand {
    const BYTES: [u8; RESET_ENERGY_LEN] = encode_reset_energy();

    /// Encoded command frame
    #[inline]
    pub const fn as_bytes(&self) -> &'static [u8; RESET_ENERGY_LEN] {
        &Self::BYTES
    }
}

/// Build the reset-energy command frame.
#[inline]
pub const fn build_reset_energy_command() -> [u8; RESET_ENERGY_LEN] {
    ResetEnergyCommand::BYTES
}

/// Handshake the host writes once notifications are enabled.
#[inline]
pub const fn build_handshake() -> &'static [u8] {
    HANDSHAKE_PAYLOAD
}
