//! Wake-on-LAN magic packet construction.

use std::str::FromStr;

use macaddr::MacAddr6;

use crate::TvError;

const SYNC_STREAM_LEN: usize = 6;
const MAC_REPETITIONS: usize = 16;

/// Length in bytes of a magic packet: 6 sync bytes plus the MAC repeated 16 times.
pub const MAGIC_PACKET_LEN: usize = SYNC_STREAM_LEN + MAC_REPETITIONS * 6;

/// A Wake-on-LAN magic packet.
///
/// ```
/// use samsung_tv_switch::MagicPacket;
///
/// let packet: MagicPacket = "AA:BB:CC:DD:EE:FF".parse().unwrap();
///
/// assert_eq!(packet.as_bytes().len(), 102);
/// assert_eq!(&packet.as_bytes()[..6], &[0xFF; 6]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MagicPacket([u8; MAGIC_PACKET_LEN]);

impl MagicPacket {
    pub fn new(mac: MacAddr6) -> Self {
        let mut bytes = [0xFF; MAGIC_PACKET_LEN];

        for chunk in bytes[SYNC_STREAM_LEN..].chunks_exact_mut(6) {
            chunk.copy_from_slice(mac.as_bytes());
        }

        MagicPacket(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for MagicPacket {
    type Err = TvError;

    fn from_str(mac_address: &str) -> Result<Self, Self::Err> {
        let mac = MacAddr6::from_str(mac_address.trim()).map_err(|e| {
            TvError::InvalidAddress(format!("Invalid MAC address '{mac_address}': {e}"))
        })?;

        Ok(MagicPacket::new(mac))
    }
}

// ================================================================================================
// Tests
