//! Wake the TV from standby with a Wake-on-LAN magic packet.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

use async_trait::async_trait;
use log::{debug, info, warn};
use tokio::net::UdpSocket;

use crate::magic_packet::{MagicPacket, MAGIC_PACKET_LEN};
use crate::{ControllerSettings, TvError};

/// Sends a wake signal to a TV identified by its MAC address.
#[async_trait]
pub trait WakeSender: Send + Sync {
    /// Send a single wake signal. Delivery is not acknowledged by the TV.
    async fn wake(&self, mac_address: &str) -> Result<(), TvError>;
}

/// [`WakeSender`] which broadcasts a magic packet as one UDP datagram.
///
/// The packet is sent to `255.255.255.255:9` unless overridden by
/// [`ControllerSettings::wake_broadcast_addr`]. No retries are attempted.
#[derive(Debug, Clone)]
pub struct WolSender {
    broadcast_addr: SocketAddr,
}

impl WolSender {
    pub fn new(settings: &ControllerSettings) -> Self {
        WolSender {
            broadcast_addr: settings.wake_broadcast_addr,
        }
    }
}

impl Default for WolSender {
    fn default() -> Self {
        WolSender::new(&ControllerSettings::default())
    }
}

#[async_trait]
impl WakeSender for WolSender {
    async fn wake(&self, mac_address: &str) -> Result<(), TvError> {
        // A malformed MAC fails here, before any socket is opened
        let packet: MagicPacket = mac_address.parse()?;

        info!(
            "Sending Wake-on-LAN to {} via {}",
            mac_address, self.broadcast_addr
        );

        let bind_addr: SocketAddr = match self.broadcast_addr {
            SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
            SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
        };

        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|e| TvError::SocketError(format!("Could not bind UDP socket: {e}")))?;

        socket
            .set_broadcast(true)
            .map_err(|e| TvError::SocketError(format!("Could not enable broadcast: {e}")))?;

        let written = socket
            .send_to(packet.as_bytes(), self.broadcast_addr)
            .await
            .map_err(|e| TvError::SocketError(format!("Could not send magic packet: {e}")))?;

        if written != MAGIC_PACKET_LEN {
            warn!(
                "Wake-on-LAN short write: {} of {} bytes",
                written, MAGIC_PACKET_LEN
            );

            return Err(TvError::ShortWrite {
                written,
                expected: MAGIC_PACKET_LEN,
            });
        }

        debug!("Wake-on-LAN packet sent ({} bytes)", written);

        Ok(())
    }
}

// ================================================================================================
// Tests
