use thiserror::Error;

/// Errors returned by the TV control operations.
///
/// Each WebSocket variant identifies the stage of the remote-control session which failed, so a
/// caller can tell "could not reach the TV" apart from "the TV dropped us after the command".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
pub enum TvError {
    /// A MAC address or host could not be used (bad hex, wrong octet count, empty host, etc).
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    /// The Wake-on-LAN UDP socket could not be created or written to.
    #[error("socket error: {0}")]
    SocketError(String),
    /// The operating system accepted fewer Wake-on-LAN bytes than the full magic packet.
    #[error("short write: sent {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },
    /// The WebSocket connection (including its handshake) could not be established.
    #[error("could not connect to TV: {0}")]
    ConnectError(String),
    /// The TV's authorization frame was not received, or remote control access was denied.
    #[error("TV authorization failed: {0}")]
    HandshakeError(String),
    /// The remote key command could not be sent.
    #[error("could not send command to TV: {0}")]
    CommandError(String),
    /// The closing frame could not be sent. The command itself was already delivered.
    #[error("could not close TV connection: {0}")]
    CloseError(String),
    /// Wake-on-LAN was sent but the TV was still unreachable after the grace period.
    #[error("wol: timeout")]
    WakeTimeout,
}

// ================================================================================================
// Tests
