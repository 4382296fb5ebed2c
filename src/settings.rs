use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;

pub(crate) const DEFAULT_REMOTE_PORT: u16 = 8001;
pub(crate) const DEFAULT_APP_NAME: &str = "SamsungTvRemote";
const WOL_DISCARD_PORT: u16 = 9;

/// Settings shared by the [`PowerController`](crate::PowerController) and the network leaves it
/// composes. Can be created with [`ControllerSettingsBuilder`].
///
/// Settings are fixed for the lifetime of a controller; there is no global configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerSettings {
    /// Port used for both the HTTP liveness probe and the WebSocket remote endpoint.
    pub remote_port: u16,
    /// Timeout for the HTTP liveness probe.
    pub probe_timeout: Duration,
    /// Timeout for establishing the WebSocket connection (TCP connect and HTTP upgrade).
    pub handshake_timeout: Duration,
    /// How long to wait for the TV's authorization frame once connected.
    pub auth_timeout: Duration,
    /// Delay between sending Wake-on-LAN and probing the TV.
    pub wake_grace_period: Duration,
    /// Delay between sending a remote key and closing the WebSocket.
    pub command_settle_delay: Duration,
    /// Destination of the Wake-on-LAN magic packet.
    pub wake_broadcast_addr: SocketAddr,
    /// Client name announced to the TV (sent base64-encoded).
    pub app_name: String,
    /// Interval between background state refreshes.
    pub refresh_interval: Duration,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        ControllerSettingsBuilder::new().build()
    }
}

/// Build a [`ControllerSettings`] instance.
///
/// Examples:
/// ```
/// use std::time::Duration;
///
/// use samsung_tv_switch::ControllerSettingsBuilder;
///
/// // Default settings
/// ControllerSettingsBuilder::default().build();
///
/// // Settings with overrides
/// ControllerSettingsBuilder::new()
///     .with_remote_port(8002)
///     .with_wake_grace_period(Duration::from_secs(2))
///     .with_app_name("LivingRoomBridge")
///     .build();
/// ```
pub struct ControllerSettingsBuilder {
    remote_port: u16,
    probe_timeout: Duration,
    handshake_timeout: Duration,
    auth_timeout: Duration,
    wake_grace_period: Duration,
    command_settle_delay: Duration,
    wake_broadcast_addr: SocketAddr,
    app_name: String,
    refresh_interval: Duration,
}

impl Default for ControllerSettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ControllerSettingsBuilder {
    pub fn new() -> Self {
        Self {
            remote_port: DEFAULT_REMOTE_PORT,
            probe_timeout: Duration::from_millis(500),
            handshake_timeout: Duration::from_millis(500),
            auth_timeout: Duration::from_secs(30),
            wake_grace_period: Duration::from_millis(750),
            command_settle_delay: Duration::from_millis(750),
            wake_broadcast_addr: SocketAddr::V4(SocketAddrV4::new(
                Ipv4Addr::BROADCAST,
                WOL_DISCARD_PORT,
            )),
            app_name: DEFAULT_APP_NAME.to_string(),
            refresh_interval: Duration::from_secs(60),
        }
    }

    pub fn with_remote_port(mut self, port: u16) -> Self {
        self.remote_port = port;
        self
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    pub fn with_auth_timeout(mut self, timeout: Duration) -> Self {
        self.auth_timeout = timeout;
        self
    }

    pub fn with_wake_grace_period(mut self, delay: Duration) -> Self {
        self.wake_grace_period = delay;
        self
    }

    pub fn with_command_settle_delay(mut self, delay: Duration) -> Self {
        self.command_settle_delay = delay;
        self
    }

    pub fn with_wake_broadcast_addr(mut self, addr: SocketAddr) -> Self {
        self.wake_broadcast_addr = addr;
        self
    }

    pub fn with_app_name(mut self, app_name: &str) -> Self {
        self.app_name = app_name.to_string();
        self
    }

    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    pub fn build(self) -> ControllerSettings {
        ControllerSettings {
            remote_port: self.remote_port,
            probe_timeout: self.probe_timeout,
            handshake_timeout: self.handshake_timeout,
            auth_timeout: self.auth_timeout,
            wake_grace_period: self.wake_grace_period,
            command_settle_delay: self.command_settle_delay,
            wake_broadcast_addr: self.wake_broadcast_addr,
            app_name: self.app_name,
            refresh_interval: self.refresh_interval,
        }
    }
}

// ================================================================================================
// Tests
