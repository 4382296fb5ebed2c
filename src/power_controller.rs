use log::{debug, info, warn};
use rust_fsm::StateMachine;
use tokio::time::sleep;

use crate::power_state_machine::{advance, Input, Output, PowerOnMachine};
use crate::{
    ControllerSettings, HttpStateProbe, RemoteCommander, RemoteKey, StateProbe, TargetDevice,
    TvError, WakeSender, WebSocketRemote, WolSender,
};

// ================================================================================================
// PowerController
//
// Design notes:
//
//  - The controller holds no mutable state. Every call opens and releases its own sockets, so
//    a single controller can be shared (e.g. in an `Arc`) between a periodic refresh task and
//    on-demand get/set requests.
//  - Power-on is verified: Wake-on-LAN is sent, a grace period is waited out, then the TV is
//    probed. An unreachable TV yields `TvError::WakeTimeout`.
//  - Power-off is not verified. Probing immediately after the power key races the TV's own
//    shutdown and would report it as still on. The accepted WebSocket authorization is the only
//    confirmation; the actual transition to off is never observed.
//  - Nothing is retried. Retry policy belongs to the caller.
// ================================================================================================

/// Turn a TV on and off, and report whether it is on.
///
/// ```no_run
/// use samsung_tv_switch::{ControllerSettings, PowerController, TargetDevice};
///
/// #[tokio::main]
/// async fn main() {
///     let controller = PowerController::new(ControllerSettings::default());
///     let tv = TargetDevice::new("10.0.0.101", "AA:BB:CC:DD:EE:FF");
///
///     if !controller.get_state(&tv).await {
///         if let Err(e) = controller.power_on(&tv).await {
///             eprintln!("Could not turn TV on: {e}");
///         }
///     }
/// }
/// ```
pub struct PowerController {
    settings: ControllerSettings,
    waker: Box<dyn WakeSender>,
    probe: Box<dyn StateProbe>,
    remote: Box<dyn RemoteCommander>,
}

impl PowerController {
    /// Creates a `PowerController` which talks to the TV over the network.
    ///
    /// Use [`PowerControllerBuilder`] to substitute any of the network leaves.
    pub fn new(settings: ControllerSettings) -> Self {
        PowerControllerBuilder::new(settings).build()
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    /// Whether the TV is currently on (reachable). Never fails.
    pub async fn get_state(&self, device: &TargetDevice) -> bool {
        let is_on = self.probe.probe(&device.ip_address).await;
        debug!("TV {} is {}", device.ip_address, if is_on { "on" } else { "off" });

        is_on
    }

    /// Wake the TV and confirm that it came up.
    ///
    /// Errors from sending the wake signal are returned untouched. If the wake signal was sent
    /// but the TV is still unreachable after the grace period, [`TvError::WakeTimeout`] is
    /// returned.
    pub async fn power_on(&self, device: &TargetDevice) -> Result<(), TvError> {
        info!("Turning on TV {}", device);

        let mut fsm: StateMachine<PowerOnMachine> = StateMachine::new();

        if let Err(e) = self.waker.wake(&device.mac_address).await {
            warn!("Could not send wake signal to {}: {}", device, e);
            advance(&mut fsm, Input::WakeFailed);

            return Err(e);
        }

        advance(&mut fsm, Input::WakeSent);
        advance(&mut fsm, Input::StartGracePeriod);

        sleep(self.settings.wake_grace_period).await;

        advance(&mut fsm, Input::GracePeriodElapsed);

        let is_on = self.probe.probe(&device.ip_address).await;

        match advance(
            &mut fsm,
            if is_on {
                Input::ProbeSucceeded
            } else {
                Input::ProbeFailed
            },
        ) {
            Some(Output::Confirmed) => {
                info!("TV {} is on", device);
                Ok(())
            }
            _ => {
                warn!(
                    "Wake signal sent but TV {} did not respond within {:?}",
                    device, self.settings.wake_grace_period
                );
                Err(TvError::WakeTimeout)
            }
        }
    }

    /// Send the power key to turn the TV off. The result is not verified.
    pub async fn power_off(&self, device: &TargetDevice) -> Result<(), TvError> {
        info!("Turning off TV {}", device);

        self.remote.send_power_off(&device.ip_address).await
    }

    /// Send any remote key to the TV.
    pub async fn send_key(&self, device: &TargetDevice, key: RemoteKey) -> Result<(), TvError> {
        info!("Sending {} to TV {}", key, device);

        self.remote.send_key(&device.ip_address, key).await
    }
}

// ================================================================================================
// PowerControllerBuilder

/// Build a [`PowerController`] instance.
///
/// ```
/// use samsung_tv_switch::{
///     ControllerSettings, HttpStateProbe, PowerControllerBuilder, WebSocketRemote, WolSender,
/// };
///
/// let settings = ControllerSettings::default();
///
/// let controller = PowerControllerBuilder::new(settings.clone())
///     .with_wake_sender(WolSender::new(&settings))
///     .with_state_probe(HttpStateProbe::new(&settings))
///     .with_remote_commander(WebSocketRemote::new(&settings))
///     .build();
/// ```
pub struct PowerControllerBuilder {
    settings: ControllerSettings,
    waker: Option<Box<dyn WakeSender>>,
    probe: Option<Box<dyn StateProbe>>,
    remote: Option<Box<dyn RemoteCommander>>,
}

impl PowerControllerBuilder {
    pub fn new(settings: ControllerSettings) -> Self {
        PowerControllerBuilder {
            settings,
            waker: None,
            probe: None,
            remote: None,
        }
    }

    /// Override how Wake-on-LAN is sent.
    pub fn with_wake_sender(mut self, waker: impl WakeSender + 'static) -> Self {
        self.waker = Some(Box::new(waker));
        self
    }

    /// Override how the TV's state is determined.
    pub fn with_state_probe(mut self, probe: impl StateProbe + 'static) -> Self {
        self.probe = Some(Box::new(probe));
        self
    }

    /// Override how remote keys are sent.
    pub fn with_remote_commander(mut self, remote: impl RemoteCommander + 'static) -> Self {
        self.remote = Some(Box::new(remote));
        self
    }

    pub fn build(self) -> PowerController {
        let settings = self.settings;

        PowerController {
            waker: self
                .waker
                .unwrap_or_else(|| Box::new(WolSender::new(&settings))),
            probe: self
                .probe
                .unwrap_or_else(|| Box::new(HttpStateProbe::new(&settings))),
            remote: self
                .remote
                .unwrap_or_else(|| Box::new(WebSocketRemote::new(&settings))),
            settings,
        }
    }
}

// ================================================================================================
// Tests
