//! On/off switch handling for the accessory bridge.
//!
//! The bridge layer (which exposes the switch to a smart-home client) invokes a
//! [`SwitchHandler`] when the client reads or writes the switch value. [`TvSwitch`] maps those
//! requests onto a [`PowerController`].

use std::sync::Arc;

use async_trait::async_trait;
use log::{error, info};

use crate::{PowerController, RemoteKey, TargetDevice, TvError};

/// Capabilities of a remotely-controlled on/off switch.
#[async_trait]
pub trait SwitchHandler: Send + Sync {
    /// The client is reading the switch value.
    async fn on_get(&self) -> bool;

    /// The client is setting the switch value.
    async fn on_set(&self, on: bool) -> Result<(), TvError>;
}

/// [`SwitchHandler`] for a single TV.
#[derive(Clone)]
pub struct TvSwitch {
    device: TargetDevice,
    controller: Arc<PowerController>,
}

impl TvSwitch {
    pub fn new(device: TargetDevice, controller: Arc<PowerController>) -> Self {
        TvSwitch { device, controller }
    }

    pub fn device(&self) -> &TargetDevice {
        &self.device
    }

    /// Send a remote key other than power (volume, mute, etc).
    pub async fn send_key(&self, key: RemoteKey) -> Result<(), TvError> {
        let result = self.controller.send_key(&self.device, key).await;

        if let Err(e) = &result {
            error!("Could not send {} to TV: {}", key, e);
        }

        result
    }
}

#[async_trait]
impl SwitchHandler for TvSwitch {
    async fn on_get(&self) -> bool {
        self.controller.get_state(&self.device).await
    }

    async fn on_set(&self, on: bool) -> Result<(), TvError> {
        let result = if on {
            info!("Turn on");
            self.controller.power_on(&self.device).await
        } else {
            info!("Turn off");
            self.controller.power_off(&self.device).await
        };

        if let Err(e) = &result {
            error!("Could not turn TV {}: {}", if on { "on" } else { "off" }, e);
        }

        result
    }
}

// ================================================================================================
// Tests
