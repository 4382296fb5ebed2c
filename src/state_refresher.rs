//! Periodically refresh the switch state for the accessory bridge.
//!
//! The refresher calls [`SwitchHandler::on_get`] once per interval and sends the result back to
//! the caller as a [`SwitchUpdate`] message. It runs until cancelled or until the caller drops
//! its receiver.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::select;
use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::SwitchHandler;

// CHANNEL MESSAGES -------------------------------------------------------------------------------

/// Messages sent from the [`StateRefresher`] back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum SwitchUpdate {
    /// The switch's current on/off state.
    State(bool),
}

// ================================================================================================
// StateRefresher

pub struct StateRefresher {
    interval: Duration,
    cancel_token: CancellationToken,
}

impl StateRefresher {
    pub fn new(interval: Duration) -> Self {
        StateRefresher {
            interval,
            cancel_token: CancellationToken::new(),
        }
    }

    /// Start the refresh task.
    ///
    /// The first refresh happens immediately, then once per interval. A slow refresh delays the
    /// next one rather than causing a burst of catch-up refreshes.
    pub fn start(
        &self,
        handler: Arc<dyn SwitchHandler>,
        tx: Sender<SwitchUpdate>,
    ) -> JoinHandle<()> {
        let cancel_token = self.cancel_token.clone();
        let period = self.interval;

        tokio::spawn(async move {
            info!("State refresher starting (every {:?})", period);

            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                select! {
                    _ = interval.tick() => {
                        let is_on = handler.on_get().await;

                        debug!("Refreshed switch state: {}", is_on);

                        if tx.send(SwitchUpdate::State(is_on)).await.is_err() {
                            warn!("State refresher update channel closed");
                            break;
                        }
                    }

                    _ = cancel_token.cancelled() => {
                        info!("State refresher shut down request received");
                        break;
                    }
                }
            }

            info!("State refresher has successfully shut down");
        })
    }

    /// Stop the refresh task. An in-flight refresh is allowed to complete first.
    pub fn stop(&self) {
        self.cancel_token.cancel();
    }
}

// ================================================================================================
// Tests
