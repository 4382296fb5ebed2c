/*!
Power switch bridge for Samsung TVs.

[`PowerController`] turns a network-attached Samsung TV on and off, and reports whether it is on.
It is designed to sit behind a single on/off switch exposed by a smart-home accessory bridge.

## Features

* Power state detection via the TV's local HTTP endpoint.
* Power on via Wake-on-LAN, confirmed by probing the TV afterwards.
* Power off (and other remote keys) via the TV's WebSocket remote control channel.
* Handler interface ([`SwitchHandler`]) for accessory bridges to invoke on get/set requests.
* Periodic background state refresh ([`StateRefresher`]).

## Overview

Three network protocols are involved, each handled by its own component:

| Component | Trait | Implementation | Protocol |
|---|---|---|---|
| State probe | [`StateProbe`] | [`HttpStateProbe`] | `GET http://<ip>:8001/` (500 ms timeout) |
| Wake sender | [`WakeSender`] | [`WolSender`] | UDP magic packet to `255.255.255.255:9` |
| Remote commander | [`RemoteCommander`] | [`WebSocketRemote`] | `ws://<ip>:8001/api/v2/channels/samsung.remote.control` |

`PowerController` composes these:

* **`get_state`**: The TV is considered on if its HTTP endpoint answers at all (any status code).
  Every failure is reported as off; this operation never errors.
* **`power_on`**: Sends Wake-on-LAN, waits a 750 ms grace period, then probes the TV. If the TV
  is still unreachable the call fails with [`TvError::WakeTimeout`].
* **`power_off`**: Connects to the remote control channel, waits for the TV's authorization
  frame, sends `KEY_POWER`, waits 750 ms for the TV to act on it, then closes the connection.
  The TV is not probed afterwards (it would race the TV's own shutdown).

No operation is retried. The controller holds no mutable state, so it can be shared between a
periodic refresh task and on-demand requests.

## Instantiating

Instantiate a `PowerController` with [`PowerController::new()`], passing
[`ControllerSettings`]. Use `ControllerSettings::default()` or the
[`ControllerSettingsBuilder`].

```no_run
use std::time::Duration;

use samsung_tv_switch::{ControllerSettingsBuilder, PowerController, TargetDevice};

# #[tokio::main]
# async fn main() {
let controller = PowerController::new(
    ControllerSettingsBuilder::new()
        .with_wake_grace_period(Duration::from_secs(1))
        .build(),
);

let tv = TargetDevice::new("10.0.0.101", "AA:BB:CC:DD:EE:FF");

match controller.power_on(&tv).await {
    Ok(()) => println!("TV is on"),
    Err(e) => println!("Could not turn TV on: {e}"),
}
# }
```

Any of the network components can be replaced with [`PowerControllerBuilder`].

## Bridging to an accessory framework

An accessory framework exposes the switch to a client application. It should call
[`SwitchHandler::on_get`] and [`SwitchHandler::on_set`] when the client reads or writes the
switch. [`TvSwitch`] implements `SwitchHandler` for a single TV.

A [`StateRefresher`] keeps the exposed value current by reading the switch at a fixed interval
and sending each result back over a channel:

```no_run
use std::sync::Arc;

use samsung_tv_switch::{
    ControllerSettings, PowerController, StateRefresher, SwitchUpdate, TargetDevice, TvSwitch,
};
use tokio::sync::mpsc;

# #[tokio::main]
# async fn main() {
let settings = ControllerSettings::default();
let refresh_interval = settings.refresh_interval;

let switch = Arc::new(TvSwitch::new(
    TargetDevice::new("10.0.0.101", "AA:BB:CC:DD:EE:FF"),
    Arc::new(PowerController::new(settings)),
));

let (update_tx, mut update_rx) = mpsc::channel(8);
let refresher = StateRefresher::new(refresh_interval);
let _handle = refresher.start(switch, update_tx);

while let Some(SwitchUpdate::State(is_on)) = update_rx.recv().await {
    // Push `is_on` to the accessory framework
    println!("TV is {}", if is_on { "on" } else { "off" });
}
# }
```

## Limitations

* Only the unencrypted remote control channel (port 8001) is supported. Newer TVs which only
  accept token-authenticated connections on port 8002 cannot be turned off.
* Power off is not confirmed.
* Wake-on-LAN only works while the TV is in network standby.
*/

mod device;
mod error;
mod helpers;
mod magic_packet;
mod power_controller;
mod power_state_machine;
mod remote_control;
mod remote_payloads;
mod settings;
mod state_probe;
mod state_refresher;
mod switch_handler;
mod wake_on_lan;

pub use device::TargetDevice;
pub use error::TvError;
pub use magic_packet::{MagicPacket, MAGIC_PACKET_LEN};
pub use power_controller::{PowerController, PowerControllerBuilder};
pub use remote_control::{RemoteCommander, WebSocketRemote};
pub use remote_payloads::RemoteKey;
pub use settings::{ControllerSettings, ControllerSettingsBuilder};
pub use state_probe::{HttpStateProbe, StateProbe};
pub use state_refresher::{StateRefresher, SwitchUpdate};
pub use switch_handler::{SwitchHandler, TvSwitch};
pub use wake_on_lan::{WakeSender, WolSender};
