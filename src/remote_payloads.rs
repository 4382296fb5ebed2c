//! Message payloads for the Samsung TV WebSocket remote control channel.
//!
//! The client sends [`RemoteControlRequest`] frames (one per key press). The TV sends a
//! [`ChannelEvent`] frame immediately after connecting, announcing whether the named client may
//! use the remote control channel.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

const REMOTE_CONTROL_METHOD: &str = "ms.remote.control";

pub(crate) const CHANNEL_CONNECT_EVENT: &str = "ms.channel.connect";
pub(crate) const CHANNEL_UNAUTHORIZED_EVENT: &str = "ms.channel.unauthorized";

/// Remote control keys which can be sent to the TV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum RemoteKey {
    /// Toggle power. Sent to turn the TV off (the TV ignores it while in standby).
    Power,
    VolumeUp,
    VolumeDown,
    Mute,
    ChannelUp,
    ChannelDown,
    Home,
    Source,
}

impl RemoteKey {
    /// The key code understood by the TV.
    pub fn code(&self) -> &'static str {
        match self {
            RemoteKey::Power => "KEY_POWER",
            RemoteKey::VolumeUp => "KEY_VOLUP",
            RemoteKey::VolumeDown => "KEY_VOLDOWN",
            RemoteKey::Mute => "KEY_MUTE",
            RemoteKey::ChannelUp => "KEY_CHUP",
            RemoteKey::ChannelDown => "KEY_CHDOWN",
            RemoteKey::Home => "KEY_HOME",
            RemoteKey::Source => "KEY_SOURCE",
        }
    }
}

impl fmt::Display for RemoteKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for RemoteKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_uppercase();
        let code = code.strip_prefix("KEY_").unwrap_or(&code);

        match code {
            "POWER" => Ok(RemoteKey::Power),
            "VOLUP" => Ok(RemoteKey::VolumeUp),
            "VOLDOWN" => Ok(RemoteKey::VolumeDown),
            "MUTE" => Ok(RemoteKey::Mute),
            "CHUP" => Ok(RemoteKey::ChannelUp),
            "CHDOWN" => Ok(RemoteKey::ChannelDown),
            "HOME" => Ok(RemoteKey::Home),
            "SOURCE" => Ok(RemoteKey::Source),
            _ => Err(format!("Unknown remote key: {s}")),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// Requests

#[derive(Debug, Deserialize, Serialize)]
pub(crate) struct RemoteControlParams {
    #[serde(rename = "Cmd")]
    pub cmd: String,
    #[serde(rename = "DataOfCmd")]
    pub data_of_cmd: String,
    #[serde(rename = "Option")]
    pub option: String,
    #[serde(rename = "TypeOfRemote")]
    pub type_of_remote: String,
}

// Top-level Request shape

#[derive(Debug, Deserialize, Serialize)]
pub(crate) struct RemoteControlRequest {
    pub method: String,
    pub params: RemoteControlParams,
}

impl From<RemoteKey> for RemoteControlRequest {
    fn from(key: RemoteKey) -> Self {
        RemoteControlRequest {
            method: REMOTE_CONTROL_METHOD.to_string(),
            params: RemoteControlParams {
                cmd: "Click".to_string(),
                data_of_cmd: key.code().to_string(),
                option: "false".to_string(),
                type_of_remote: "SendRemoteKey".to_string(),
            },
        }
    }
}

impl From<RemoteKey> for String {
    fn from(key: RemoteKey) -> Self {
        serde_json::to_string(&RemoteControlRequest::from(key)).unwrap_or_else(|_| String::new())
    }
}

// ------------------------------------------------------------------------------------------------
// Responses

/// Event frame sent by the TV on the remote control channel.
#[derive(Debug, Deserialize, Serialize)]
pub(crate) struct ChannelEvent {
    pub event: String,
    pub data: Option<Value>,
}

impl ChannelEvent {
    /// Id assigned to this client by the TV, carried in `ms.channel.connect` events.
    pub fn client_id(&self) -> Option<&str> {
        self.data.as_ref()?.get("id")?.as_str()
    }
}

// ================================================================================================
// Tests

#[cfg(test)]
mod tests {
    use super::{ChannelEvent, RemoteKey, CHANNEL_CONNECT_EVENT, CHANNEL_UNAUTHORIZED_EVENT};

    #[test]
    fn power_key_payload() {
        let payload: String = RemoteKey::Power.into();

        assert_eq!(
            payload,
            r#"{"method":"ms.remote.control","params":{"Cmd":"Click","DataOfCmd":"KEY_POWER","Option":"false","TypeOfRemote":"SendRemoteKey"}}"#
        );
    }

    #[test]
    fn other_keys_only_change_data_of_cmd() {
        let payload: String = RemoteKey::Mute.into();

        assert_eq!(
            payload,
            r#"{"method":"ms.remote.control","params":{"Cmd":"Click","DataOfCmd":"KEY_MUTE","Option":"false","TypeOfRemote":"SendRemoteKey"}}"#
        );
    }

    #[test]
    fn remote_key_parsing() {
        assert_eq!("KEY_POWER".parse::<RemoteKey>(), Ok(RemoteKey::Power));
        assert_eq!("power".parse::<RemoteKey>(), Ok(RemoteKey::Power));
        assert_eq!(" key_volup ".parse::<RemoteKey>(), Ok(RemoteKey::VolumeUp));
        assert_eq!("chdown".parse::<RemoteKey>(), Ok(RemoteKey::ChannelDown));
        assert!("KEY_NOPE".parse::<RemoteKey>().is_err());

        assert_eq!(RemoteKey::Source.to_string(), "KEY_SOURCE");
    }

    #[test]
    fn channel_events() {
        let connect_json = r#"
        {
            "event": "ms.channel.connect",
            "data": {
                "clients": [
                    {
                        "attributes": { "name": "U2Ftc3VuZ1R2UmVtb3Rl" },
                        "connectTime": 1700000000000,
                        "deviceName": "U2Ftc3VuZ1R2UmVtb3Rl",
                        "id": "7e5f8b8a-0000",
                        "isHost": false
                    }
                ],
                "id": "7e5f8b8a-0000"
            }
        }
        "#;

        let event: ChannelEvent = serde_json::from_str(connect_json).unwrap();
        assert_eq!(event.event, CHANNEL_CONNECT_EVENT);
        assert_eq!(event.client_id(), Some("7e5f8b8a-0000"));

        let event: ChannelEvent =
            serde_json::from_str(r#"{"event":"ms.channel.unauthorized"}"#).unwrap();
        assert_eq!(event.event, CHANNEL_UNAUTHORIZED_EVENT);
        assert_eq!(event.client_id(), None);
    }
}
