//! Helper functions.

use std::net::Ipv6Addr;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use url::Url;

use crate::TvError;

const REMOTE_CONTROL_PATH: &str = "/api/v2/channels/samsung.remote.control";

/// Base64-encode the client name announced to the TV.
pub(crate) fn encoded_app_name(app_name: &str) -> String {
    STANDARD.encode(app_name)
}

/// Prepare a TV host for inclusion in a URL.
///
/// The host must be a bare IPv4 address, IPv6 address, or host name (no scheme, port, or path).
/// IPv6 addresses are wrapped in brackets.
fn url_host(host: &str) -> Result<String, TvError> {
    let host = host.trim();

    if host.is_empty() {
        return Err(TvError::InvalidAddress(String::from("No host specified")));
    }

    if let Ok(ipv6) = host.parse::<Ipv6Addr>() {
        return Ok(format!("[{ipv6}]"));
    }

    if host.contains(['/', '?', '#', '@', ' ']) {
        return Err(TvError::InvalidAddress(format!(
            "Invalid host '{host}' (expected an IP address or host name)"
        )));
    }

    Ok(host.to_string())
}

/// Generate the URL of the TV's HTTP endpoint, used as a liveness check.
///
/// Example: 10.0.0.101 -> http://10.0.0.101:8001/
pub(crate) fn probe_url(host: &str, port: u16) -> Result<Url, TvError> {
    let in_str = format!("http://{}:{}/", url_host(host)?, port);

    Url::parse(&in_str)
        .map_err(|e| TvError::InvalidAddress(format!("Could not parse host '{host}': {e}")))
}

/// Generate the URL of the TV's WebSocket remote control channel.
///
/// Example: 10.0.0.101 ->
/// ws://10.0.0.101:8001/api/v2/channels/samsung.remote.control?name=U2Ftc3VuZ1R2UmVtb3Rl
pub(crate) fn remote_control_url(host: &str, port: u16, app_name: &str) -> Result<Url, TvError> {
    let in_str = format!("ws://{}:{}{}", url_host(host)?, port, REMOTE_CONTROL_PATH);

    let mut url = Url::parse(&in_str)
        .map_err(|e| TvError::InvalidAddress(format!("Could not parse host '{host}': {e}")))?;

    url.query_pairs_mut()
        .append_pair("name", &encoded_app_name(app_name));

    Ok(url)
}

// ================================================================================================
// Tests
