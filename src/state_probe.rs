//! Determine whether the TV is on by checking that its local HTTP endpoint responds.
//!
//! The TV's web server answers whenever its network stack is up, so any HTTP response (including
//! error statuses) is treated as "on". Every failure is treated as "off"; the probe never returns
//! an error.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};

use crate::helpers::probe_url;
use crate::ControllerSettings;

/// Answers "is the TV reachable/on".
#[async_trait]
pub trait StateProbe: Send + Sync {
    async fn probe(&self, ip_address: &str) -> bool;
}

/// [`StateProbe`] which performs a short-timeout `GET http://<ip>:8001/`.
///
/// The HTTP client is built once and shared by all probes. Idle connections are never kept, so
/// each probe opens a fresh connection. No proxy is used.
#[derive(Debug, Clone)]
pub struct HttpStateProbe {
    port: u16,
    client: Option<reqwest::Client>,
}

impl HttpStateProbe {
    pub fn new(settings: &ControllerSettings) -> Self {
        let client = match build_client(settings.probe_timeout) {
            Ok(client) => Some(client),
            Err(e) => {
                warn!("Could not create HTTP client for TV probe: {}", e);
                None
            }
        };

        HttpStateProbe {
            port: settings.remote_port,
            client,
        }
    }
}

fn build_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
}

impl Default for HttpStateProbe {
    fn default() -> Self {
        HttpStateProbe::new(&ControllerSettings::default())
    }
}

#[async_trait]
impl StateProbe for HttpStateProbe {
    async fn probe(&self, ip_address: &str) -> bool {
        let url = match probe_url(ip_address, self.port) {
            Ok(url) => url,
            Err(e) => {
                debug!("Cannot probe TV: {}", e);
                return false;
            }
        };

        let Some(client) = &self.client else {
            debug!("Cannot probe TV {}: no HTTP client", url);
            return false;
        };

        match client.get(url.clone()).send().await {
            Ok(response) => {
                debug!("TV probe {} responded: {}", url, response.status());
                true
            }
            Err(e) => {
                debug!("TV probe {} failed: {}", url, e);
                false
            }
        }
    }
}

// ================================================================================================
// Tests
