use std::fmt;

/// The TV being controlled.
///
/// `ip_address` is a host without a port (IPv4, IPv6 literal, or host name). `mac_address` is
/// six colon-separated hex octets, and is only needed to power the TV on.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct TargetDevice {
    pub ip_address: String,
    pub mac_address: String,
}

impl TargetDevice {
    pub fn new(ip_address: &str, mac_address: &str) -> Self {
        TargetDevice {
            ip_address: ip_address.to_string(),
            mac_address: mac_address.to_string(),
        }
    }
}

impl fmt::Display for TargetDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.mac_address.is_empty() {
            write!(f, "{}", self.ip_address)
        } else {
            write!(f, "{} [{}]", self.ip_address, self.mac_address)
        }
    }
}

// ================================================================================================
// Tests

#[cfg(test)]
mod tests {
    use super::TargetDevice;

    #[test]
    fn target_device_display() {
        assert_eq!(
            TargetDevice::new("10.0.0.101", "AA:BB:CC:DD:EE:FF").to_string(),
            "10.0.0.101 [AA:BB:CC:DD:EE:FF]"
        );
        assert_eq!(TargetDevice::new("tv.local", "").to_string(), "tv.local");
    }
}
