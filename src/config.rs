use crate::types::{MODEL, SERVICE_NAME};
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::time::Duration;

/// Discovery and control settings
///
/// Every field has a default that matches a Shelly Plus Wall Dimmer on a flat
/// home network, so `DiscoveryConfig::default()` is usually all a host needs.
///
/// # Example
///
/// ```
/// use shelly_dimmer::DiscoveryConfig;
/// use std::net::Ipv4Addr;
///
/// let config = DiscoveryConfig::default()
///     .with_interface(Ipv4Addr::new(192, 168, 1, 10))
///     .with_request_timeout(std::time::Duration::from_secs(5));
///
/// assert_eq!(config.service_name, "_shelly._tcp.local");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Service type queried with a PTR question
    pub service_name: String,

    /// Only devices reporting this model are bound
    pub model: String,

    /// Interface used to join the mDNS multicast group
    pub interface: Ipv4Addr,

    /// Port of the device HTTP RPC endpoint
    pub http_port: u16,

    /// Per-request HTTP timeout in milliseconds (none = network stack default)
    pub request_timeout_ms: Option<u64>,

    /// Light component id used in `Light.*` calls
    pub light_id: u8,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            service_name: SERVICE_NAME.to_string(),
            model: MODEL.to_string(),
            interface: Ipv4Addr::UNSPECIFIED,
            http_port: 80,
            request_timeout_ms: None,
            light_id: 0,
        }
    }
}

impl DiscoveryConfig {
    /// Set the mDNS service name
    pub fn with_service_name(mut self, service_name: impl Into<String>) -> Self {
        self.service_name = service_name.into();
        self
    }

    /// Set the supported model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the multicast interface
    pub fn with_interface(mut self, interface: Ipv4Addr) -> Self {
        self.interface = interface;
        self
    }

    /// Set the RPC port
    pub fn with_http_port(mut self, port: u16) -> Self {
        self.http_port = port;
        self
    }

    /// Set a per-request HTTP timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    /// Set the light component id
    pub fn with_light_id(mut self, light_id: u8) -> Self {
        self.light_id = light_id;
        self
    }

    /// Get the HTTP timeout, if any
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    /// `host:port` authority of a device's RPC endpoint
    pub fn authority(&self, ip: Ipv4Addr) -> String {
        format!("{}:{}", ip, self.http_port)
    }
}
