use crate::config::DiscoveryConfig;
use crate::error::Result;
use crate::rpc::RpcClient;
use crate::types::{DeviceInfo, DeviceRecord};
use async_trait::async_trait;
use std::net::Ipv4Addr;

/// Result of asking a candidate what it is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The device is the supported model
    Match(DeviceRecord),

    /// The device answered but is some other model
    Mismatch {
        /// Model the device reported
        model: String,
    },
}

/// Confirms whether a candidate address hosts a supported device
#[async_trait]
pub trait InfoProbe: Send + Sync {
    /// Probe the device at `ip_address`
    ///
    /// `Err` means the device could not be asked (transport or parse failure);
    /// a wrong model is `Ok(ProbeOutcome::Mismatch)`.
    async fn probe(&self, ip_address: Ipv4Addr) -> Result<ProbeOutcome>;
}

/// Probe backed by `Shelly.GetDeviceInfo`
#[derive(Debug, Clone)]
pub struct DeviceInfoProbe {
    config: DiscoveryConfig,
}

impl DeviceInfoProbe {
    /// Create a probe using the model, port and timeout from `config`
    pub fn new(config: DiscoveryConfig) -> Self {
        Self { config }
    }

    /// Fetch and classify device info from `authority` (`host` or `host:port`)
    ///
    /// `ip_address` is recorded in the resulting [`DeviceRecord`].
    pub async fn probe_at(&self, authority: &str, ip_address: Ipv4Addr) -> Result<ProbeOutcome> {
        let rpc = RpcClient::new(authority, self.config.request_timeout())?;
        let info: DeviceInfo = rpc.call("Shelly.GetDeviceInfo", &[]).await?;

        if info.model != self.config.model {
            return Ok(ProbeOutcome::Mismatch { model: info.model });
        }

        tracing::info!("Device has info: {:?}", info);
        Ok(ProbeOutcome::Match(DeviceRecord::from_info(info, ip_address)))
    }
}

#[async_trait]
impl InfoProbe for DeviceInfoProbe {
    async fn probe(&self, ip_address: Ipv4Addr) -> Result<ProbeOutcome> {
        let authority = self.config.authority(ip_address);
        self.probe_at(&authority, ip_address).await
    }
}
