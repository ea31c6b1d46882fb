use crate::config::DiscoveryConfig;
use crate::error::{Result, ShellyError};
use crate::rpc::RpcClient;
use crate::types::{DeviceRecord, LightStatus};
use async_trait::async_trait;

/// The get/set surface a host wires into its own property model
///
/// Every method either returns the device's answer or fails with
/// [`ShellyError::CommunicationFailure`]; no cached value is ever substituted.
#[async_trait]
pub trait ControlSink: Send + Sync {
    async fn get_on(&self) -> Result<bool>;
    async fn set_on(&self, on: bool) -> Result<()>;
    async fn get_brightness(&self) -> Result<u8>;
    async fn set_brightness(&self, brightness: u8) -> Result<()>;
}

/// Controls the light component of a bound dimmer
#[derive(Debug, Clone)]
pub struct DeviceController {
    rpc: RpcClient,
    light_id: u8,
}

impl DeviceController {
    /// Create a controller for a bound device
    pub fn new(device: &DeviceRecord, config: &DiscoveryConfig) -> Result<Self> {
        let rpc = RpcClient::new(config.authority(device.ip_address), config.request_timeout())?;
        Ok(Self::with_client(rpc, config.light_id))
    }

    /// Create a controller over an existing RPC client
    pub fn with_client(rpc: RpcClient, light_id: u8) -> Self {
        Self { rpc, light_id }
    }

    /// Get the current output and brightness
    pub async fn status(&self) -> Result<LightStatus> {
        let status = self
            .rpc
            .call("Light.GetStatus", &[("id", self.light_id.to_string())])
            .await;
        communication(status)
    }

    /// Whether the light is on
    pub async fn get_on(&self) -> Result<bool> {
        let on = self.status().await?.output;
        tracing::debug!("Get On -> {}", on);
        Ok(on)
    }

    /// Switch the light on or off
    pub async fn set_on(&self, on: bool) -> Result<()> {
        let sent = self
            .rpc
            .send("Light.Set", &[("id", self.light_id.to_string()), ("on", on.to_string())])
            .await;
        communication(sent)?;
        tracing::debug!("Set On -> {}", on);
        Ok(())
    }

    /// Current brightness, 0-100
    pub async fn get_brightness(&self) -> Result<u8> {
        let brightness = self.status().await?.brightness;
        tracing::debug!("Get Brightness -> {}", brightness);
        Ok(brightness)
    }

    /// Set brightness, 0-100
    pub async fn set_brightness(&self, brightness: u8) -> Result<()> {
        if brightness > 100 {
            return Err(ShellyError::InvalidBrightness(brightness));
        }

        let sent = self
            .rpc
            .send(
                "Light.Set",
                &[("id", self.light_id.to_string()), ("brightness", brightness.to_string())],
            )
            .await;
        communication(sent)?;
        tracing::debug!("Set Brightness -> {}", brightness);
        Ok(())
    }
}

#[async_trait]
impl ControlSink for DeviceController {
    async fn get_on(&self) -> Result<bool> {
        DeviceController::get_on(self).await
    }

    async fn set_on(&self, on: bool) -> Result<()> {
        DeviceController::set_on(self, on).await
    }

    async fn get_brightness(&self) -> Result<u8> {
        DeviceController::get_brightness(self).await
    }

    async fn set_brightness(&self, brightness: u8) -> Result<()> {
        DeviceController::set_brightness(self, brightness).await
    }
}

/// Collapse any RPC failure into the uniform communication failure
fn communication<T>(result: Result<T>) -> Result<T> {
    result.map_err(|e| {
        tracing::debug!("error: {}", e);
        ShellyError::CommunicationFailure
    })
}
