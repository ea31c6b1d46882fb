use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use uuid::Uuid;

/// mDNS service type advertised by Shelly Gen2+ devices
pub const SERVICE_NAME: &str = "_shelly._tcp.local";

/// Model string reported by the Shelly Plus Wall Dimmer (US)
pub const MODEL: &str = "SNDM-0013US";

/// Manufacturer shown in accessory information
pub const MANUFACTURER: &str = "Shelly";

/// Namespace for name-based accessory UUIDs
const ACCESSORY_NAMESPACE: Uuid = Uuid::from_u128(0x6f2b_5c1e_9a4d_4e0b_8d2f_3c7a_1b9e_0d54);

/// Device identifier as reported by `Shelly.GetDeviceInfo`
pub type DeviceId = String;

/// Accessory identifier handed to the host
pub type AccessoryId = Uuid;

/// Derive the stable accessory identifier for a device id
///
/// The same device id always yields the same UUID, so a device seen in an
/// earlier run maps back onto the accessory the host restored from its cache.
pub fn accessory_uuid(device_id: &str) -> AccessoryId {
    Uuid::new_v5(&ACCESSORY_NAMESPACE, device_id.as_bytes())
}

/// Body of `GET /rpc/Shelly.GetDeviceInfo`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// User-assigned name, `null` until set in the device UI
    #[serde(default)]
    pub name: Option<String>,
    pub id: DeviceId,
    pub model: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gen: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fw_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ver: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_en: Option<bool>,
}

/// A confirmed, bindable device
///
/// Only built from a successful info probe, so `id`, `ip_address` and `model`
/// are always known together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    /// Display name
    pub name: String,
    pub id: DeviceId,
    pub ip_address: Ipv4Addr,
    pub model: String,

    /// Full probe response, kept for the host's context store
    pub info: DeviceInfo,
}

impl DeviceRecord {
    /// Build a record from probe data and the address it was reached on
    pub fn from_info(info: DeviceInfo, ip_address: Ipv4Addr) -> Self {
        let name = info
            .name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| info.id.clone());

        Self {
            name,
            id: info.id.clone(),
            ip_address,
            model: info.model.clone(),
            info,
        }
    }

    /// Stable accessory identifier for this device
    pub fn accessory_uuid(&self) -> AccessoryId {
        accessory_uuid(&self.id)
    }

    /// Information service values for this device
    pub fn information(&self) -> AccessoryInformation {
        AccessoryInformation {
            manufacturer: MANUFACTURER.to_string(),
            model: self.model.clone(),
            name: self.name.clone(),
        }
    }
}

/// A device seen via mDNS but not yet confirmed
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Candidate {
    /// Leading label of the advertised instance name
    pub instance: String,
    pub ip_address: Ipv4Addr,
}

/// Body of `GET /rpc/Light.GetStatus`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightStatus {
    /// Whether the output is on
    pub output: bool,

    /// Brightness level, 0-100
    pub brightness: u8,
}

/// Accessory information characteristics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessoryInformation {
    pub manufacturer: String,
    pub model: String,
    pub name: String,
}
