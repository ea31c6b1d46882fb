//! Rust library for discovering and controlling a Shelly Dimmer on the local network
//!
//! This library finds a single Shelly Plus Wall Dimmer via multicast DNS, binds
//! it to a host-managed accessory, and exposes its light through the device's
//! local HTTP RPC API. It supports:
//!
//! - Discovery via an mDNS PTR query for `_shelly._tcp.local`
//! - Correlation of PTR and A records arriving in any packet order
//! - Model confirmation through `Shelly.GetDeviceInfo`
//! - At-most-one binding per discovery session
//! - On/off and brightness control via `Light.GetStatus` / `Light.Set`
//!
//! # Quick Start
//!
//! ```no_run
//! use shelly_dimmer::{AccessoryCache, BindingCoordinator, DiscoveryConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Accessories the host restored from its own storage go in first
//!     let cache = AccessoryCache::new();
//!
//!     let coordinator = BindingCoordinator::new(DiscoveryConfig::default(), cache);
//!     let binding = coordinator.run().await?;
//!
//!     let controller = binding.controller;
//!     controller.set_on(true).await?;
//!     controller.set_brightness(40).await?;
//!     println!("Brightness is now {}", controller.get_brightness().await?);
//!     Ok(())
//! }
//! ```
//!
//! # Direct Control
//!
//! If you know the address of a dimmer, skip discovery:
//!
//! ```no_run
//! use shelly_dimmer::{DeviceController, RpcClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let rpc = RpcClient::new("192.168.1.151", None)?;
//!     let controller = DeviceController::with_client(rpc, 0);
//!     if controller.get_on().await? {
//!         controller.set_on(false).await?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **Protocol**: mDNS query encoding and response decoding
//! - **Listener**: multicast socket that yields decoded responses
//! - **Session**: PTR/A correlation and the single binding claim
//! - **Probe**: model confirmation over HTTP
//! - **Coordinator**: ties the above together and talks to the host registry
//! - **Controller / RPC**: light control over the device's HTTP API

mod config;
mod controller;
mod coordinator;
mod error;
mod listener;
mod probe;
pub mod protocol;
mod registry;
mod rpc;
mod session;
mod types;

// Public exports
pub use config::DiscoveryConfig;
pub use controller::{ControlSink, DeviceController};
pub use coordinator::{Binding, BindingCoordinator};
pub use error::{Result, ShellyError};
pub use listener::{MdnsListener, ResponseSource};
pub use probe::{DeviceInfoProbe, InfoProbe, ProbeOutcome};
pub use protocol::{MdnsRecord, MdnsResponse};
pub use registry::{AccessoryCache, AccessoryRegistry, PlatformAccessory, SharedAccessory};
pub use rpc::RpcClient;
pub use session::DiscoverySession;
pub use types::{
    accessory_uuid, AccessoryId, AccessoryInformation, Candidate, DeviceId, DeviceInfo,
    DeviceRecord, LightStatus, MANUFACTURER, MODEL, SERVICE_NAME,
};
