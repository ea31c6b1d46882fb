//! Discover a Shelly Dimmer, bind it, and toggle the light.
//!
//! Run with `RUST_LOG=shelly_dimmer=debug cargo run --example bind`.

use shelly_dimmer::{AccessoryCache, BindingCoordinator, DiscoveryConfig};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = DiscoveryConfig::default().with_request_timeout(Duration::from_secs(5));
    let coordinator = BindingCoordinator::new(config, AccessoryCache::new());

    println!("Searching for a dimmer...");
    let binding = coordinator.run().await?;
    let info = binding.information();
    println!(
        "Bound {} {} \"{}\" at {} (accessory {})",
        info.manufacturer, info.model, info.name, binding.device.ip_address, binding.uuid
    );

    let controller = &binding.controller;
    let status = controller.status().await?;
    println!("Currently {} at {}%", if status.output { "on" } else { "off" }, status.brightness);

    controller.set_on(!status.output).await?;
    println!("Toggled; now {}", if controller.get_on().await? { "on" } else { "off" });

    controller.set_on(status.output).await?;
    controller.set_brightness(status.brightness).await?;
    println!("Restored previous state");

    Ok(())
}
