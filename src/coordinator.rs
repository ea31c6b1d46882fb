use crate::config::DiscoveryConfig;
use crate::controller::DeviceController;
use crate::error::{Result, ShellyError};
use crate::listener::{MdnsListener, ResponseSource};
use crate::probe::{DeviceInfoProbe, InfoProbe, ProbeOutcome};
use crate::registry::AccessoryRegistry;
use crate::session::DiscoverySession;
use crate::types::{AccessoryId, AccessoryInformation, Candidate, DeviceRecord};
use futures_util::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use std::time::Duration;

/// Pause after a failed receive before listening again
const RECV_ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// Outcome of a successful discovery session
pub struct Binding<A> {
    /// Host accessory the device is bound to
    pub accessory: A,
    pub uuid: AccessoryId,
    pub device: DeviceRecord,
    pub controller: DeviceController,
    /// `true` if the accessory came from the host's cache
    pub restored: bool,
}

impl<A> Binding<A> {
    /// Information service values for the bound device
    pub fn information(&self) -> AccessoryInformation {
        self.device.information()
    }
}

/// Drives discovery until exactly one supported device is bound
///
/// # Example
///
/// ```no_run
/// use shelly_dimmer::{AccessoryCache, BindingCoordinator, DiscoveryConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let cache = AccessoryCache::new();
///     let coordinator = BindingCoordinator::new(DiscoveryConfig::default(), cache);
///
///     let binding = coordinator.run().await?;
///     println!("Bound {} at {}", binding.device.name, binding.device.ip_address);
///
///     binding.controller.set_brightness(55).await?;
///     Ok(())
/// }
/// ```
pub struct BindingCoordinator<R, P = DeviceInfoProbe> {
    config: DiscoveryConfig,
    registry: R,
    probe: Arc<P>,
}

impl<R: AccessoryRegistry> BindingCoordinator<R, DeviceInfoProbe> {
    /// Create a coordinator that probes devices over HTTP
    pub fn new(config: DiscoveryConfig, registry: R) -> Self {
        let probe = DeviceInfoProbe::new(config.clone());
        Self::with_probe(config, registry, probe)
    }
}

impl<R: AccessoryRegistry, P: InfoProbe + 'static> BindingCoordinator<R, P> {
    /// Create a coordinator with a custom probe
    pub fn with_probe(config: DiscoveryConfig, registry: R, probe: P) -> Self {
        Self {
            config,
            registry,
            probe: Arc::new(probe),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Get the registry
    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Query the network and bind the first supported device that answers
    ///
    /// Runs until a device is bound; there is no discovery timeout. Fails
    /// immediately if the query cannot be sent.
    pub async fn run(&self) -> Result<Binding<R::Accessory>> {
        tracing::info!("Setting up mDNS");
        let listener = MdnsListener::start(&self.config).await?;
        self.run_with(listener).await
    }

    /// Bind the first supported device seen on `source`
    ///
    /// Probes run concurrently with listening. Whichever matching probe
    /// completes first claims the session; `source` is stopped before the
    /// host registry is touched.
    pub async fn run_with<S: ResponseSource>(&self, mut source: S) -> Result<Binding<R::Accessory>> {
        let mut session = DiscoverySession::new(self.config.service_name.clone());
        let mut probes = FuturesUnordered::new();

        loop {
            tokio::select! {
                received = source.recv() => {
                    match received {
                        Ok(response) => {
                            if let Some(candidate) = session.on_response(&response) {
                                tracing::info!(
                                    "Getting device info for {} at {}",
                                    candidate.instance,
                                    candidate.ip_address
                                );
                                probes.push(probe_candidate(self.probe.clone(), candidate));
                            }
                        }
                        Err(ShellyError::ListenerClosed) => return Err(ShellyError::ListenerClosed),
                        Err(e) => {
                            tracing::warn!("mDNS receive error: {}, retrying in {:?}", e, RECV_ERROR_BACKOFF);
                            tokio::time::sleep(RECV_ERROR_BACKOFF).await;
                        }
                    }
                }
                Some((candidate, outcome)) = probes.next(), if !probes.is_empty() => {
                    match outcome {
                        Ok(ProbeOutcome::Match(device)) => {
                            if !session.try_claim() {
                                continue;
                            }
                            tracing::info!("Found {} ({}), stopping mDNS", device.name, device.model);
                            source.stop();
                            return self.bind(device);
                        }
                        Ok(ProbeOutcome::Mismatch { model }) => {
                            tracing::info!("Device {} is model {}, ignoring", candidate.instance, model);
                        }
                        Err(e) => {
                            tracing::warn!(
                                "Failed to get device info from {}: {}",
                                candidate.ip_address,
                                e
                            );
                        }
                    }
                }
            }
        }
    }

    /// Attach a confirmed device to a restored or new accessory
    fn bind(&self, device: DeviceRecord) -> Result<Binding<R::Accessory>> {
        let uuid = device.accessory_uuid();
        let controller = DeviceController::new(&device, &self.config)?;

        if let Some(mut accessory) = self.registry.find(&uuid) {
            tracing::info!("Restoring existing accessory from cache: {}", device.name);
            self.registry.store_device(&mut accessory, &device);
            return Ok(Binding {
                accessory,
                uuid,
                device,
                controller,
                restored: true,
            });
        }

        tracing::info!("Adding new accessory: {}", device.name);
        let mut accessory = self.registry.create(&device.name, uuid);
        self.registry.store_device(&mut accessory, &device);
        self.registry.register(&accessory)?;

        Ok(Binding {
            accessory,
            uuid,
            device,
            controller,
            restored: false,
        })
    }
}

async fn probe_candidate<P: InfoProbe>(
    probe: Arc<P>,
    candidate: Candidate,
) -> (Candidate, Result<ProbeOutcome>) {
    let outcome = probe.probe(candidate.ip_address).await;
    (candidate, outcome)
}
