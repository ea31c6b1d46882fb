use crate::error::{Result, ShellyError};
use crate::types::{AccessoryId, DeviceRecord};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Host-side accessory bookkeeping
///
/// The host owns accessory objects; binding only needs to look one up by id,
/// ask for a new one, store the device on it and publish it.
pub trait AccessoryRegistry: Send + Sync {
    /// Host accessory handle
    type Accessory: Send;

    /// Find a previously known accessory
    fn find(&self, uuid: &AccessoryId) -> Option<Self::Accessory>;

    /// Create a new, unregistered accessory
    fn create(&self, display_name: &str, uuid: AccessoryId) -> Self::Accessory;

    /// Store the device in the accessory's context
    fn store_device(&self, accessory: &mut Self::Accessory, device: &DeviceRecord);

    /// Publish a newly created accessory
    ///
    /// Fails with [`ShellyError::Registry`] if the host refuses it.
    fn register(&self, accessory: &Self::Accessory) -> Result<()>;
}

/// An accessory as the in-memory cache stores it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformAccessory {
    pub display_name: String,
    pub uuid: AccessoryId,
    /// Device context, persisted by the host between runs
    pub device: Option<DeviceRecord>,
}

impl PlatformAccessory {
    /// Create an accessory with an empty context
    pub fn new(display_name: impl Into<String>, uuid: AccessoryId) -> Self {
        Self {
            display_name: display_name.into(),
            uuid,
            device: None,
        }
    }
}

/// Shared handle to a cached accessory
pub type SharedAccessory = Arc<Mutex<PlatformAccessory>>;

#[derive(Default)]
struct CacheState {
    accessories: Vec<SharedAccessory>,
    registrations: Vec<AccessoryId>,
}

/// In-memory [`AccessoryRegistry`]
///
/// Hosts feed accessories restored from their own storage through
/// [`configure_accessory`](Self::configure_accessory) before discovery runs.
#[derive(Clone, Default)]
pub struct AccessoryCache {
    state: Arc<Mutex<CacheState>>,
}

impl AccessoryCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an accessory restored from the host's storage
    pub fn configure_accessory(&self, accessory: PlatformAccessory) -> SharedAccessory {
        tracing::info!("Loading accessory from cache: {}", accessory.display_name);
        let shared = Arc::new(Mutex::new(accessory));
        self.lock().accessories.push(shared.clone());
        shared
    }

    /// Snapshot of all known accessories
    pub fn accessories(&self) -> Vec<PlatformAccessory> {
        self.lock()
            .accessories
            .iter()
            .map(|a| lock_accessory(a).clone())
            .collect()
    }

    /// Identifiers passed to [`register`](AccessoryRegistry::register), in order
    pub fn registrations(&self) -> Vec<AccessoryId> {
        self.lock().registrations.clone()
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn lock_accessory(accessory: &SharedAccessory) -> MutexGuard<'_, PlatformAccessory> {
    accessory.lock().unwrap_or_else(PoisonError::into_inner)
}

impl AccessoryRegistry for AccessoryCache {
    type Accessory = SharedAccessory;

    fn find(&self, uuid: &AccessoryId) -> Option<SharedAccessory> {
        self.lock()
            .accessories
            .iter()
            .find(|a| lock_accessory(a).uuid == *uuid)
            .cloned()
    }

    fn create(&self, display_name: &str, uuid: AccessoryId) -> SharedAccessory {
        Arc::new(Mutex::new(PlatformAccessory::new(display_name, uuid)))
    }

    fn store_device(&self, accessory: &mut SharedAccessory, device: &DeviceRecord) {
        lock_accessory(accessory).device = Some(device.clone());
    }

    fn register(&self, accessory: &SharedAccessory) -> Result<()> {
        let uuid = lock_accessory(accessory).uuid;
        let mut state = self.lock();
        if state.registrations.contains(&uuid) {
            return Err(ShellyError::Registry(format!(
                "accessory {} is already registered",
                uuid
            )));
        }
        state.registrations.push(uuid);
        if !state.accessories.iter().any(|a| Arc::ptr_eq(a, accessory)) {
            state.accessories.push(accessory.clone());
        }
        Ok(())
    }
}
