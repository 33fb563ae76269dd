use crate::booking_store::{BookingStore, StorePolicy};
use crate::file_repo::FileStorage;
use crate::memory::MemoryStorage;
use crate::redis_repo::RedisStorage;
use marina_core::{KeyValueStorage, StorageError};
use serde::Deserialize;
use std::env;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub storage: StorageConfig,
    #[serde(default)]
    pub booking: BookingConfig,
    pub api: ApiConfig,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    File,
    Redis,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub path: Option<String>,
    pub redis_url: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct BookingConfig {
    #[serde(default)]
    pub policy: StorePolicy,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub token: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_timeout() -> u64 { 15 }

const DEFAULT_FILE_ROOT: &str = ".marina";

impl StorageConfig {
    pub fn open(&self) -> Result<Arc<dyn KeyValueStorage>, StorageError> {
        match self.backend {
            StorageBackend::Memory => Ok(Arc::new(MemoryStorage::new())),
            StorageBackend::File => {
                let root = self.path.as_deref().unwrap_or(DEFAULT_FILE_ROOT);
                Ok(Arc::new(FileStorage::open(root)?))
            }
            StorageBackend::Redis => {
                let url = self.redis_url.as_deref().ok_or_else(|| {
                    StorageError::Unavailable("storage.redis_url is not set".to_string())
                })?;
                Ok(Arc::new(RedisStorage::new(url)?))
            }
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    /// Layer `default`, `{RUN_MODE}` and `local` files from `dir`, then
    /// `MARINA__*` environment variables.
    pub fn load_from(dir: impl AsRef<Path>) -> Result<Self, config::ConfigError> {
        let dir = dir.as_ref();
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        let file = |name: &str| dir.join(name).to_string_lossy().into_owned();

        let s = config::Config::builder()
            .add_source(config::File::with_name(&file("default")))
            .add_source(config::File::with_name(&file(&run_mode)).required(false))
            // Not checked in
            .add_source(config::File::with_name(&file("local")).required(false))
            // Eg. `MARINA__BOOKING__POLICY=strict`
            .add_source(config::Environment::with_prefix("MARINA").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    pub fn open_store(&self) -> Result<BookingStore, StorageError> {
        let storage = self.storage.open()?;
        tracing::info!(
            "Booking store on {:?} storage, {:?} policy",
            self.storage.backend,
            self.booking.policy
        );
        Ok(BookingStore::new(storage, self.booking.policy))
    }
}
