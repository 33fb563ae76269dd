use marina_core::{KeyValueStorage, StorageError};
use redis::{Commands, RedisError};
use tracing::{debug, info};

const KEY_PREFIX: &str = "marina";

/// Persistent storage on a Redis server, keys namespaced as `marina:<key>`.
#[derive(Clone)]
pub struct RedisStorage {
    client: redis::Client,
}

impl RedisStorage {
    pub fn new(connection_string: &str) -> Result<Self, StorageError> {
        let client = redis::Client::open(connection_string)
            .map_err(|e| StorageError::Unavailable(format!("invalid redis url: {}", e)))?;
        info!("Redis storage configured");
        Ok(Self { client })
    }

    fn connection(&self) -> Result<redis::Connection, StorageError> {
        self.client
            .get_connection()
            .map_err(|e| StorageError::Unavailable(format!("redis connection failed: {}", e)))
    }
}

fn namespaced(key: &str) -> String {
    format!("{}:{}", KEY_PREFIX, key)
}

fn backend(e: RedisError) -> StorageError {
    if e.is_connection_dropped() || e.is_connection_refusal() {
        StorageError::Unavailable(e.to_string())
    } else {
        StorageError::Backend(e.to_string())
    }
}

impl KeyValueStorage for RedisStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut conn = self.connection()?;
        conn.get(namespaced(key)).map_err(backend)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut conn = self.connection()?;
        conn.set::<_, _, ()>(namespaced(key), value).map_err(backend)?;
        debug!("Redis set {} ({} bytes)", namespaced(key), value.len());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut conn = self.connection()?;
        conn.del::<_, ()>(namespaced(key)).map_err(backend)
    }
}
