use reprise_backend::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::ConfigError;

/// In-process store.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Memory {
    /// Optional label for this store (used in metrics/tracing).
    #[serde(default)]
    pub label: Option<String>,
}

/// Redis store.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Redis {
    pub connection_string: String,
    /// Optional label for this store (used in metrics/tracing).
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum Store {
    Memory(Memory),
    Redis(Redis),
}

impl Store {
    pub fn into_store(self) -> Result<Arc<dyn KeyValueStore>, ConfigError> {
        match self {
            Store::Memory(config) => config.into_store(),
            Store::Redis(config) => config.into_store(),
        }
    }
}

impl Memory {
    #[cfg(feature = "memory")]
    pub fn into_store(self) -> Result<Arc<dyn KeyValueStore>, ConfigError> {
        use reprise_memory::MemoryStore;

        let mut builder = MemoryStore::builder();
        if let Some(label) = self.label {
            builder = builder.label(label);
        }
        Ok(Arc::new(builder.build()))
    }

    #[cfg(not(feature = "memory"))]
    pub fn into_store(self) -> Result<Arc<dyn KeyValueStore>, ConfigError> {
        Err(ConfigError::BackendNotAvailable("Memory".to_string()))
    }
}

impl Redis {
    #[cfg(feature = "redis")]
    pub fn into_store(self) -> Result<Arc<dyn KeyValueStore>, ConfigError> {
        use reprise_redis::RedisStore;

        let mut builder = RedisStore::builder().server(self.connection_string);
        if let Some(label) = self.label {
            builder = builder.label(label);
        }

        let store = builder
            .build()
            .map_err(|e| ConfigError::BackendNotAvailable(format!("Redis: {}", e)))?;

        Ok(Arc::new(store))
    }

    #[cfg(not(feature = "redis"))]
    pub fn into_store(self) -> Result<Arc<dyn KeyValueStore>, ConfigError> {
        Err(ConfigError::BackendNotAvailable("Redis".to_string()))
    }
}
